//! Point-sprite particles shaded as spheres.
//!
//! [`ParticleRenderer`] owns one position buffer and two sprite programs
//! (standard and CMYK). Every sprite is a 4-vertex triangle strip stepped
//! once per particle instance; the vertex stage sizes it from the screen
//! width and the fragment stage shades it as a sphere with correct depth.
//!
//! ```no_run
//! # use glam::{Mat4, Vec3};
//! # use sphere_sprites::{gpu::render_context::RenderContext, gpu::shader_composer::ShaderComposer};
//! # use sphere_sprites::renderer::particle::{ParticleRenderer, Transforms};
//! # fn frame(context: &RenderContext, pass: &mut wgpu::RenderPass<'_>) -> Result<(), sphere_sprites::error::ParticleError> {
//! let mut composer = ShaderComposer::new()?;
//! let mut particles = ParticleRenderer::new(context, true, &mut composer)?;
//! particles.resize(&context.device, 2);
//! particles.set_positions(&context.queue, &[Vec3::ZERO, Vec3::X])?;
//! particles.set_screen_width(context.width());
//! particles.begin_frame();
//! particles.draw(context, pass, &Transforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY));
//! # Ok(())
//! # }
//! ```

mod buffer;
mod pass;
mod uniforms;
mod writer;

pub use buffer::{check_capacity, POSITION_LAYOUT, POSITION_STRIDE};
use glam::Vec3;
pub use pass::{ShaderDef, ShadingVariant};
pub use uniforms::{SpriteParams, SpriteUniforms, Transforms};
pub use writer::PositionWriter;

use self::{buffer::PositionBuffer, pass::SpritePass};
use crate::{
    error::ParticleError,
    gpu::{render_context::RenderContext, shader_composer::ShaderComposer},
    options::ParticleOptions,
};

/// Renders a buffer of particle positions as lit sphere sprites.
///
/// Single-threaded: every call must come from the thread that owns the
/// device and queue.
pub struct ParticleRenderer {
    positions: PositionBuffer,
    standard: SpritePass,
    cmyk: SpritePass,
    params: SpriteParams,
}

impl ParticleRenderer {
    /// Create both sprite programs and an empty position buffer.
    ///
    /// `depth` selects whether the pipelines expect a
    /// [`DEPTH_FORMAT`](crate::gpu::texture::DEPTH_FORMAT) attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::ShaderCompose`] if either program fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        depth: bool,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, ParticleError> {
        let standard = SpritePass::new(
            context,
            ShadingVariant::Standard,
            depth,
            shader_composer,
        )?;
        let cmyk = SpritePass::new(
            context,
            ShadingVariant::Cmyk,
            depth,
            shader_composer,
        )?;
        let params = SpriteParams {
            screen_width: context.width(),
            ..SpriteParams::default()
        };

        Ok(Self {
            positions: PositionBuffer::new(&context.device, 0),
            standard,
            cmyk,
            params,
        })
    }

    /// Reallocate the position buffer for `capacity` particles.
    ///
    /// Previous contents are lost, and the internal draw covers `capacity`
    /// sprites from now on. Handles previously obtained from
    /// [`position_buffer`](Self::position_buffer) keep the old buffer alive
    /// but no longer alias the renderer's.
    pub fn resize(&mut self, device: &wgpu::Device, capacity: u32) {
        self.positions.resize(device, capacity);
    }

    /// Upload `positions` into the buffer starting at slot 0.
    ///
    /// # Errors
    ///
    /// Returns [`ParticleError::CapacityExceeded`] if more positions are
    /// given than the last [`resize`](Self::resize) allowed. Nothing is
    /// uploaded in that case.
    pub fn set_positions(
        &mut self,
        queue: &wgpu::Queue,
        positions: &[Vec3],
    ) -> Result<(), ParticleError> {
        self.positions.write(queue, positions)
    }

    /// Set the target width in pixels used to size sprites.
    pub fn set_screen_width(&mut self, width: u32) {
        self.params.screen_width = width;
    }

    /// Set the sprite size.
    pub fn set_particle_size(&mut self, size: f32) {
        self.params.particle_size = size;
    }

    /// Set the colour used by the standard program.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.params.color = Vec3::new(r, g, b);
    }

    /// Take size and colour from `options`.
    pub fn apply_options(&mut self, options: &ParticleOptions) {
        self.params.apply_options(options);
    }

    /// Recycle per-frame uniform slots. Call once per frame before the
    /// first draw.
    pub fn begin_frame(&mut self) {
        self.standard.begin_frame();
        self.cmyk.begin_frame();
    }

    /// Draw the renderer's own particles with the standard program.
    pub fn draw(
        &mut self,
        context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'_>,
        transforms: &Transforms,
    ) {
        let block = self.params.uniforms(transforms, ShadingVariant::Standard);
        self.standard.draw(
            context,
            render_pass,
            self.positions.buffer(),
            self.positions.count(),
            &block,
        );
    }

    /// Draw the renderer's own particles with the given program.
    pub fn draw_with(
        &mut self,
        variant: ShadingVariant,
        context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'_>,
        transforms: &Transforms,
    ) {
        let block = self.params.uniforms(transforms, variant);
        let pass = match variant {
            ShadingVariant::Standard => &mut self.standard,
            ShadingVariant::Cmyk => &mut self.cmyk,
        };
        pass.draw(
            context,
            render_pass,
            self.positions.buffer(),
            self.positions.count(),
            &block,
        );
    }

    /// Draw `count` sprites from an external buffer with the standard
    /// program.
    ///
    /// `buffer` must have `VERTEX` usage and follow [`POSITION_LAYOUT`].
    pub fn draw_external(
        &mut self,
        context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'_>,
        buffer: &wgpu::Buffer,
        count: u32,
        transforms: &Transforms,
    ) {
        let block = self.params.uniforms(transforms, ShadingVariant::Standard);
        self.standard
            .draw(context, render_pass, buffer, count, &block);
    }

    /// Draw `count` sprites from an external buffer with the CMYK program.
    ///
    /// `buffer` must have `VERTEX` usage and follow [`POSITION_LAYOUT`].
    pub fn draw_external_cmyk(
        &mut self,
        context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'_>,
        buffer: &wgpu::Buffer,
        count: u32,
        transforms: &Transforms,
    ) {
        let block = self.params.uniforms(transforms, ShadingVariant::Cmyk);
        self.cmyk.draw(context, render_pass, buffer, count, &block);
    }

    /// Open the position buffer for direct CPU writes.
    ///
    /// The writer starts from the current positions and must be unbound (or
    /// dropped) before the renderer can be used again; unbinding uploads the
    /// slots it wrote. The upload goes through the queue, so it lands before
    /// the next submission: draws already recorded into an encoder that has
    /// not been submitted yet will see the new positions too.
    pub fn bind_positions<'a>(
        &'a mut self,
        queue: &'a wgpu::Queue,
    ) -> PositionWriter<'a> {
        PositionWriter::new(&mut self.positions, queue)
    }

    /// The position buffer, for sharing with other passes or compute work.
    pub fn position_buffer(&self) -> &wgpu::Buffer {
        self.positions.buffer()
    }

    /// Layout describing [`position_buffer`](Self::position_buffer).
    #[must_use]
    pub const fn position_layout() -> wgpu::VertexBufferLayout<'static> {
        POSITION_LAYOUT
    }

    /// Particle slots available since the last resize.
    pub fn capacity(&self) -> usize {
        self.positions.capacity()
    }

    /// Current sprite size.
    pub fn particle_size(&self) -> f32 {
        self.params.particle_size
    }

    /// Current standard-program colour.
    pub fn color(&self) -> Vec3 {
        self.params.color
    }

    /// Current target width in pixels.
    pub fn screen_width(&self) -> u32 {
        self.params.screen_width
    }

    /// All cached render parameters.
    pub fn params(&self) -> &SpriteParams {
        &self.params
    }
}
