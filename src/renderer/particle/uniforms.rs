use glam::{Mat4, Vec3};

use super::ShadingVariant;
use crate::options::ParticleOptions;

/// Uniform block consumed by both sprite shaders.
/// Must match the WGSL `SpriteUniforms` struct layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniforms {
    /// Projection matrix, used for aspect and per-fragment depth.
    pub projection: [[f32; 4]; 4],
    /// View * model.
    pub model_view: [[f32; 4]; 4],
    /// Projection * view * model.
    pub model_view_projection: [[f32; 4]; 4],
    /// xyz = RGB, w = unused. Zero for the CMYK program.
    pub color: [f32; 4],
    /// Sprite size; the on-screen diameter is `point_size * screen_width / w`
    /// pixels.
    pub point_size: f32,
    /// Target width in pixels.
    pub screen_width: f32,
    /// Padding for GPU alignment.
    pub(crate) _pad: [f32; 2],
}

/// Model, view and projection matrices for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transforms {
    /// Model matrix of the particle set.
    pub model: Mat4,
    /// View matrix of the scene.
    pub view: Mat4,
    /// Projection matrix of the scene.
    pub projection: Mat4,
}

impl Transforms {
    /// Bundle the three scene matrices.
    #[must_use]
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
        }
    }

    /// `view * model`.
    #[must_use]
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }

    /// `projection * view * model`.
    #[must_use]
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.model_view()
    }
}

/// Render parameters cached between draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteParams {
    /// Sprite size passed to the shader as `point_size`.
    pub particle_size: f32,
    /// Colour used by the standard program.
    pub color: Vec3,
    /// Target width in pixels.
    pub screen_width: u32,
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            particle_size: 0.1,
            color: Vec3::new(0.0, 0.5, 1.0),
            screen_width: 1,
        }
    }
}

impl SpriteParams {
    /// Take size and colour from `options`, keeping the screen width.
    pub fn apply_options(&mut self, options: &ParticleOptions) {
        self.particle_size = options.size;
        self.color = Vec3::from_array(options.color);
    }

    /// Build the uniform block a given program reads.
    ///
    /// The CMYK program has no colour uniform, so its block carries zero
    /// colour.
    #[must_use]
    pub fn uniforms(
        &self,
        transforms: &Transforms,
        variant: ShadingVariant,
    ) -> SpriteUniforms {
        let color = match variant {
            ShadingVariant::Standard => self.color.extend(1.0).to_array(),
            ShadingVariant::Cmyk => [0.0; 4],
        };
        SpriteUniforms {
            projection: transforms.projection.to_cols_array_2d(),
            model_view: transforms.model_view().to_cols_array_2d(),
            model_view_projection: transforms
                .model_view_projection()
                .to_cols_array_2d(),
            color,
            point_size: self.particle_size,
            screen_width: self.screen_width as f32,
            _pad: [0.0; 2],
        }
    }
}
