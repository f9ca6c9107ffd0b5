use serde::{Deserialize, Serialize};

use super::{buffer::POSITION_LAYOUT, uniforms::SpriteUniforms};
use crate::{
    error::ParticleError,
    gpu::{
        render_context::RenderContext, shader_composer::ShaderComposer,
        uniform_ring::UniformRing,
    },
    renderer::pipeline_util,
};

/// Shader identity: label, source and path, always passed together.
pub struct ShaderDef {
    /// Label used for the module and pipeline.
    pub label: &'static str,
    /// WGSL source, possibly with `#import` directives.
    pub source: &'static str,
    /// Path reported in composition errors.
    pub path: &'static str,
}

/// Which sprite program shades the particles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ShadingVariant {
    /// Every sphere in the configured colour.
    #[default]
    Standard,
    /// Cyan, magenta or yellow per particle; lighting adds the key.
    Cmyk,
}

impl ShadingVariant {
    /// Both variants, in pipeline creation order.
    pub const ALL: [Self; 2] = [Self::Standard, Self::Cmyk];

    /// The WGSL program for this variant.
    #[must_use]
    pub fn shader(self) -> ShaderDef {
        match self {
            Self::Standard => ShaderDef {
                label: "Particle Sprite",
                source: include_str!(
                    "../../../assets/shaders/sprite/standard.wgsl"
                ),
                path: "sprite/standard.wgsl",
            },
            Self::Cmyk => ShaderDef {
                label: "CMYK Particle Sprite",
                source: include_str!("../../../assets/shaders/sprite/cmyk.wgsl"),
                path: "sprite/cmyk.wgsl",
            },
        }
    }

    /// The other variant.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Standard => Self::Cmyk,
            Self::Cmyk => Self::Standard,
        }
    }
}

/// One sprite program: pipeline plus its ring of uniform blocks.
pub(crate) struct SpritePass {
    pipeline: wgpu::RenderPipeline,
    uniforms: UniformRing<SpriteUniforms>,
}

impl SpritePass {
    pub(crate) fn new(
        context: &RenderContext,
        variant: ShadingVariant,
        depth: bool,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, ParticleError> {
        let def = variant.shader();
        let device = &context.device;
        let layout = UniformRing::<SpriteUniforms>::create_layout(device, def.label);
        let uniforms = UniformRing::new(device, &layout, def.label);
        let shader = shader_composer.compose(
            device,
            &format!("{} Shader", def.label),
            def.source,
            def.path,
        )?;

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} Pipeline Layout", def.label)),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{} Pipeline", def.label)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[POSITION_LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &pipeline_util::color_target(context.format()),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: depth.then(pipeline_util::depth_stencil_state),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        log::debug!("created {} pipeline (depth: {depth})", def.label);

        Ok(Self { pipeline, uniforms })
    }

    /// Push `block` and record a draw of `count` sprites from `positions`.
    pub(crate) fn draw(
        &mut self,
        context: &RenderContext,
        render_pass: &mut wgpu::RenderPass<'_>,
        positions: &wgpu::Buffer,
        count: u32,
        block: &SpriteUniforms,
    ) {
        if count == 0 {
            return;
        }
        let offset =
            self.uniforms.push(&context.device, &context.queue, block);
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, self.uniforms.bind_group(), &[offset]);
        render_pass.set_vertex_buffer(0, positions.slice(..));
        render_pass.draw(0..4, 0..count);
    }

    pub(crate) fn begin_frame(&mut self) {
        self.uniforms.reset();
    }
}
