use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::renderer::particle::ShadingVariant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Particles", inline)]
#[serde(default)]
/// Particle appearance and the size of the demo cloud.
pub struct ParticleOptions {
    /// Sprite size: on-screen diameter as a fraction of the screen width
    /// for a particle at clip-space w = 1 (shrinks as 1/w with distance).
    #[schemars(title = "Size", range(min = 0.005, max = 2.0), extend("step" = 0.005))]
    pub size: f32,
    /// RGB colour used by the standard program.
    #[schemars(title = "Color")]
    pub color: [f32; 3],
    /// Number of particles the viewer generates.
    #[schemars(title = "Count", range(min = 1, max = 1_000_000))]
    pub count: u32,
    /// Which sprite program draws the particles.
    #[schemars(title = "Shading")]
    pub shading: ShadingVariant,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        Self {
            size: 0.1,
            color: [0.0, 0.5, 1.0],
            count: 20_000,
            shading: ShadingVariant::Standard,
        }
    }
}
