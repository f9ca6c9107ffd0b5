use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Camera projection and control parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Initial distance from the orbit target.
    #[schemars(title = "Distance", range(min = 0.5, max = 100.0), extend("step" = 0.5))]
    pub distance: f32,
    /// Radians of orbit per pixel of mouse drag.
    #[schemars(title = "Orbit Speed", range(min = 0.001, max = 0.05), extend("step" = 0.001))]
    pub orbit_speed: f32,
    /// Model spin in radians per second.
    #[schemars(title = "Spin", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub spin: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.05,
            zfar: 500.0,
            distance: 6.0,
            orbit_speed: 0.01,
            spin: 0.3,
        }
    }
}
