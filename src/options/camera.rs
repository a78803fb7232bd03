use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Viewer Camera", inline)]
#[serde(default)]
/// Projection and orbit controls of the demo viewer. The renderer itself
/// takes its transforms from the host's view state.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near plane cap; the viewer pulls it closer when zoomed in.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Orbit speed in degrees per dragged pixel.
    #[schemars(title = "Orbit Speed", range(min = 0.05, max = 2.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Fraction of the focus distance moved per scroll line.
    #[schemars(title = "Zoom Speed", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub zoom_speed: f32,
    /// Fraction of the focus distance panned per dragged pixel.
    #[schemars(title = "Pan Speed", range(min = 0.0005, max = 0.01), extend("step" = 0.0005))]
    pub pan_speed: f32,
    /// Distance multiplier applied when framing a scene.
    #[schemars(skip)]
    pub fit_padding: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.5,
            zfar: 1000.0,
            rotate_speed: 0.5,
            zoom_speed: 0.1,
            pan_speed: 0.002,
            fit_padding: 1.5,
        }
    }
}
