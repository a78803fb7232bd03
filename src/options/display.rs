use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Working-resolution settings.
pub struct DisplayOptions {
    /// Working resolution relative to the viewport. Values other than 1
    /// present through the rescaling display pass.
    #[schemars(title = "Resolution Scale", range(min = 0.25, max = 8.0), extend("step" = 0.25))]
    pub resolution_scale: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            resolution_scale: 1.0,
        }
    }
}

impl DisplayOptions {
    /// Scale factor clamped to the supported range.
    pub fn clamped_scale(&self) -> f32 {
        if self.resolution_scale.is_finite() {
            self.resolution_scale.clamp(0.25, 8.0)
        } else {
            1.0
        }
    }
}
