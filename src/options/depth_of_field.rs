use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selectable f-stops.
pub const F_STOPS: [f32; 20] = [
    0.7, 0.8, 1.0, 1.2, 1.4, 1.7, 2.0, 2.4, 2.8, 3.3, 4.0, 4.8, 5.6, 6.7, 8.0,
    9.5, 11.0, 16.0, 22.0, 32.0,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Depth of Field", inline)]
#[serde(default)]
/// Thin-lens depth of field.
pub struct DepthOfFieldOptions {
    /// Enable the blur and blend passes.
    #[schemars(title = "Depth of Field")]
    pub enabled: bool,
    /// Distance in focus, in view units.
    #[schemars(title = "Focal Distance", range(min = 0.1, max = 35.0), extend("step" = 0.1))]
    pub focal_distance: f32,
    /// Index into [`F_STOPS`].
    #[schemars(title = "F-stop", range(min = 0, max = 19))]
    pub f_stop_index: usize,
    /// Largest blur radius in pixels.
    #[schemars(title = "Max. CoC Radius", range(min = 1.0, max = 20.0), extend("step" = 0.5))]
    pub max_coc_radius: f32,
    /// Extra scale on the far-field blur radius.
    #[schemars(title = "Far Radius Scale", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub far_radius_rescale: f32,
}

impl Default for DepthOfFieldOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            focal_distance: 2.0 * 3.0_f32.sqrt(),
            f_stop_index: 12,
            max_coc_radius: 9.0,
            far_radius_rescale: 1.0,
        }
    }
}

impl DepthOfFieldOptions {
    /// Selected f-stop; out-of-range indices clamp to the last entry.
    pub fn f_stop(&self) -> f32 {
        F_STOPS[self.f_stop_index.min(F_STOPS.len() - 1)]
    }
}
