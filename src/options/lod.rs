use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Level of Detail", inline)]
#[serde(default)]
/// Level-of-detail blend parameter.
pub struct LodOptions {
    /// Coarse (0) to fine (1) across the sparse, dense and hierarchical
    /// point sets.
    #[schemars(title = "Interpolation", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub interpolation: f32,
}

impl Default for LodOptions {
    fn default() -> Self {
        Self { interpolation: 1.0 }
    }
}
