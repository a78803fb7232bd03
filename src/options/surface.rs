use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the per-point color is taken from.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ColoringMode {
    /// Uniform diffuse material color.
    #[default]
    None,
    /// Per-element palette.
    Element,
    /// Per-residue palette.
    Residue,
    /// Per-chain palette.
    Chain,
}

impl ColoringMode {
    /// Index passed to the shaders.
    pub const fn as_index(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Element => 1,
            Self::Residue => 2,
            Self::Chain => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Surface", inline)]
#[serde(default)]
/// Implicit surface shape and coloring.
pub struct SurfaceOptions {
    /// Falloff sharpness of each sphere's field. Higher values hug the
    /// spheres more tightly.
    #[schemars(title = "Sharpness", range(min = 0.5, max = 16.0), extend("step" = 0.1))]
    pub sharpness: f32,
    /// Blend surface color toward sphere color with view distance.
    #[schemars(title = "Dist. Blending", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub distance_blending: f32,
    /// Distance over which blending ramps, relative to object radius.
    #[schemars(title = "Dist. Scale", range(min = 0.0, max = 16.0), extend("step" = 0.1))]
    pub distance_scale: f32,
    /// Coloring source.
    #[schemars(title = "Coloring")]
    pub coloring: ColoringMode,
    /// Show raw spheres inside a circle around the cursor.
    #[schemars(title = "Magic Lens")]
    pub lens: bool,
    /// Lens radius in working-resolution pixels.
    #[schemars(title = "Lens Radius", range(min = 16.0, max = 1024.0), extend("step" = 8.0))]
    pub lens_radius: f32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            sharpness: 1.0,
            distance_blending: 0.0,
            distance_scale: 1.0,
            coloring: ColoringMode::None,
            lens: false,
            lens_radius: 128.0,
        }
    }
}
