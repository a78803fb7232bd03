use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Material colors and the texture-driven shading features.
pub struct LightingOptions {
    /// Ambient material color.
    #[schemars(title = "Ambient")]
    pub ambient: [f32; 3],
    /// Diffuse material color (used when coloring is off).
    #[schemars(title = "Diffuse")]
    pub diffuse: [f32; 3],
    /// Specular material color.
    #[schemars(title = "Specular")]
    pub specular: [f32; 3],
    /// Specular exponent.
    #[schemars(title = "Shininess", range(min = 1.0, max = 256.0), extend("step" = 1.0))]
    pub shininess: f32,
    /// Screen-space ambient occlusion.
    #[schemars(title = "Ambient Occlusion")]
    pub ambient_occlusion: bool,
    /// Occlusion sampling radius in object units.
    #[schemars(title = "AO Radius", range(min = 0.1, max = 16.0), extend("step" = 0.1))]
    pub ao_radius: f32,
    #[schemars(skip)]
    pub ao_bias: f32,
    #[schemars(skip)]
    pub ao_power: f32,
    /// Reflect the environment map off the surface.
    #[schemars(title = "Environment Mapping")]
    pub environment_mapping: bool,
    /// Use the environment map as the ambient light source.
    #[schemars(title = "Use for Illumination")]
    pub environment_lighting: bool,
    /// Selected environment map.
    #[schemars(title = "Environment Map")]
    pub environment_index: usize,
    /// Modulate diffuse color by a material (matcap) texture.
    #[schemars(title = "Material Mapping")]
    pub material_mapping: bool,
    /// Selected material map.
    #[schemars(title = "Material Map")]
    pub material_index: usize,
    /// Perturb normals with a bump texture.
    #[schemars(title = "Normal Mapping")]
    pub normal_mapping: bool,
    /// Selected bump map.
    #[schemars(title = "Normal Map")]
    pub bump_index: usize,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            ambient: [0.3, 0.3, 0.3],
            diffuse: [0.6, 0.6, 0.6],
            specular: [0.3, 0.3, 0.3],
            shininess: 20.0,
            ambient_occlusion: false,
            ao_radius: 1.5,
            ao_bias: 0.025,
            ao_power: 2.0,
            environment_mapping: false,
            environment_lighting: false,
            environment_index: 0,
            material_mapping: false,
            material_index: 0,
            normal_mapping: false,
            bump_index: 0,
        }
    }
}
