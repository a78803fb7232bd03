//! Centralized rendering options with TOML preset support.
//!
//! Every tweakable setting (lighting, surface, LOD, animation, depth of
//! field, debug toggles) is consolidated here and owned by the
//! [`FrameSequencer`](crate::renderer::FrameSequencer), which samples it once
//! per frame. Options serialize to/from TOML for presets, and publish a JSON
//! schema so UI overlays can build their widgets from it.

mod animation;
mod camera;
mod debug;
mod depth_of_field;
mod display;
mod lighting;
mod lod;
mod surface;

use std::path::Path;

pub use animation::AnimationOptions;
pub use camera::CameraOptions;
pub use debug::{DebugOptions, MAX_GRID_DEPTH};
pub use depth_of_field::{DepthOfFieldOptions, F_STOPS};
pub use display::DisplayOptions;
pub use lighting::LightingOptions;
pub use lod::LodOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use surface::{ColoringMode, SurfaceOptions};

use crate::error::DynasurfError;
use crate::gpu::shader_composer::ShaderDefines;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[lighting]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Working resolution.
    pub display: DisplayOptions,
    /// Material colors, ambient occlusion and texture mapping.
    pub lighting: LightingOptions,
    /// Implicit surface shape and coloring.
    pub surface: SurfaceOptions,
    /// Depth of field.
    pub depth_of_field: DepthOfFieldOptions,
    /// Timestep playback and procedural animation.
    pub animation: AnimationOptions,
    /// Level-of-detail blend.
    pub lod: LodOptions,
    /// Viewer camera (only used by the demo viewer).
    pub camera: CameraOptions,
    /// Debug visualization options.
    pub debug: DebugOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Io`] if the file cannot be read, or
    /// [`DynasurfError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, DynasurfError> {
        let content =
            std::fs::read_to_string(path).map_err(DynasurfError::Io)?;
        toml::from_str(&content)
            .map_err(|e| DynasurfError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::OptionsParse`] if serialization fails, or
    /// [`DynasurfError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), DynasurfError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DynasurfError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DynasurfError::Io)?;
        }
        std::fs::write(path, content).map_err(DynasurfError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }

    /// Merge a JSON object written by a UI overlay into these options.
    /// Keys absent from `patch` keep their current values.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::OptionsParse`] if the merged value no longer
    /// describes valid options; `self` is left unchanged in that case.
    pub fn apply_patch(
        &mut self,
        patch: &serde_json::Value,
    ) -> Result<(), DynasurfError> {
        let mut current = serde_json::to_value(&*self)
            .map_err(|e| DynasurfError::OptionsParse(e.to_string()))?;
        merge_json(&mut current, patch);
        *self = serde_json::from_value(current)
            .map_err(|e| DynasurfError::OptionsParse(e.to_string()))?;
        Ok(())
    }

    /// Feature defines implied by the current toggles, in a fixed order.
    pub fn shader_defines(&self) -> ShaderDefines {
        let lighting = &self.lighting;
        let mut defines = ShaderDefines::new();
        defines.set("ANIMATION", self.animation.animate);
        defines.set("LENSING", self.surface.lens);
        defines.set("COLORING", self.surface.coloring != ColoringMode::None);
        defines.set("AMBIENT", lighting.ambient_occlusion);
        defines.set("ENVIRONMENT", lighting.environment_mapping);
        defines.set(
            "ENVIRONMENTLIGHTING",
            lighting.environment_mapping && lighting.environment_lighting,
        );
        defines.set("NORMAL", lighting.normal_mapping);
        defines.set("MATERIAL", lighting.material_mapping);
        defines.set("DEPTHOFFIELD", self.depth_of_field.enabled);
        defines.set("SHADOW", self.debug.shadows);
        defines
    }
}

fn merge_json(target: &mut serde_json::Value, patch: &serde_json::Value) {
    match (target, patch) {
        (
            serde_json::Value::Object(target),
            serde_json::Value::Object(patch),
        ) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        let _ = target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[lighting]
shininess = 80.0
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.lighting.shininess, 80.0);
        // Everything else should be default
        assert_eq!(opts.lighting.diffuse, [0.6, 0.6, 0.6]);
        assert_eq!(opts.surface.sharpness, 1.0);
        assert_eq!(opts.lod.interpolation, 1.0);
        assert_eq!(opts.depth_of_field.f_stop(), 5.6);
    }

    #[test]
    fn defaults_match_reference_values() {
        let opts = Options::default();
        assert_eq!(opts.lighting.specular, [0.3, 0.3, 0.3]);
        assert_eq!(opts.lighting.shininess, 20.0);
        assert_eq!(opts.surface.distance_scale, 1.0);
        assert!((opts.depth_of_field.focal_distance - 3.464_101_6).abs() < 1e-5);
        assert_eq!(opts.depth_of_field.max_coc_radius, 9.0);
        assert_eq!(opts.animation.frequency, 1.0);
        assert_eq!(opts.display.resolution_scale, 1.0);
        assert!(!opts.debug.shadows);
    }

    #[test]
    fn f_stop_index_is_clamped() {
        let mut dof = DepthOfFieldOptions::default();
        dof.f_stop_index = 99;
        assert_eq!(dof.f_stop(), 32.0);
        dof.f_stop_index = 0;
        assert_eq!(dof.f_stop(), 0.7);
    }

    #[test]
    fn coloring_mode_serializes_snake_case() {
        let toml_str = r#"
[surface]
coloring = "residue"
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.surface.coloring, ColoringMode::Residue);
        assert_eq!(opts.surface.coloring.as_index(), 2);
    }

    #[test]
    fn default_options_have_no_defines() {
        assert!(Options::default().shader_defines().render().is_empty());
    }

    #[test]
    fn defines_follow_toggles_in_fixed_order() {
        let mut opts = Options::default();
        opts.depth_of_field.enabled = true;
        opts.animation.animate = true;
        opts.surface.coloring = ColoringMode::Chain;
        assert_eq!(
            opts.shader_defines().render(),
            "#define ANIMATION\n#define COLORING\n#define DEPTHOFFIELD\n"
        );
    }

    #[test]
    fn environment_lighting_requires_environment_mapping() {
        let mut opts = Options::default();
        opts.lighting.environment_lighting = true;
        assert!(!opts.shader_defines().contains("ENVIRONMENTLIGHTING"));
        opts.lighting.environment_mapping = true;
        assert!(opts.shader_defines().contains("ENVIRONMENTLIGHTING"));
    }

    #[test]
    fn patch_merges_nested_fields() {
        let mut opts = Options::default();
        opts.apply_patch(&serde_json::json!({
            "surface": { "lens": true },
            "lod": { "interpolation": 0.25 }
        }))
        .unwrap();
        assert!(opts.surface.lens);
        assert_eq!(opts.surface.sharpness, 1.0);
        assert_eq!(opts.lod.interpolation, 0.25);
    }

    #[test]
    fn invalid_patch_leaves_options_unchanged() {
        let mut opts = Options::default();
        let err = opts
            .apply_patch(&serde_json::json!({ "surface": { "lens": "yes" } }))
            .unwrap_err();
        assert!(matches!(err, DynasurfError::OptionsParse(_)));
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn presets_round_trip_and_list() {
        let dir = std::env::temp_dir()
            .join(format!("dynasurf-presets-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut opts = Options::default();
        opts.surface.sharpness = 4.0;
        opts.save(&dir.join("sharp.toml")).unwrap();
        Options::default().save(&dir.join("default.toml")).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        assert_eq!(Options::list_presets(&dir), vec!["default", "sharp"]);
        let loaded = Options::load(&dir.join("sharp.toml")).unwrap();
        assert_eq!(loaded, opts);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        for section in [
            "display",
            "lighting",
            "surface",
            "depth_of_field",
            "animation",
            "lod",
            "debug",
        ] {
            assert!(props.contains_key(section), "missing {section}");
        }

        // Exposed fields present, internal ones skipped
        let lighting = &props["lighting"]["properties"];
        assert!(lighting.get("shininess").is_some());
        assert!(lighting.get("ambient_occlusion").is_some());
        assert!(lighting.get("ao_bias").is_none());

        let sharpness = &props["surface"]["properties"]["sharpness"];
        assert_eq!(sharpness["minimum"], 0.5);
        assert_eq!(sharpness["maximum"], 16.0);
    }
}
