use std::borrow::Cow;
use std::fmt::Write as _;

use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderDefValue,
    ShaderLanguage, ShaderType,
};

use crate::error::DynasurfError;

/// Every shader program the renderer builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shader {
    /// Inner-sphere impostors into a level's position/normal targets.
    Sphere,
    /// Outer-sphere impostors appending to a level's intersection list.
    Spawn,
    /// Full-screen implicit surface resolve (plus overlap heat map).
    Surface,
    /// Ambient occlusion sampling.
    AoSample,
    /// Separable ambient occlusion blur.
    AoBlur,
    /// Deferred shading.
    Shade,
    /// Separable depth-of-field blur into near/far layers.
    DofBlur,
    /// Depth-of-field composite.
    DofBlend,
    /// Rescaling present pass.
    Display,
    /// Light-space impostors into the shadow map.
    Shadow,
    /// Occupancy grid binning (compute) and overlay.
    Grid,
}

impl Shader {
    /// Every program, in build order.
    pub const ALL: [Self; 11] = [
        Self::Sphere,
        Self::Spawn,
        Self::Surface,
        Self::AoSample,
        Self::AoBlur,
        Self::Shade,
        Self::DofBlur,
        Self::DofBlend,
        Self::Display,
        Self::Shadow,
        Self::Grid,
    ];

    /// Program name used in labels and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Spawn => "spawn",
            Self::Surface => "surface",
            Self::AoSample => "aosample",
            Self::AoBlur => "aoblur",
            Self::Shade => "shade",
            Self::DofBlur => "dofblur",
            Self::DofBlend => "dofblend",
            Self::Display => "display",
            Self::Shadow => "shadow",
            Self::Grid => "grid",
        }
    }

    /// Embedded WGSL source.
    pub const fn source(self) -> &'static str {
        match self {
            Self::Sphere => include_str!("../../assets/shaders/sphere.wgsl"),
            Self::Spawn => include_str!("../../assets/shaders/spawn.wgsl"),
            Self::Surface => include_str!("../../assets/shaders/surface.wgsl"),
            Self::AoSample => {
                include_str!("../../assets/shaders/aosample.wgsl")
            }
            Self::AoBlur => include_str!("../../assets/shaders/aoblur.wgsl"),
            Self::Shade => include_str!("../../assets/shaders/shade.wgsl"),
            Self::DofBlur => include_str!("../../assets/shaders/dofblur.wgsl"),
            Self::DofBlend => {
                include_str!("../../assets/shaders/dofblend.wgsl")
            }
            Self::Display => include_str!("../../assets/shaders/display.wgsl"),
            Self::Shadow => include_str!("../../assets/shaders/shadow.wgsl"),
            Self::Grid => include_str!("../../assets/shaders/grid.wgsl"),
        }
    }

    fn file_path(self) -> String {
        format!("{}.wgsl", self.name())
    }
}

/// Ordered set of feature defines applied to every program.
///
/// Rendered as one `#define NAME` line per entry; the rendered string is
/// what decides whether programs must be rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderDefines {
    names: Vec<&'static str>,
}

impl ShaderDefines {
    /// Every define any shader tests for.
    pub const KNOWN: [&'static str; 10] = [
        "ANIMATION",
        "LENSING",
        "COLORING",
        "AMBIENT",
        "ENVIRONMENT",
        "ENVIRONMENTLIGHTING",
        "NORMAL",
        "MATERIAL",
        "DEPTHOFFIELD",
        "SHADOW",
    ];

    /// Empty define set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known define at once.
    #[must_use]
    pub fn all() -> Self {
        Self {
            names: Self::KNOWN.to_vec(),
        }
    }

    /// Append `name` if `enabled` and not already present.
    pub fn set(&mut self, name: &'static str, enabled: bool) {
        if enabled && !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }

    /// Defined names in insertion order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Preprocessor form: `#define NAME\n` per entry.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for name in &self.names {
            let _ = writeln!(out, "#define {name}");
        }
        out
    }
}

/// Wraps `naga_oil::compose::Composer` to provide shader composition with
/// `#import` and `#ifdef` support.
///
/// Pre-loads all shared WGSL modules at construction time. Consuming shaders
/// use `#import dynasurf::module_name` to pull in shared code. The composer
/// produces `naga::Module` IR directly, skipping WGSL re-parse at runtime.
pub struct ShaderComposer {
    composer: Composer,
}

/// Shared module definition: (source, file_path)
struct ModuleDef {
    source: &'static str,
    file_path: &'static str,
}

impl ShaderComposer {
    /// Create a composer with every shared module registered.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Shader`] if a shared module fails to parse.
    pub fn new() -> Result<Self, DynasurfError> {
        let mut composer = Composer::default();

        // Register shared modules in dependency order.
        let modules: &[ModuleDef] = &[
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/fullscreen.wgsl"
                ),
                file_path: "modules/fullscreen.wgsl",
            },
            ModuleDef {
                source: include_str!("../../assets/shaders/modules/frame.wgsl"),
                file_path: "modules/frame.wgsl",
            },
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/points.wgsl"
                ),
                file_path: "modules/points.wgsl",
            },
            ModuleDef {
                source: include_str!(
                    "../../assets/shaders/modules/lighting.wgsl"
                ),
                file_path: "modules/lighting.wgsl",
            },
        ];

        for m in modules {
            let _ = composer
                .add_composable_module(ComposableModuleDescriptor {
                    source: m.source,
                    file_path: m.file_path,
                    language: ShaderLanguage::Wgsl,
                    ..Default::default()
                })
                .map_err(|e| DynasurfError::Shader {
                    name: "module",
                    message: format!("{}: {e:?}", m.file_path),
                })?;
        }

        Ok(Self { composer })
    }

    /// Compose `shader` under `defines` into a `wgpu::ShaderModule` ready
    /// for pipeline creation.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Shader`] if composition fails.
    pub fn compose(
        &mut self,
        device: &wgpu::Device,
        shader: Shader,
        defines: &ShaderDefines,
    ) -> Result<wgpu::ShaderModule, DynasurfError> {
        let naga_module =
            self.compose_naga(shader, defines)
                .map_err(|e| DynasurfError::Shader {
                    name: shader.name(),
                    message: e.to_string(),
                })?;

        Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shader.name()),
            source: wgpu::ShaderSource::Naga(Cow::Owned(naga_module)),
        }))
    }

    /// Compose a shader into a `naga::Module` without creating a wgpu
    /// shader module. Useful for testing shader composition without a GPU
    /// device.
    pub fn compose_naga(
        &mut self,
        shader: Shader,
        defines: &ShaderDefines,
    ) -> Result<naga::Module, Box<naga_oil::compose::ComposerError>> {
        let file_path = shader.file_path();
        self.composer
            .make_naga_module(NagaModuleDescriptor {
                source: shader.source(),
                file_path: &file_path,
                shader_type: ShaderType::Wgsl,
                shader_defs: defines
                    .names()
                    .iter()
                    .map(|name| ((*name).to_owned(), ShaderDefValue::Bool(true)))
                    .collect(),
                ..Default::default()
            })
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(module: &naga::Module) -> Result<(), String> {
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(module)
            .map(|_| ())
            .map_err(|e| format!("{e:?}"))
    }

    #[test]
    fn all_shaders_compose_without_defines() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer
                .compose_naga(shader, &ShaderDefines::new())
                .unwrap_or_else(|e| {
                    panic!("shader '{}' failed to compose: {e}", shader.name())
                });
            validate(&module).unwrap_or_else(|e| {
                panic!("shader '{}' failed validation: {e}", shader.name())
            });
        }
    }

    #[test]
    fn all_shaders_compose_with_every_define() {
        let mut composer = ShaderComposer::new().unwrap();
        for shader in Shader::ALL {
            let module = composer
                .compose_naga(shader, &ShaderDefines::all())
                .unwrap_or_else(|e| {
                    panic!("shader '{}' failed to compose: {e}", shader.name())
                });
            validate(&module).unwrap_or_else(|e| {
                panic!("shader '{}' failed validation: {e}", shader.name())
            });
        }
    }

    #[test]
    fn each_define_composes_alone() {
        let mut composer = ShaderComposer::new().unwrap();
        for name in ShaderDefines::KNOWN {
            let mut defines = ShaderDefines::new();
            defines.set(name, true);
            for shader in Shader::ALL {
                assert!(
                    composer.compose_naga(shader, &defines).is_ok(),
                    "shader '{}' failed under {name}",
                    shader.name()
                );
            }
        }
    }

    #[test]
    fn defines_render_in_insertion_order() {
        let mut defines = ShaderDefines::new();
        defines.set("LENSING", true);
        defines.set("ANIMATION", true);
        defines.set("AMBIENT", false);
        defines.set("LENSING", true);
        assert_eq!(defines.render(), "#define LENSING\n#define ANIMATION\n");
        assert!(defines.contains("ANIMATION"));
        assert!(!defines.contains("AMBIENT"));
    }

    #[test]
    fn empty_defines_render_empty() {
        assert!(ShaderDefines::new().render().is_empty());
    }
}
