//! Compiled shader programs and their pipelines.
//!
//! Bind group layouts depend only on the binding tables and are created
//! once. Pipelines depend on the feature defines and are rebuilt together
//! whenever the defines string changes.

use rustc_hash::FxHashMap;

use crate::error::DynasurfError;
use crate::gpu::pipeline_helpers::{
    color_target, create_compute_pipeline, create_impostor_pipeline,
    create_screen_space_pipeline, depth_state, max_blend_target, PipelineDef,
};
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer, ShaderDefines};
use crate::renderer::layouts;
use crate::renderer::targets::{
    AMBIENT_FORMAT, DEPTH_FORMAT, DOF_FORMAT, SHADOW_FORMAT,
    SPHERE_NORMAL_FORMAT, SPHERE_POSITION_FORMAT, SURFACE_FORMAT,
};

/// Remembers the defines string the programs were last built with.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DefinesTracker {
    applied: Option<String>,
}

impl DefinesTracker {
    /// Tracker that has applied nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `defines`; returns whether it differs from the applied string
    /// (and a reload is due).
    pub fn update(&mut self, defines: &str) -> bool {
        if self.applied.as_deref() == Some(defines) {
            return false;
        }
        self.applied = Some(defines.to_owned());
        true
    }

    /// Last applied defines string.
    pub fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }
}

/// Bind group layouts, one per binding table.
pub struct ProgramLayouts {
    /// Sphere and shadow impostors.
    pub impostor: wgpu::BindGroupLayout,
    /// List generation.
    pub spawn: wgpu::BindGroupLayout,
    /// Surface resolve and overlaps.
    pub surface: wgpu::BindGroupLayout,
    /// Occlusion sampling.
    pub ao_sample: wgpu::BindGroupLayout,
    /// Occlusion blur.
    pub ao_blur: wgpu::BindGroupLayout,
    /// Shading.
    pub shade: wgpu::BindGroupLayout,
    /// Depth-of-field blur.
    pub dof_blur: wgpu::BindGroupLayout,
    /// Depth-of-field blend.
    pub dof_blend: wgpu::BindGroupLayout,
    /// Display.
    pub display: wgpu::BindGroupLayout,
    /// Grid binning.
    pub grid_bin: wgpu::BindGroupLayout,
    /// Grid overlay.
    pub grid_cells: wgpu::BindGroupLayout,
}

impl ProgramLayouts {
    fn new(device: &wgpu::Device) -> Self {
        Self {
            impostor: layouts::IMPOSTOR.create_layout(device),
            spawn: layouts::SPAWN.create_layout(device),
            surface: layouts::SURFACE.create_layout(device),
            ao_sample: layouts::AO_SAMPLE.create_layout(device),
            ao_blur: layouts::AO_BLUR.create_layout(device),
            shade: layouts::SHADE.create_layout(device),
            dof_blur: layouts::DOF_BLUR.create_layout(device),
            dof_blend: layouts::DOF_BLEND.create_layout(device),
            display: layouts::DISPLAY.create_layout(device),
            grid_bin: layouts::GRID_BIN.create_layout(device),
            grid_cells: layouts::GRID_CELLS.create_layout(device),
        }
    }
}

/// Pipelines built under one defines string.
pub struct Pipelines {
    /// Inner-sphere impostors.
    pub sphere: wgpu::RenderPipeline,
    /// Outer-sphere list generation.
    pub spawn: wgpu::RenderPipeline,
    /// Surface resolve.
    pub surface: wgpu::RenderPipeline,
    /// Overlap heat map.
    pub overlaps: wgpu::RenderPipeline,
    /// Occlusion sampling.
    pub ao_sample: wgpu::RenderPipeline,
    /// Occlusion blur.
    pub ao_blur: wgpu::RenderPipeline,
    /// Shading.
    pub shade: wgpu::RenderPipeline,
    /// Depth-of-field blur.
    pub dof_blur: wgpu::RenderPipeline,
    /// Depth-of-field blend.
    pub dof_blend: wgpu::RenderPipeline,
    /// Shadow map impostors.
    pub shadow: wgpu::RenderPipeline,
    /// Grid binning.
    pub grid_bin: wgpu::ComputePipeline,
    /// Grid overlay.
    pub grid_cells: wgpu::RenderPipeline,
}

/// Every program of the renderer.
pub struct ProgramSet {
    layouts: ProgramLayouts,
    pipelines: Pipelines,
    display_module: wgpu::ShaderModule,
    display_pipelines: FxHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
    color_format: wgpu::TextureFormat,
    reloads: u32,
}

impl ProgramSet {
    /// Build every program under `defines`. `color_format` is the format of
    /// the shaded color and composite targets.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Shader`] if a program fails to compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
        defines: &ShaderDefines,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self, DynasurfError> {
        let layouts = ProgramLayouts::new(&context.device);
        let (pipelines, display_module) =
            build(context, composer, defines, &layouts, color_format)?;
        Ok(Self {
            layouts,
            pipelines,
            display_module,
            display_pipelines: FxHashMap::default(),
            color_format,
            reloads: 0,
        })
    }

    /// Recompile every program under `defines`.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Shader`] if a program fails to compose; the
    /// previous programs stay in place.
    pub fn reload(
        &mut self,
        context: &RenderContext,
        composer: &mut ShaderComposer,
        defines: &ShaderDefines,
    ) -> Result<(), DynasurfError> {
        let (pipelines, display_module) =
            build(context, composer, defines, &self.layouts, self.color_format)?;
        self.pipelines = pipelines;
        self.display_module = display_module;
        self.display_pipelines.clear();
        self.reloads += 1;
        log::info!("shader programs reloaded ({:?})", defines.names());
        Ok(())
    }

    /// Bind group layouts.
    pub fn layouts(&self) -> &ProgramLayouts {
        &self.layouts
    }

    /// Current pipelines.
    pub fn pipelines(&self) -> &Pipelines {
        &self.pipelines
    }

    /// Reloads since construction.
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    /// Build the display pipeline for `format` on first use.
    pub fn prepare_display(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.display_pipelines.contains_key(&format) {
            return;
        }
        let pipeline = create_screen_space_pipeline(
            device,
            &PipelineDef {
                label: "Display",
                shader: &self.display_module,
                fragment_entry: "fs_main",
                targets: &[color_target(format)],
                depth: None,
                bind_group_layouts: &[&self.layouts.display],
            },
        );
        let _ = self.display_pipelines.insert(format, pipeline);
        log::debug!("display pipeline built for {format:?}");
    }

    /// Display pipeline for `format`, if prepared.
    pub fn display(&self, format: wgpu::TextureFormat) -> Option<&wgpu::RenderPipeline> {
        self.display_pipelines.get(&format)
    }
}

fn build(
    context: &RenderContext,
    composer: &mut ShaderComposer,
    defines: &ShaderDefines,
    layouts: &ProgramLayouts,
    color_format: wgpu::TextureFormat,
) -> Result<(Pipelines, wgpu::ShaderModule), DynasurfError> {
    let device = &context.device;
    let mut modules = FxHashMap::default();
    for shader in Shader::ALL {
        let _ = modules.insert(shader, composer.compose(device, shader, defines)?);
    }
    let module = |shader: Shader| -> Result<&wgpu::ShaderModule, DynasurfError> {
        modules.get(&shader).ok_or(DynasurfError::Shader {
            name: shader.name(),
            message: "program was not composed".to_owned(),
        })
    };

    let sphere = create_impostor_pipeline(
        device,
        &PipelineDef {
            label: "Sphere",
            shader: module(Shader::Sphere)?,
            fragment_entry: "fs_main",
            targets: &[
                color_target(SPHERE_POSITION_FORMAT),
                color_target(SPHERE_NORMAL_FORMAT),
            ],
            depth: Some(depth_state(DEPTH_FORMAT, true, wgpu::CompareFunction::Less)),
            bind_group_layouts: &[&layouts.impostor],
        },
    );
    let spawn = create_impostor_pipeline(
        device,
        &PipelineDef {
            label: "List Generation",
            shader: module(Shader::Spawn)?,
            fragment_entry: "fs_main",
            targets: &[],
            depth: Some(depth_state(DEPTH_FORMAT, false, wgpu::CompareFunction::Always)),
            bind_group_layouts: &[&layouts.spawn],
        },
    );
    let surface = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "Surface",
            shader: module(Shader::Surface)?,
            fragment_entry: "fs_main",
            targets: &[
                color_target(SURFACE_FORMAT),
                color_target(SURFACE_FORMAT),
                color_target(SURFACE_FORMAT),
                color_target(SURFACE_FORMAT),
            ],
            depth: Some(depth_state(DEPTH_FORMAT, true, wgpu::CompareFunction::Always)),
            bind_group_layouts: &[&layouts.surface],
        },
    );
    let overlaps = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "Overlaps",
            shader: module(Shader::Surface)?,
            fragment_entry: "fs_overlaps",
            targets: &[color_target(color_format)],
            depth: None,
            bind_group_layouts: &[&layouts.surface],
        },
    );
    let ao_sample = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "Ambient Sample",
            shader: module(Shader::AoSample)?,
            fragment_entry: "fs_main",
            targets: &[color_target(AMBIENT_FORMAT)],
            depth: None,
            bind_group_layouts: &[&layouts.ao_sample],
        },
    );
    let ao_blur = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "Ambient Blur",
            shader: module(Shader::AoBlur)?,
            fragment_entry: "fs_main",
            targets: &[color_target(AMBIENT_FORMAT)],
            depth: None,
            bind_group_layouts: &[&layouts.ao_blur],
        },
    );
    let shade = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "Shade",
            shader: module(Shader::Shade)?,
            fragment_entry: "fs_main",
            targets: &[color_target(color_format)],
            depth: None,
            bind_group_layouts: &[&layouts.shade],
        },
    );
    let dof_blur = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "DoF Blur",
            shader: module(Shader::DofBlur)?,
            fragment_entry: "fs_main",
            targets: &[color_target(DOF_FORMAT), color_target(DOF_FORMAT)],
            depth: None,
            bind_group_layouts: &[&layouts.dof_blur],
        },
    );
    let dof_blend = create_screen_space_pipeline(
        device,
        &PipelineDef {
            label: "DoF Blend",
            shader: module(Shader::DofBlend)?,
            fragment_entry: "fs_main",
            targets: &[color_target(color_format)],
            depth: None,
            bind_group_layouts: &[&layouts.dof_blend],
        },
    );
    let shadow = create_impostor_pipeline(
        device,
        &PipelineDef {
            label: "Shadow",
            shader: module(Shader::Shadow)?,
            fragment_entry: "fs_main",
            targets: &[max_blend_target(SHADOW_FORMAT)],
            depth: Some(depth_state(DEPTH_FORMAT, true, wgpu::CompareFunction::Less)),
            bind_group_layouts: &[&layouts.impostor],
        },
    );
    let grid_bin = create_compute_pipeline(
        device,
        "Grid Bin",
        module(Shader::Grid)?,
        "cs_bin",
        &[&layouts.grid_bin],
    );
    let grid_cells = create_impostor_pipeline(
        device,
        &PipelineDef {
            label: "Grid Cells",
            shader: module(Shader::Grid)?,
            fragment_entry: "fs_cells",
            targets: &[color_target(color_format)],
            depth: None,
            bind_group_layouts: &[&layouts.grid_cells],
        },
    );

    let display_module = modules.remove(&Shader::Display).ok_or(DynasurfError::Shader {
        name: Shader::Display.name(),
        message: "program was not composed".to_owned(),
    })?;

    Ok((
        Pipelines {
            sphere,
            spawn,
            surface,
            overlaps,
            ao_sample,
            ao_blur,
            shade,
            dof_blur,
            dof_blend,
            shadow,
            grid_bin,
            grid_cells,
        },
        display_module,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_always_reloads() {
        let mut tracker = DefinesTracker::new();
        assert!(tracker.update(""));
        assert_eq!(tracker.applied(), Some(""));
    }

    #[test]
    fn unchanged_defines_do_not_reload() {
        let mut tracker = DefinesTracker::new();
        assert!(tracker.update("#define AMBIENT\n"));
        assert!(!tracker.update("#define AMBIENT\n"));
        assert!(!tracker.update("#define AMBIENT\n"));
    }

    #[test]
    fn toggle_and_back_reloads_twice() {
        let mut options = crate::options::Options::default();
        let mut tracker = DefinesTracker::new();
        let _ = tracker.update(&options.shader_defines().render());

        let mut reloads = 0;
        options.lighting.ambient_occlusion = true;
        reloads += u32::from(tracker.update(&options.shader_defines().render()));
        reloads += u32::from(tracker.update(&options.shader_defines().render()));
        assert_eq!(reloads, 1);

        options.lighting.ambient_occlusion = false;
        reloads += u32::from(tracker.update(&options.shader_defines().render()));
        assert_eq!(reloads, 2);
    }

    #[test]
    fn non_define_options_do_not_reload() {
        let mut options = crate::options::Options::default();
        let mut tracker = DefinesTracker::new();
        let _ = tracker.update(&options.shader_defines().render());
        options.surface.sharpness = 3.0;
        options.lighting.shininess = 64.0;
        assert!(!tracker.update(&options.shader_defines().render()));
    }
}
