//! The per-frame entry point.
//!
//! [`FrameSequencer::display`] samples the options, syncs the working
//! resolution, reloads programs when the feature defines change, writes the
//! frame uniforms, and records every pass of the [`FramePlan`] on one
//! encoder. Nothing outside the sequencer's own resources and the output
//! target is touched.

use std::path::Path;

use crate::error::DynasurfError;
use crate::gpu::binding::SlotResource;
use crate::gpu::pipeline_helpers::IMPOSTOR_VERTICES;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::RenderTarget;
use crate::gpu::texture_library::LIBRARY_FORMAT;
use crate::lod::{LodLevel, LodSelection, LodSelector};
use crate::options::Options;
use crate::renderer::layouts;
use crate::renderer::plan::{FinalSource, FramePlan, PassKind, PlanInputs};
use crate::renderer::programs::{DefinesTracker, ProgramSet};
use crate::renderer::resources::ResourcePool;
use crate::renderer::uniforms::{
    AnimationState, AoUniforms, BlurUniforms, FrameInputs, FrameUniforms,
    GridUniforms, LevelUniforms,
};
use crate::scene::Scene;
use crate::view::{OutputTarget, ViewState};

/// Threads per grid binning workgroup (`@workgroup_size` in `grid.wgsl`).
const GRID_WORKGROUP: u32 = 64;

/// What one [`FrameSequencer::display`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The current frame has no points; nothing was recorded and the output
    /// is untouched.
    Skipped,
    /// The frame was rendered.
    Rendered {
        /// Passes recorded, in order.
        passes: Vec<PassKind>,
        /// Draw and dispatch calls issued.
        draws: u32,
    },
}

impl FrameOutcome {
    /// Draw and dispatch calls issued (0 when skipped).
    pub fn draws(&self) -> u32 {
        match self {
            Self::Skipped => 0,
            Self::Rendered { draws, .. } => *draws,
        }
    }
}

/// Working resolution for a viewport at `scale`.
pub fn working_size(viewport: (u32, u32), scale: f32) -> (u32, u32) {
    (
        ((viewport.0 as f32 * scale).round() as u32).max(1),
        ((viewport.1 as f32 * scale).round() as u32).max(1),
    )
}

/// One active LOD slot this frame.
#[derive(Debug, Clone, Copy)]
struct ActiveLevel {
    level: LodLevel,
    weight: f32,
    count: u32,
}

/// Owns every GPU resource and program, plus the options and scene, and
/// renders one frame per [`Self::display`] call.
pub struct FrameSequencer {
    options: Options,
    scene: Scene,
    composer: ShaderComposer,
    defines: DefinesTracker,
    programs: ProgramSet,
    resources: ResourcePool,
    selector: LodSelector,
    last_uniforms: Option<FrameUniforms>,
}

impl FrameSequencer {
    /// Build programs under the defines of `options`, allocate resources
    /// at the context size, and upload `scene`. Texture libraries load from
    /// subdirectories of `textures`.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Shader`] if a program fails to compose, or
    /// [`DynasurfError::FramebufferIncomplete`] if a framebuffer fails its
    /// completeness check.
    pub fn new(
        context: &RenderContext,
        scene: Scene,
        options: Options,
        textures: &Path,
    ) -> Result<Self, DynasurfError> {
        let mut composer = ShaderComposer::new()?;
        let defines = options.shader_defines();
        let mut tracker = DefinesTracker::new();
        let _ = tracker.update(&defines.render());
        let programs =
            ProgramSet::new(context, &mut composer, &defines, context.format())?;
        let resources = ResourcePool::new(context, &scene, textures)?;
        log::info!(
            "frame sequencer ready: {} timestep(s), defines {:?}",
            scene.timestep_count(),
            defines.names()
        );
        Ok(Self {
            options,
            scene,
            composer,
            defines: tracker,
            programs,
            resources,
            selector: LodSelector::standard(),
            last_uniforms: None,
        })
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable options, sampled at the start of the next frame.
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Current scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Replace the scene wholesale.
    pub fn set_scene(&mut self, context: &RenderContext, scene: Scene) {
        self.resources.upload_scene(context, &scene);
        self.scene = scene;
    }

    /// Shared resources.
    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    /// Resize the working resolution directly. Returns the effective size.
    pub fn resize(&mut self, context: &RenderContext, size: (u32, u32)) -> (u32, u32) {
        self.resources.resize(context, size)
    }

    /// Program reloads since construction.
    pub fn reloads(&self) -> u32 {
        self.programs.reloads()
    }

    /// Uniforms written by the last rendered frame.
    pub fn last_uniforms(&self) -> Option<&FrameUniforms> {
        self.last_uniforms.as_ref()
    }

    /// Render one frame of the current scene into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Shader`] if a reload fails, or
    /// [`DynasurfError::BindingMismatch`] if a pass is given resources its
    /// binding table rejects.
    pub fn display(
        &mut self,
        context: &RenderContext,
        view: &ViewState,
        output: OutputTarget<'_>,
    ) -> Result<FrameOutcome, DynasurfError> {
        let options = self.options.clone();

        let requested = working_size(view.viewport, options.display.clamped_scale());
        let size = self.resources.resize(context, requested);

        let animation = AnimationState::derive(
            &options.animation,
            view.time,
            self.scene.timestep_count(),
        );
        let selection = self.selector.select(options.lod.interpolation);
        let active = self.active_levels(selection, animation.timestep);
        if active.iter().any(|a| a.level == LodLevel::Hierarchical) {
            self.resources
                .sync_timestep(context, &self.scene, animation.timestep);
        }

        let defines = options.shader_defines();
        if self.defines.update(&defines.render()) {
            self.programs.reload(context, &mut self.composer, &defines)?;
        }

        if active.iter().all(|a| a.count == 0) {
            log::debug!("frame skipped: no points at timestep {}", animation.timestep);
            return Ok(FrameOutcome::Skipped);
        }

        let uniforms = FrameUniforms::derive(&FrameInputs {
            view,
            options: &options,
            size,
            selection,
            bounding_sphere: self.scene.bounding_sphere(),
            animation,
            palette_offsets: self.resources.palette_offsets(),
        });
        self.write_uniforms(context, &uniforms, &options, &active, size);
        self.last_uniforms = Some(uniforms);

        let plan = FramePlan::build(&PlanInputs {
            options: &options,
            selection,
            working_size: size,
            output_size: output.size(),
            color_format: self.resources.targets.color_format(),
            output_format: output.format(),
            output_accepts_copy: output.accepts_copy(),
        });
        if plan.contains(PassKind::Display) {
            self.programs.prepare_display(&context.device, output.format());
        }

        let bindings = self.create_bindings(context, &options, &active, &plan)?;
        let mut encoder = context.create_encoder("Frame Encoder");
        let mut draws = 0;
        for pass in plan.passes() {
            draws += self.record(&mut encoder, *pass, &bindings, &active, view, &output)?;
        }
        context.submit(encoder);
        log::debug!("frame rendered: {} passes, {draws} draws", plan.passes().len());

        Ok(FrameOutcome::Rendered {
            passes: plan.passes().to_vec(),
            draws,
        })
    }

    fn active_levels(&self, selection: LodSelection, timestep: usize) -> Vec<ActiveLevel> {
        selection
            .active()
            .into_iter()
            .filter_map(|(index, weight)| {
                let level = LodLevel::from_index(index)?;
                let count = self.scene.level_points(level, timestep).len() as u32;
                Some(ActiveLevel {
                    level,
                    weight,
                    count,
                })
            })
            .collect()
    }

    fn write_uniforms(
        &self,
        context: &RenderContext,
        frame: &FrameUniforms,
        options: &Options,
        active: &[ActiveLevel],
        size: (u32, u32),
    ) {
        let queue = &context.queue;
        let buffers = &self.resources.uniforms;
        queue.write_buffer(&buffers.frame, 0, bytemuck::bytes_of(frame));

        let t = options.lod.interpolation;
        for (slot, buffer) in buffers.levels.iter().enumerate() {
            let level = active.get(slot).map_or_else(LevelUniforms::inactive, |a| {
                LevelUniforms::new(
                    &a.level.descriptor(t, a.count),
                    a.weight,
                    options.surface.sharpness,
                    self.resources.lists[slot].capacity(),
                )
            });
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&level));
        }

        queue.write_buffer(
            &buffers.blur_horizontal,
            0,
            bytemuck::bytes_of(&BlurUniforms::horizontal(size)),
        );
        queue.write_buffer(
            &buffers.blur_vertical,
            0,
            bytemuck::bytes_of(&BlurUniforms::vertical(size)),
        );
        queue.write_buffer(
            &buffers.ambient,
            0,
            bytemuck::bytes_of(&AoUniforms::new(self.resources.kernel, options)),
        );
        let sparse = self.scene.level_points(LodLevel::Sparse, 0).len() as u32;
        queue.write_buffer(
            &buffers.grid,
            0,
            bytemuck::bytes_of(&GridUniforms::new(
                self.scene.bounds(),
                sparse,
                options.debug.clamped_grid_depth(),
                options.debug.clamped_grid_level(),
            )),
        );
    }

    fn create_bindings(
        &self,
        context: &RenderContext,
        options: &Options,
        active: &[ActiveLevel],
        plan: &FramePlan,
    ) -> Result<FrameBindings, DynasurfError> {
        let device = &context.device;
        let layouts = self.programs.layouts();
        let res = &self.resources;
        let targets = &res.targets;
        let buffers = &res.uniforms;
        let frame = SlotResource::Buffer(&buffers.frame);
        let palette = SlotResource::Buffer(res.palette.buffer());
        let clamp = SlotResource::Sampler(&res.clamp_sampler, true);

        // Inactive slots bind the first level's points; the shaders never
        // read them.
        let level_of = |slot: usize| {
            active
                .get(slot)
                .or(active.first())
                .map_or(LodLevel::Hierarchical, |a| a.level)
        };
        let points = [
            SlotResource::Buffer(res.points(level_of(0)).buffer()),
            SlotResource::Buffer(res.points(level_of(1)).buffer()),
        ];

        let mut impostor = Vec::with_capacity(active.len());
        let mut spawn = Vec::with_capacity(active.len());
        for slot in 0..active.len() {
            let level = SlotResource::Buffer(&buffers.levels[slot]);
            let list = &res.lists[slot];
            impostor.push(layouts::IMPOSTOR.bind(
                device,
                &layouts.impostor,
                &[frame, level, points[slot], palette],
            )?);
            spawn.push(layouts::SPAWN.bind(
                device,
                &layouts.spawn,
                &[
                    frame,
                    level,
                    points[slot],
                    palette,
                    SlotResource::Buffer(&list.heads),
                    SlotResource::Buffer(&list.records),
                    SlotResource::Buffer(&list.counter),
                ],
            )?);
        }

        let [list0, list1] = &res.lists;
        let surface = layouts::SURFACE.bind(
            device,
            &layouts.surface,
            &[
                frame,
                SlotResource::Buffer(&buffers.levels[0]),
                SlotResource::Buffer(&buffers.levels[1]),
                palette,
                points[0],
                points[1],
                SlotResource::Buffer(&list0.heads),
                SlotResource::Buffer(&list1.heads),
                SlotResource::Buffer(&list0.records),
                SlotResource::Buffer(&list1.records),
                texture(&targets.spheres[0].position),
                texture(&targets.spheres[0].normal),
                texture(&targets.spheres[1].position),
                texture(&targets.spheres[1].normal),
            ],
        )?;

        let ambient = if options.lighting.ambient_occlusion {
            Some(AmbientBindings {
                sample: layouts::AO_SAMPLE.bind(
                    device,
                    &layouts.ao_sample,
                    &[
                        frame,
                        SlotResource::Buffer(&buffers.ambient),
                        texture(&targets.surface_position),
                        texture(&targets.surface_normal),
                        SlotResource::Texture(&res.noise, wgpu::TextureFormat::Rgba8Unorm),
                    ],
                )?,
                horizontal: layouts::AO_BLUR.bind(
                    device,
                    &layouts.ao_blur,
                    &[
                        SlotResource::Buffer(&buffers.blur_horizontal),
                        texture(&targets.ambient),
                        clamp,
                    ],
                )?,
                vertical: layouts::AO_BLUR.bind(
                    device,
                    &layouts.ao_blur,
                    &[
                        SlotResource::Buffer(&buffers.blur_vertical),
                        texture(&targets.blur),
                        clamp,
                    ],
                )?,
            })
        } else {
            None
        };

        let lighting = &options.lighting;
        let libraries = &res.libraries;
        let shade = layouts::SHADE.bind(
            device,
            &layouts.shade,
            &[
                frame,
                texture(&targets.surface_position),
                texture(&targets.surface_normal),
                texture(&targets.surface_diffuse),
                texture(&targets.sphere_diffuse),
                texture(&targets.ambient),
                SlotResource::Texture(
                    libraries.environments.view(lighting.environment_index),
                    LIBRARY_FORMAT,
                ),
                SlotResource::Texture(
                    libraries.materials.view(lighting.material_index),
                    LIBRARY_FORMAT,
                ),
                SlotResource::Texture(libraries.bumps.view(lighting.bump_index), LIBRARY_FORMAT),
                texture(&targets.shadow_color),
                SlotResource::Sampler(&res.repeat_sampler, true),
                clamp,
            ],
        )?;

        let depth_of_field = if plan.contains(PassKind::DepthOfFieldBlend) {
            Some(DepthOfFieldBindings {
                horizontal: layouts::DOF_BLUR.bind(
                    device,
                    &layouts.dof_blur,
                    &[
                        frame,
                        SlotResource::Buffer(&buffers.blur_horizontal),
                        texture(&targets.color),
                        texture(&targets.color),
                        texture(&targets.surface_position),
                    ],
                )?,
                vertical: layouts::DOF_BLUR.bind(
                    device,
                    &layouts.dof_blur,
                    &[
                        frame,
                        SlotResource::Buffer(&buffers.blur_vertical),
                        texture(&targets.dof_near_h),
                        texture(&targets.dof_far_h),
                        texture(&targets.surface_position),
                    ],
                )?,
                blend: layouts::DOF_BLEND.bind(
                    device,
                    &layouts.dof_blend,
                    &[
                        frame,
                        texture(&targets.color),
                        texture(&targets.dof_near),
                        texture(&targets.dof_far),
                        texture(&targets.surface_position),
                    ],
                )?,
            })
        } else {
            None
        };

        let grid = if options.debug.show_grid {
            Some(GridBindings {
                bin: layouts::GRID_BIN.bind(
                    device,
                    &layouts.grid_bin,
                    &[
                        SlotResource::Buffer(&buffers.grid),
                        SlotResource::Buffer(res.points(LodLevel::Sparse).buffer()),
                        SlotResource::Buffer(&res.grid_cells),
                    ],
                )?,
                cells: layouts::GRID_CELLS.bind(
                    device,
                    &layouts.grid_cells,
                    &[
                        SlotResource::Buffer(&buffers.grid),
                        frame,
                        SlotResource::Buffer(&res.grid_cells),
                    ],
                )?,
            })
        } else {
            None
        };

        let display = if plan.contains(PassKind::Display) {
            Some(layouts::DISPLAY.bind(
                device,
                &layouts.display,
                &[texture(self.final_target(plan)), clamp],
            )?)
        } else {
            None
        };

        Ok(FrameBindings {
            impostor,
            spawn,
            surface,
            ambient,
            shade,
            depth_of_field,
            grid,
            display,
            source: plan.source(),
            grid_instances: 1 << (3 * options.debug.clamped_grid_level()),
            sparse_count: self.scene.level_points(LodLevel::Sparse, 0).len() as u32,
        })
    }

    fn final_target(&self, plan: &FramePlan) -> &RenderTarget {
        match plan.source() {
            FinalSource::Color => &self.resources.targets.color,
            FinalSource::Composite => &self.resources.targets.composite,
        }
    }

    fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: PassKind,
        bindings: &FrameBindings,
        active: &[ActiveLevel],
        view: &ViewState,
        output: &OutputTarget<'_>,
    ) -> Result<u32, DynasurfError> {
        let pipelines = self.programs.pipelines();
        let targets = &self.resources.targets;
        let background = clear_color(view.background);
        let missing = |what: &'static str| DynasurfError::BindingMismatch {
            pass: pass.label(),
            reason: format!("{what} bindings were not created"),
        };
        log::trace!("recording pass {}", pass.label());

        let draws = match pass {
            PassKind::GridBin => {
                let grid = bindings.grid.as_ref().ok_or_else(|| missing("grid"))?;
                encoder.clear_buffer(&self.resources.grid_cells, 0, None);
                if bindings.sparse_count == 0 {
                    return Ok(0);
                }
                let mut compute = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some(pass.label()),
                    timestamp_writes: None,
                });
                compute.set_pipeline(&pipelines.grid_bin);
                compute.set_bind_group(0, &grid.bin, &[]);
                compute.dispatch_workgroups(bindings.sparse_count.div_ceil(GRID_WORKGROUP), 1, 1);
                1
            }
            PassKind::Shadow => {
                let first = active.first().ok_or_else(|| missing("shadow"))?;
                let group = bindings.impostor.first().ok_or_else(|| missing("shadow"))?;
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&targets.shadow_color.view, wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT))],
                    depth(&targets.shadow_depth.view, wgpu::LoadOp::Clear(1.0)),
                );
                render.set_pipeline(&pipelines.shadow);
                render.set_bind_group(0, group, &[]);
                render.draw(0..IMPOSTOR_VERTICES, 0..first.count);
                1
            }
            PassKind::Sphere { slot } => {
                let level = active.get(slot).ok_or_else(|| missing("sphere"))?;
                let group = bindings.impostor.get(slot).ok_or_else(|| missing("sphere"))?;
                let spheres = &targets.spheres[slot];
                let clear = wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT);
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&spheres.position.view, clear), color(&spheres.normal.view, clear)],
                    depth(&spheres.depth.view, wgpu::LoadOp::Clear(1.0)),
                );
                render.set_pipeline(&pipelines.sphere);
                render.set_bind_group(0, group, &[]);
                render.draw(0..IMPOSTOR_VERTICES, 0..level.count);
                1
            }
            PassKind::ListGeneration { slot } => {
                let level = active.get(slot).ok_or_else(|| missing("list"))?;
                let group = bindings.spawn.get(slot).ok_or_else(|| missing("list"))?;
                self.resources.lists[slot].clear(encoder);
                let mut render = begin(
                    encoder,
                    pass,
                    &[],
                    depth(&targets.spheres[slot].depth.view, wgpu::LoadOp::Load),
                );
                render.set_pipeline(&pipelines.spawn);
                render.set_bind_group(0, group, &[]);
                render.draw(0..IMPOSTOR_VERTICES, 0..level.count);
                1
            }
            PassKind::Surface => {
                let clear = wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT);
                let mut render = begin(
                    encoder,
                    pass,
                    &[
                        color(&targets.surface_position.view, clear),
                        color(&targets.surface_normal.view, clear),
                        color(&targets.surface_diffuse.view, clear),
                        color(&targets.sphere_diffuse.view, clear),
                    ],
                    depth(&targets.surface_depth.view, wgpu::LoadOp::Clear(1.0)),
                );
                fullscreen(&mut render, &pipelines.surface, &bindings.surface)
            }
            PassKind::Overlaps => {
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&targets.color.view, wgpu::LoadOp::Clear(background))],
                    None,
                );
                fullscreen(&mut render, &pipelines.overlaps, &bindings.surface)
            }
            PassKind::AmbientSample
            | PassKind::AmbientBlurHorizontal
            | PassKind::AmbientBlurVertical => {
                let ambient = bindings.ambient.as_ref().ok_or_else(|| missing("ambient"))?;
                let (target, pipeline, group) = match pass {
                    PassKind::AmbientSample => {
                        (&targets.ambient, &pipelines.ao_sample, &ambient.sample)
                    }
                    PassKind::AmbientBlurHorizontal => {
                        (&targets.blur, &pipelines.ao_blur, &ambient.horizontal)
                    }
                    _ => (&targets.ambient, &pipelines.ao_blur, &ambient.vertical),
                };
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&target.view, wgpu::LoadOp::Clear(wgpu::Color::WHITE))],
                    None,
                );
                fullscreen(&mut render, pipeline, group)
            }
            PassKind::Shade => {
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&targets.color.view, wgpu::LoadOp::Clear(background))],
                    None,
                );
                fullscreen(&mut render, &pipelines.shade, &bindings.shade)
            }
            PassKind::GridOverlay => {
                let grid = bindings.grid.as_ref().ok_or_else(|| missing("grid"))?;
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&targets.color.view, wgpu::LoadOp::Load)],
                    None,
                );
                render.set_pipeline(&pipelines.grid_cells);
                render.set_bind_group(0, &grid.cells, &[]);
                render.draw(0..IMPOSTOR_VERTICES, 0..bindings.grid_instances);
                1
            }
            PassKind::DepthOfFieldHorizontal | PassKind::DepthOfFieldVertical => {
                let dof = bindings
                    .depth_of_field
                    .as_ref()
                    .ok_or_else(|| missing("depth of field"))?;
                let (near, far, group) = if pass == PassKind::DepthOfFieldHorizontal {
                    (&targets.dof_near_h, &targets.dof_far_h, &dof.horizontal)
                } else {
                    (&targets.dof_near, &targets.dof_far, &dof.vertical)
                };
                let clear = wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT);
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&near.view, clear), color(&far.view, clear)],
                    None,
                );
                fullscreen(&mut render, &pipelines.dof_blur, group)
            }
            PassKind::DepthOfFieldBlend => {
                let dof = bindings
                    .depth_of_field
                    .as_ref()
                    .ok_or_else(|| missing("depth of field"))?;
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(&targets.composite.view, wgpu::LoadOp::Clear(background))],
                    None,
                );
                fullscreen(&mut render, &pipelines.dof_blend, &dof.blend)
            }
            PassKind::Blit => {
                let source = match bindings.source {
                    FinalSource::Color => &targets.color,
                    FinalSource::Composite => &targets.composite,
                };
                let (width, height) = source.size();
                encoder.copy_texture_to_texture(
                    source.texture.as_image_copy(),
                    output.texture.as_image_copy(),
                    wgpu::Extent3d {
                        width,
                        height,
                        depth_or_array_layers: 1,
                    },
                );
                0
            }
            PassKind::Display => {
                let group = bindings.display.as_ref().ok_or_else(|| missing("display"))?;
                let pipeline =
                    self.programs
                        .display(output.format())
                        .ok_or_else(|| DynasurfError::Shader {
                            name: "display",
                            message: format!("no pipeline for {:?}", output.format()),
                        })?;
                let mut render = begin(
                    encoder,
                    pass,
                    &[color(output.view, wgpu::LoadOp::Clear(background))],
                    None,
                );
                fullscreen(&mut render, pipeline, group)
            }
        };
        Ok(draws)
    }
}

struct AmbientBindings {
    sample: wgpu::BindGroup,
    horizontal: wgpu::BindGroup,
    vertical: wgpu::BindGroup,
}

struct DepthOfFieldBindings {
    horizontal: wgpu::BindGroup,
    vertical: wgpu::BindGroup,
    blend: wgpu::BindGroup,
}

struct GridBindings {
    bin: wgpu::BindGroup,
    cells: wgpu::BindGroup,
}

/// Bind groups of one frame. Rebuilt every frame, so target reallocation
/// and slot reassignment never leave a stale view bound.
struct FrameBindings {
    impostor: Vec<wgpu::BindGroup>,
    spawn: Vec<wgpu::BindGroup>,
    surface: wgpu::BindGroup,
    ambient: Option<AmbientBindings>,
    shade: wgpu::BindGroup,
    depth_of_field: Option<DepthOfFieldBindings>,
    grid: Option<GridBindings>,
    display: Option<wgpu::BindGroup>,
    source: FinalSource,
    grid_instances: u32,
    sparse_count: u32,
}

fn texture(target: &RenderTarget) -> SlotResource<'_> {
    SlotResource::Texture(&target.view, target.format())
}

fn clear_color(c: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(c[0]),
        g: f64::from(c[1]),
        b: f64::from(c[2]),
        a: f64::from(c[3]),
    }
}

fn color(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<wgpu::Color>,
) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}

fn depth(
    view: &wgpu::TextureView,
    load: wgpu::LoadOp<f32>,
) -> Option<wgpu::RenderPassDepthStencilAttachment<'_>> {
    Some(wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load,
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    })
}

fn begin<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    pass: PassKind,
    colors: &[Option<wgpu::RenderPassColorAttachment<'_>>],
    depth_stencil: Option<wgpu::RenderPassDepthStencilAttachment<'_>>,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(pass.label()),
        color_attachments: colors,
        depth_stencil_attachment: depth_stencil,
        ..Default::default()
    })
}

fn fullscreen(
    render: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    group: &wgpu::BindGroup,
) -> u32 {
    render.set_pipeline(pipeline);
    render.set_bind_group(0, group, &[]);
    render.draw(0..3, 0..1);
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_size_follows_scale() {
        assert_eq!(working_size((800, 600), 1.0), (800, 600));
        assert_eq!(working_size((800, 600), 0.5), (400, 300));
        assert_eq!(working_size((801, 601), 0.25), (200, 150));
        assert_eq!(working_size((0, 0), 2.0), (1, 1));
    }

    #[test]
    fn skipped_frames_issue_no_draws() {
        assert_eq!(FrameOutcome::Skipped.draws(), 0);
        let rendered = FrameOutcome::Rendered {
            passes: vec![PassKind::Surface],
            draws: 7,
        };
        assert_eq!(rendered.draws(), 7);
    }
}
