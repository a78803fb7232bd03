//! Standalone visualization window backed by winit.
//!
//! ```no_run
//! # use dynasurf::{scene::Scene, viewer::Viewer};
//! Viewer::builder()
//!     .with_scene(Scene::default())
//!     .with_textures("assets/textures")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

mod camera;

use std::path::PathBuf;
use std::sync::Arc;

pub use camera::OrbitCamera;
use glam::{Mat4, Vec2, Vec3};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    error::DynasurfError,
    gpu::render_context::RenderContext,
    options::{ColoringMode, Options},
    renderer::{uniforms::light_view_for, FrameOutcome, FrameSequencer},
    scene::Scene,
    view::{FrameClock, OutputTarget, ViewState},
};

const BACKGROUND: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const LIGHT_DIRECTION: Vec3 = Vec3::new(0.5, 1.0, 0.8);
const LOD_STEP: f32 = 0.05;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    scene: Scene,
    options: Options,
    textures: PathBuf,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            scene: Scene::default(),
            options: Options::default(),
            textures: PathBuf::from("assets/textures"),
            title: "Dynasurf".into(),
        }
    }

    /// Scene to display.
    #[must_use]
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Root directory holding the `environments`, `materials` and `bumps`
    /// texture libraries.
    #[must_use]
    pub fn with_textures(mut self, root: impl Into<PathBuf>) -> Self {
        self.textures = root.into();
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            scene: self.scene,
            options: self.options,
            textures: self.textures,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window that renders one scene through a [`FrameSequencer`].
///
/// Left drag orbits, right drag pans, the wheel zooms. Keys toggle
/// rendering features, see [`KeyAction`].
pub struct Viewer {
    scene: Scene,
    options: Options,
    textures: PathBuf,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::Viewer`] if the event loop fails, or the
    /// first fatal error raised while setting up or rendering.
    pub fn run(self) -> Result<(), DynasurfError> {
        let event_loop = EventLoop::new()
            .map_err(|e| DynasurfError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            gpu: None,
            pending: Some((self.scene, self.options)),
            textures: self.textures,
            title: self.title,
            camera: OrbitCamera::default(),
            clock: FrameClock::new(),
            cursor: None,
            rotating: false,
            panning: false,
            error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| DynasurfError::Viewer(e.to_string()))?;
        app.error.map_or(Ok(()), Err)
    }
}

// ── Key bindings ─────────────────────────────────────────────────────────

/// Option changes bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// `L`: magic lens.
    ToggleLens,
    /// `O`: ambient occlusion.
    ToggleAmbientOcclusion,
    /// `F`: depth of field.
    ToggleDepthOfField,
    /// `V`: overlap heat map.
    ToggleOverlaps,
    /// `G`: occupancy grid overlay.
    ToggleGrid,
    /// `Space`: timestep playback.
    ToggleAnimation,
    /// `C`: next coloring mode.
    CycleColoring,
    /// `[`: toward the sparse level.
    Coarser,
    /// `]`: toward the hierarchical level.
    Finer,
}

impl KeyAction {
    /// Action bound to `code`, if any.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        Some(match code {
            KeyCode::KeyL => Self::ToggleLens,
            KeyCode::KeyO => Self::ToggleAmbientOcclusion,
            KeyCode::KeyF => Self::ToggleDepthOfField,
            KeyCode::KeyV => Self::ToggleOverlaps,
            KeyCode::KeyG => Self::ToggleGrid,
            KeyCode::Space => Self::ToggleAnimation,
            KeyCode::KeyC => Self::CycleColoring,
            KeyCode::BracketLeft => Self::Coarser,
            KeyCode::BracketRight => Self::Finer,
            _ => return None,
        })
    }

    /// Apply to `options`.
    pub fn apply(self, options: &mut Options) {
        match self {
            Self::ToggleLens => options.surface.lens ^= true,
            Self::ToggleAmbientOcclusion => {
                options.lighting.ambient_occlusion ^= true;
            }
            Self::ToggleDepthOfField => options.depth_of_field.enabled ^= true,
            Self::ToggleOverlaps => options.debug.visualize_overlaps ^= true,
            Self::ToggleGrid => options.debug.show_grid ^= true,
            Self::ToggleAnimation => options.animation.animate ^= true,
            Self::CycleColoring => {
                options.surface.coloring = match options.surface.coloring {
                    ColoringMode::None => ColoringMode::Element,
                    ColoringMode::Element => ColoringMode::Residue,
                    ColoringMode::Residue => ColoringMode::Chain,
                    ColoringMode::Chain => ColoringMode::None,
                };
            }
            Self::Coarser => {
                options.lod.interpolation =
                    (options.lod.interpolation - LOD_STEP).clamp(0.0, 1.0);
            }
            Self::Finer => {
                options.lod.interpolation =
                    (options.lod.interpolation + LOD_STEP).clamp(0.0, 1.0);
            }
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct GpuState {
    context: RenderContext,
    sequencer: FrameSequencer,
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    /// Scene and options waiting for the first `resumed`.
    pending: Option<(Scene, Options)>,
    textures: PathBuf,
    title: String,
    camera: OrbitCamera,
    clock: FrameClock,
    cursor: Option<Vec2>,
    rotating: bool,
    panning: bool,
    error: Option<DynasurfError>,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: DynasurfError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn init_gpu(&mut self, window: &Arc<Window>) -> Result<(), DynasurfError> {
        let Some((scene, options)) = self.pending.take() else {
            return Ok(());
        };
        let size = viewport_size(window.inner_size());
        let context = pollster::block_on(RenderContext::new(window.clone(), size))?;

        let (center, radius) = scene.bounding_sphere();
        self.camera.fit(center, radius, &options.camera);

        let sequencer = FrameSequencer::new(&context, scene, options, &self.textures)?;
        self.gpu = Some(GpuState { context, sequencer });
        Ok(())
    }

    fn view_state(&self, gpu: &GpuState) -> ViewState {
        let size = gpu.context.size();
        let aspect = size.0.max(1) as f32 / size.1.max(1) as f32;
        let options = gpu.sequencer.options();
        let (center, radius) = gpu.sequencer.scene().bounding_sphere();
        let (light_view, light_projection) =
            light_view_for(center, radius, LIGHT_DIRECTION);
        ViewState {
            viewport: size,
            background: BACKGROUND,
            view: self.camera.view_matrix(),
            model: Mat4::IDENTITY,
            projection: self.camera.projection(aspect, &options.camera),
            light_view,
            light_projection,
            cursor: self.cursor,
            time: self.clock.elapsed(),
        }
    }

    fn render(&mut self) -> Result<(), DynasurfError> {
        let (Some(window), Some(gpu)) = (&self.window, &self.gpu) else {
            return Ok(());
        };
        let view = self.view_state(gpu);
        let inner = window.inner_size();
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        let frame = match gpu.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let (w, h) = viewport_size(inner);
                gpu.context.resize(w, h);
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let target_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let outcome = gpu.sequencer.display(
            &gpu.context,
            &view,
            OutputTarget::new(&frame.texture, &target_view),
        )?;
        if outcome == FrameOutcome::Skipped {
            log::trace!("nothing to draw");
        }
        frame.present();
        Ok(())
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, DynasurfError::Viewer(e.to_string()));
                return;
            }
        };

        if let Err(e) = self.init_gpu(&window) {
            self.fail(event_loop, e);
            return;
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        if self.window.is_none() || self.gpu.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                let (w, h) = viewport_size(size);
                if let Some(gpu) = &mut self.gpu {
                    gpu.context.resize(w, h);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let inner = self.window.as_ref().map(|w| w.inner_size());
                if let (Some(gpu), Some(inner)) = (&mut self.gpu, inner) {
                    let (w, h) = viewport_size(inner);
                    gpu.context.resize(w, h);
                }
            }

            WindowEvent::RedrawRequested => {
                let _ = self.clock.tick();
                if let Err(e) = self.render() {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                let pressed = state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right => self.panning = pressed,
                    _ => {}
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                if let Some(last) = self.cursor {
                    let delta = position - last;
                    let camera = self
                        .gpu
                        .as_ref()
                        .map(|g| g.sequencer.options().camera.clone())
                        .unwrap_or_default();
                    if self.rotating {
                        self.camera.rotate(delta, camera.rotate_speed);
                    } else if self.panning {
                        self.camera.pan(delta, camera.pan_speed);
                    }
                }
                self.cursor = Some(position);
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                let speed = self
                    .gpu
                    .as_ref()
                    .map_or(0.1, |g| g.sequencer.options().camera.zoom_speed);
                self.camera.zoom(scroll, speed);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                if let (Some(action), Some(gpu)) =
                    (KeyAction::from_key(code), &mut self.gpu)
                {
                    log::debug!("key action {action:?}");
                    action.apply(gpu.sequencer.options_mut());
                }
            }

            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_keys_do_nothing() {
        assert_eq!(KeyAction::from_key(KeyCode::KeyZ), None);
        assert_eq!(
            KeyAction::from_key(KeyCode::KeyO),
            Some(KeyAction::ToggleAmbientOcclusion)
        );
    }

    #[test]
    fn toggles_flip_back() {
        let mut options = Options::default();
        KeyAction::ToggleDepthOfField.apply(&mut options);
        assert!(options.depth_of_field.enabled);
        KeyAction::ToggleDepthOfField.apply(&mut options);
        assert_eq!(options, Options::default());
    }

    #[test]
    fn coloring_cycles_through_every_mode() {
        let mut options = Options::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            KeyAction::CycleColoring.apply(&mut options);
            seen.push(options.surface.coloring);
        }
        assert_eq!(
            seen,
            vec![
                ColoringMode::Element,
                ColoringMode::Residue,
                ColoringMode::Chain,
                ColoringMode::None
            ]
        );
    }

    #[test]
    fn lod_steps_stay_in_range() {
        let mut options = Options::default();
        KeyAction::Finer.apply(&mut options);
        assert_eq!(options.lod.interpolation, 1.0);
        for _ in 0..30 {
            KeyAction::Coarser.apply(&mut options);
        }
        assert_eq!(options.lod.interpolation, 0.0);
    }
}
