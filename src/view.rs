//! Per-frame inputs supplied by the host window or an offscreen caller.

use glam::{Mat4, Vec2};
use web_time::Instant;

/// Everything the host decides about a frame: viewport, transforms, cursor
/// and time. Read-only to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Display viewport in pixels.
    pub viewport: (u32, u32),
    /// Clear color for pixels without geometry.
    pub background: [f32; 4],
    /// World → eye.
    pub view: Mat4,
    /// Object → world.
    pub model: Mat4,
    /// Eye → clip (wgpu `[0, 1]` depth).
    pub projection: Mat4,
    /// World → light eye space.
    pub light_view: Mat4,
    /// Light eye → light clip.
    pub light_projection: Mat4,
    /// Cursor in pixels (origin top-left), if over the viewport.
    pub cursor: Option<Vec2>,
    /// Seconds since start, drives animation.
    pub time: f32,
}

impl ViewState {
    /// View of `viewport` with identity transforms and a perspective
    /// projection of `fovy` radians.
    pub fn new(viewport: (u32, u32), fovy: f32, near: f32, far: f32) -> Self {
        let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
        Self {
            viewport,
            background: [1.0, 1.0, 1.0, 1.0],
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            projection: Mat4::perspective_rh(fovy, aspect, near, far),
            light_view: Mat4::IDENTITY,
            light_projection: Mat4::orthographic_rh(
                -1.0, 1.0, -1.0, 1.0, near, far,
            ),
            cursor: None,
            time: 0.0,
        }
    }

    /// Vertical field of view in radians, recovered from the projection.
    pub fn fov(&self) -> f32 {
        2.0 * (1.0 / self.projection.y_axis.y).atan()
    }

    /// Near plane distance of a `perspective_rh` projection.
    pub fn near(&self) -> f32 {
        self.projection.w_axis.z / self.projection.z_axis.z
    }

    /// Object → eye.
    pub fn model_view(&self) -> Mat4 {
        self.view * self.model
    }
}

/// Texture the finished frame is presented into.
#[derive(Debug, Clone, Copy)]
pub struct OutputTarget<'a> {
    /// Destination texture (swapchain image or offscreen).
    pub texture: &'a wgpu::Texture,
    /// Render view of `texture`.
    pub view: &'a wgpu::TextureView,
}

impl<'a> OutputTarget<'a> {
    /// Wrap a texture and its view.
    pub fn new(texture: &'a wgpu::Texture, view: &'a wgpu::TextureView) -> Self {
        Self { texture, view }
    }

    /// Pixel format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }

    /// Size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    /// Whether a texture copy can write into this target.
    pub fn accepts_copy(&self) -> bool {
        self.texture.usage().contains(wgpu::TextureUsages::COPY_DST)
    }
}

/// Wall clock feeding [`ViewState::time`].
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    /// Clock starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
        }
    }

    /// Seconds since construction.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// Seconds since the previous `tick` (or construction).
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_and_near_recovered_from_projection() {
        let view = ViewState::new((800, 600), 0.8, 0.5, 100.0);
        assert!((view.fov() - 0.8).abs() < 1e-5);
        assert!((view.near() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn model_view_composes_view_after_model() {
        let mut view = ViewState::new((1, 1), 1.0, 0.1, 10.0);
        view.model = Mat4::from_translation(glam::Vec3::X);
        view.view = Mat4::from_scale(glam::Vec3::splat(2.0));
        let p = view.model_view().transform_point3(glam::Vec3::ZERO);
        assert_eq!(p, glam::Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn clock_is_monotonic() {
        let mut clock = FrameClock::new();
        assert!(clock.tick() >= 0.0);
        assert!(clock.elapsed() >= 0.0);
    }
}
