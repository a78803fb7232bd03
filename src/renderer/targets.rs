//! Every render target of the pass sequence.
//!
//! Viewport-sized targets follow the working resolution and are reallocated
//! (contents discarded) on resize. The shadow map has a fixed size.

use crate::gpu::texture::RenderTarget;

/// Sphere hit positions (`w` = eye depth, 0 when empty).
pub const SPHERE_POSITION_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba32Float;
/// Sphere normals (`w` = point index).
pub const SPHERE_NORMAL_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba32Float;
/// Surface position, normal and diffuse buffers.
pub const SURFACE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Every depth attachment.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Ambient occlusion and its blur.
pub const AMBIENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;
/// Depth-of-field layers.
pub const DOF_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Shadow map color (`1 - depth`, max blended).
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Shadow map edge length.
pub const SHADOW_SIZE: u32 = 1024;

/// Inner-sphere buffers of one LOD slot.
pub struct SphereTargets {
    /// Eye-space hit position.
    pub position: RenderTarget,
    /// Hit normal plus point index.
    pub normal: RenderTarget,
    /// Hit depth.
    pub depth: RenderTarget,
}

impl SphereTargets {
    fn new(device: &wgpu::Device, slot: usize, size: (u32, u32)) -> Self {
        let (position, normal, depth) = if slot == 0 {
            ("Sphere Position 0", "Sphere Normal 0", "Sphere Depth 0")
        } else {
            ("Sphere Position 1", "Sphere Normal 1", "Sphere Depth 1")
        };
        Self {
            position: RenderTarget::new(device, position, size, SPHERE_POSITION_FORMAT),
            normal: RenderTarget::new(device, normal, size, SPHERE_NORMAL_FORMAT),
            depth: RenderTarget::new(device, depth, size, DEPTH_FORMAT),
        }
    }

    fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        self.position.resize(device, size);
        self.normal.resize(device, size);
        self.depth.resize(device, size);
    }

    fn all(&self) -> [&RenderTarget; 3] {
        [&self.position, &self.normal, &self.depth]
    }
}

/// All targets, owned by the resource pool.
pub struct TargetSet {
    /// Per-slot sphere buffers.
    pub spheres: [SphereTargets; 2],
    /// Surface hit position (`w` = eye depth, 0 when empty).
    pub surface_position: RenderTarget,
    /// Surface normal.
    pub surface_normal: RenderTarget,
    /// Surface albedo.
    pub surface_diffuse: RenderTarget,
    /// Albedo of the nearest sphere (`a` = 0 when none).
    pub sphere_diffuse: RenderTarget,
    /// Surface depth.
    pub surface_depth: RenderTarget,
    /// Ambient occlusion term.
    pub ambient: RenderTarget,
    /// Intermediate of the separable occlusion blur.
    pub blur: RenderTarget,
    /// Shaded color.
    pub color: RenderTarget,
    /// Depth-of-field composite.
    pub composite: RenderTarget,
    /// Horizontally blurred near layer.
    pub dof_near_h: RenderTarget,
    /// Horizontally blurred far layer.
    pub dof_far_h: RenderTarget,
    /// Near layer.
    pub dof_near: RenderTarget,
    /// Far layer.
    pub dof_far: RenderTarget,
    /// Shadow map (nearest occluder as `1 - depth`).
    pub shadow_color: RenderTarget,
    /// Shadow depth.
    pub shadow_depth: RenderTarget,
    size: (u32, u32),
}

impl TargetSet {
    /// Allocate every target. `color_format` is the shaded color format,
    /// normally the presentation format so the final copy can be a blit.
    pub fn new(
        device: &wgpu::Device,
        size: (u32, u32),
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let size = (size.0.max(1), size.1.max(1));
        let target = |label, format| RenderTarget::new(device, label, size, format);
        let shadow = (SHADOW_SIZE, SHADOW_SIZE);
        Self {
            spheres: [
                SphereTargets::new(device, 0, size),
                SphereTargets::new(device, 1, size),
            ],
            surface_position: target("Surface Position", SURFACE_FORMAT),
            surface_normal: target("Surface Normal", SURFACE_FORMAT),
            surface_diffuse: target("Surface Diffuse", SURFACE_FORMAT),
            sphere_diffuse: target("Sphere Diffuse", SURFACE_FORMAT),
            surface_depth: target("Surface Depth", DEPTH_FORMAT),
            ambient: target("Ambient", AMBIENT_FORMAT),
            blur: target("Ambient Blur", AMBIENT_FORMAT),
            color: target("Color", color_format),
            composite: target("Composite", color_format),
            dof_near_h: target("DoF Near Horizontal", DOF_FORMAT),
            dof_far_h: target("DoF Far Horizontal", DOF_FORMAT),
            dof_near: target("DoF Near", DOF_FORMAT),
            dof_far: target("DoF Far", DOF_FORMAT),
            shadow_color: RenderTarget::new(device, "Shadow Color", shadow, SHADOW_FORMAT),
            shadow_depth: RenderTarget::new(device, "Shadow Depth", shadow, DEPTH_FORMAT),
            size,
        }
    }

    /// Reallocate every viewport-sized target. Returns whether anything
    /// changed (bind groups referencing the old views are stale).
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) -> bool {
        let size = (size.0.max(1), size.1.max(1));
        if size == self.size {
            return false;
        }
        for spheres in &mut self.spheres {
            spheres.resize(device, size);
        }
        for target in [
            &mut self.surface_position,
            &mut self.surface_normal,
            &mut self.surface_diffuse,
            &mut self.sphere_diffuse,
            &mut self.surface_depth,
            &mut self.ambient,
            &mut self.blur,
            &mut self.color,
            &mut self.composite,
            &mut self.dof_near_h,
            &mut self.dof_far_h,
            &mut self.dof_near,
            &mut self.dof_far,
        ] {
            target.resize(device, size);
        }
        self.size = size;
        log::debug!("render targets resized to {}x{}", size.0, size.1);
        true
    }

    /// Working resolution.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Shaded color format.
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color.format()
    }

    /// Label and size of every target, shadow map included.
    pub fn dimensions(&self) -> Vec<(&'static str, (u32, u32))> {
        let [first, second] = &self.spheres;
        first
            .all()
            .into_iter()
            .chain(second.all())
            .chain([
                &self.surface_position,
                &self.surface_normal,
                &self.surface_diffuse,
                &self.sphere_diffuse,
                &self.surface_depth,
                &self.ambient,
                &self.blur,
                &self.color,
                &self.composite,
                &self.dof_near_h,
                &self.dof_far_h,
                &self.dof_near,
                &self.dof_far,
                &self.shadow_color,
                &self.shadow_depth,
            ])
            .map(|t| (t.label(), t.size()))
            .collect()
    }
}
