//! GPU uniform layouts and their per-frame derivation.
//!
//! Every struct here mirrors a WGSL struct field for field (`frame.wgsl`,
//! `aosample.wgsl`, `grid.wgsl`), using only `vec4`/`mat4`-sized members so
//! no implicit padding is needed.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::lod::{LodDescriptor, LodSelection};
use crate::options::{AnimationOptions, Options};
use crate::view::ViewState;

/// Spheres assumed to overlap at a surface point when deriving how far a
/// sphere's field must reach.
pub const CONTRIBUTING_SPHERES: f32 = 32.0;

/// Ambient occlusion kernel size.
pub const AO_KERNEL_SIZE: usize = 32;

/// Influence radius multiplier: `sqrt(ln(CONTRIBUTING_SPHERES * e^s) / s)`.
///
/// At this multiple of its radius a single sphere's field has dropped to
/// `1 / CONTRIBUTING_SPHERES` of the iso value.
pub fn radius_scale(sharpness: f32) -> f32 {
    let s = sharpness.max(1e-3);
    ((CONTRIBUTING_SPHERES.ln() + s) / s).sqrt()
}

/// Playback state derived from the animation options and clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Shader time, -1 when animation is off.
    pub time: f32,
    /// Hierarchical timestep to draw.
    pub timestep: usize,
    /// Fraction of the way to the next timestep.
    pub delta: f32,
}

impl AnimationState {
    /// Derive the playback state at `time` seconds for a scene with
    /// `timesteps` timesteps.
    pub fn derive(
        options: &AnimationOptions,
        time: f32,
        timesteps: usize,
    ) -> Self {
        let last = timesteps.saturating_sub(1);
        if !options.animate || timesteps == 0 {
            return Self {
                time: -1.0,
                timestep: options.timestep.min(last),
                delta: 0.0,
            };
        }
        let position = (time.max(0.0) * options.frequency.max(0.0)).max(0.0);
        Self {
            time: time.max(0.0),
            timestep: (position.floor() as usize) % timesteps,
            delta: position.fract(),
        }
    }
}

/// Per-frame uniforms (`Frame` in `frame.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Object → eye.
    pub model_view: [[f32; 4]; 4],
    /// Eye → clip.
    pub projection: [[f32; 4]; 4],
    /// Object → clip.
    pub model_view_projection: [[f32; 4]; 4],
    /// Clip → eye.
    pub inverse_projection: [[f32; 4]; 4],
    /// Inverse transpose of `model_view`.
    pub normal_matrix: [[f32; 4]; 4],
    /// Eye → object.
    pub inverse_model_view: [[f32; 4]; 4],
    /// Object → light eye.
    pub light_model_view: [[f32; 4]; 4],
    /// Light eye → light clip.
    pub light_projection: [[f32; 4]; 4],
    /// Light position in object space.
    pub light_position: [f32; 4],
    /// Light position in eye space.
    pub view_light_position: [f32; 4],
    /// Ambient material color.
    pub ambient: [f32; 4],
    /// Diffuse material color.
    pub diffuse: [f32; 4],
    /// Specular color, shininess in `w`.
    pub specular: [f32; 4],
    /// Background color.
    pub background: [f32; 4],
    /// Object-space bounding sphere center and radius.
    pub object: [f32; 4],
    /// Pixel → eye ray coefficients.
    pub projection_info: [f32; 4],
    /// Width, height, 1/width, 1/height of the working resolution.
    pub viewport: [f32; 4],
    /// Focal distance, cursor x, cursor y, lens radius.
    pub focus: [f32; 4],
    /// Sharpness, radius scale, distance blending, distance scale.
    pub surface: [f32; 4],
    /// Focal length, aperture, max CoC radius, far radius rescale.
    pub depth_of_field: [f32; 4],
    /// Time (-1 when off), timestep delta, amplitude, frequency.
    pub animation: [f32; 4],
    /// Near plane, projection scale, field of view, LOD fraction.
    pub misc: [f32; 4],
    /// Coloring mode, active levels, residue offset, chain offset.
    pub flags: [u32; 4],
}

/// Everything [`FrameUniforms::derive`] reads.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Host view state.
    pub view: &'a ViewState,
    /// Options sampled for this frame.
    pub options: &'a Options,
    /// Working resolution.
    pub size: (u32, u32),
    /// Active LOD levels.
    pub selection: LodSelection,
    /// Object-space bounding sphere.
    pub bounding_sphere: (Vec3, f32),
    /// Playback state.
    pub animation: AnimationState,
    /// Palette residue and chain offsets.
    pub palette_offsets: (u32, u32),
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    v.extend(w).to_array()
}

impl FrameUniforms {
    /// Derive the uniforms for one frame. Pure: identical inputs yield
    /// identical bytes.
    pub fn derive(inputs: &FrameInputs<'_>) -> Self {
        let view = inputs.view;
        let options = inputs.options;
        let lighting = &options.lighting;
        let surface = &options.surface;
        let dof = &options.depth_of_field;
        let animation = &options.animation;

        let (width, height) = (inputs.size.0.max(1) as f32, inputs.size.1.max(1) as f32);
        let model_view = view.model_view();
        let projection = view.projection;
        let light_model_view = view.light_view * view.model;
        let light_position = light_model_view.inverse().transform_point3(Vec3::ZERO);
        let view_light_position = model_view.transform_point3(light_position);

        let p00 = projection.x_axis.x;
        let p11 = projection.y_axis.y;
        let p20 = projection.z_axis.x;
        let p21 = projection.z_axis.y;
        let projection_info = [
            2.0 / (width * p00),
            -2.0 / (height * p11),
            (p20 - 1.0) / p00,
            (1.0 + p21) / p11,
        ];

        let fov = view.fov();
        let focal_length = 1.0 / (2.0 * (fov * 0.5).tan());
        let aperture = focal_length / dof.f_stop();

        let cursor = view.cursor.map_or(Vec2::splat(-1.0e6), |c| {
            let vx = view.viewport.0.max(1) as f32;
            let vy = view.viewport.1.max(1) as f32;
            c * Vec2::new(width / vx, height / vy)
        });

        let (center, radius) = inputs.bounding_sphere;
        let (residue_offset, chain_offset) = inputs.palette_offsets;

        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            model_view_projection: (projection * model_view).to_cols_array_2d(),
            inverse_projection: projection.inverse().to_cols_array_2d(),
            normal_matrix: model_view.inverse().transpose().to_cols_array_2d(),
            inverse_model_view: model_view.inverse().to_cols_array_2d(),
            light_model_view: light_model_view.to_cols_array_2d(),
            light_projection: view.light_projection.to_cols_array_2d(),
            light_position: vec4(light_position, 1.0),
            view_light_position: vec4(view_light_position, 1.0),
            ambient: vec4(Vec3::from_array(lighting.ambient), 1.0),
            diffuse: vec4(Vec3::from_array(lighting.diffuse), 1.0),
            specular: vec4(Vec3::from_array(lighting.specular), lighting.shininess),
            background: view.background,
            object: vec4(center, radius),
            projection_info,
            viewport: [width, height, 1.0 / width, 1.0 / height],
            focus: [dof.focal_distance, cursor.x, cursor.y, surface.lens_radius],
            surface: [
                surface.sharpness,
                radius_scale(surface.sharpness),
                surface.distance_blending,
                surface.distance_scale,
            ],
            depth_of_field: [
                focal_length,
                aperture,
                dof.max_coc_radius,
                dof.far_radius_rescale,
            ],
            animation: [
                inputs.animation.time,
                inputs.animation.delta,
                animation.amplitude,
                animation.frequency,
            ],
            misc: [
                view.near(),
                p11 * height * 0.5,
                fov,
                inputs.selection.fraction(),
            ],
            flags: [
                surface.coloring.as_index(),
                inputs.selection.active_count() as u32,
                residue_offset,
                chain_offset,
            ],
        }
    }
}

/// Per-level uniforms (`Level` in `frame.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LevelUniforms {
    /// Level radius multiplier.
    pub radius: f32,
    /// Outer (influence) radius as a multiple of the sphere radius.
    pub influence: f32,
    /// Clustering growth.
    pub clustering: f32,
    /// Sharpness multiplier.
    pub sharpness: f32,
    /// Blend weight.
    pub weight: f32,
    /// [`LodLevel`](crate::lod::LodLevel) index.
    pub level: u32,
    /// Points drawn.
    pub point_count: u32,
    /// Intersection list capacity in records.
    pub capacity: u32,
}

impl LevelUniforms {
    /// Uniforms for `descriptor` drawn with `weight`.
    pub fn new(
        descriptor: &LodDescriptor,
        weight: f32,
        user_sharpness: f32,
        capacity: u32,
    ) -> Self {
        Self {
            radius: descriptor.base_radius,
            influence: radius_scale(user_sharpness * descriptor.sharpness),
            clustering: descriptor.clustering,
            sharpness: descriptor.sharpness,
            weight,
            level: descriptor.level.index() as u32,
            point_count: descriptor.vertex_count,
            capacity,
        }
    }

    /// Placeholder for an inactive slot: contributes nothing.
    pub fn inactive() -> Self {
        Self {
            radius: 1.0,
            influence: 1.0,
            clustering: 0.0,
            sharpness: 1.0,
            weight: 0.0,
            level: 0,
            point_count: 0,
            capacity: 0,
        }
    }
}

/// Separable blur direction (`Blur` in `aoblur.wgsl` / `dofblur.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    /// Unit axis in `xy`, texel size in `zw`.
    pub direction: [f32; 4],
}

impl BlurUniforms {
    /// Horizontal pass over a `size` target.
    pub fn horizontal(size: (u32, u32)) -> Self {
        Self::along(Vec2::X, size)
    }

    /// Vertical pass over a `size` target.
    pub fn vertical(size: (u32, u32)) -> Self {
        Self::along(Vec2::Y, size)
    }

    fn along(axis: Vec2, size: (u32, u32)) -> Self {
        let texel = Vec2::new(1.0 / size.0.max(1) as f32, 1.0 / size.1.max(1) as f32);
        Self {
            direction: Vec4::new(axis.x, axis.y, texel.x, texel.y).to_array(),
        }
    }
}

/// Ambient occlusion kernel and parameters (`AoParams` in
/// `aosample.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AoUniforms {
    /// Hemisphere sample offsets.
    pub kernel: [[f32; 4]; AO_KERNEL_SIZE],
    /// Radius, bias, power, unused.
    pub params: [f32; 4],
}

impl AoUniforms {
    /// Kernel plus the current occlusion options.
    pub fn new(kernel: [[f32; 4]; AO_KERNEL_SIZE], options: &Options) -> Self {
        let lighting = &options.lighting;
        Self {
            kernel,
            params: [lighting.ao_radius, lighting.ao_bias, lighting.ao_power, 0.0],
        }
    }
}

/// Occupancy grid parameters (`Grid` in `grid.wgsl`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridUniforms {
    /// Grid minimum corner.
    pub minimum: [f32; 4],
    /// Grid maximum corner.
    pub maximum: [f32; 4],
    /// Depth, point count, overlay level, total cells.
    pub params: [u32; 4],
}

/// Cells of all depths `1..=depth` of the flattened octree:
/// `(8^(depth+1) - 8) / 7`.
pub const fn grid_cell_count(depth: u32) -> u32 {
    ((1u32 << (3 * (depth + 1))) - 8) / 7
}

impl GridUniforms {
    /// Grid over `bounds` binning `point_count` points.
    pub fn new(
        bounds: (Vec3, Vec3),
        point_count: u32,
        depth: u32,
        level: u32,
    ) -> Self {
        Self {
            minimum: vec4(bounds.0, 0.0),
            maximum: vec4(bounds.1, 0.0),
            params: [depth, point_count, level, grid_cell_count(depth)],
        }
    }
}

/// Object → light-eye transform for a light placed along `direction` from
/// the bounding sphere, looking at its center.
pub fn light_view_for(center: Vec3, radius: f32, direction: Vec3) -> (Mat4, Mat4) {
    let radius = radius.max(1e-3);
    let dir = direction.try_normalize().unwrap_or(Vec3::Z);
    let eye = center + dir * radius * 2.0;
    let up = if dir.y.abs() > 0.99 { Vec3::X } else { Vec3::Y };
    let view = Mat4::look_at_rh(eye, center, up);
    let projection =
        Mat4::orthographic_rh(-radius, radius, -radius, radius, radius * 0.5, radius * 3.5);
    (view, projection)
}
