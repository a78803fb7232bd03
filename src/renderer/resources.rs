//! GPU resources shared by every pass: targets, uniform and storage
//! buffers, per-level intersection lists, samplers and texture libraries.

use std::path::Path;

use crate::error::DynasurfError;
use crate::gpu::dynamic_buffer::TypedBuffer;
use crate::gpu::pipeline_helpers::{linear_sampler, repeat_sampler};
use crate::gpu::render_context::RenderContext;
use crate::gpu::texture_library::TextureLibrary;
use crate::lod::LodLevel;
use crate::options::MAX_GRID_DEPTH;
use crate::renderer::ambient;
use crate::renderer::framebuffer::{self, AttachmentLimits};
use crate::renderer::targets::TargetSet;
use crate::renderer::uniforms::{
    grid_cell_count, AoUniforms, BlurUniforms, FrameUniforms, GridUniforms,
    LevelUniforms, AO_KERNEL_SIZE,
};
use crate::scene::{PointRecord, Scene};

/// Intersection records per list. Fragments beyond it are dropped.
pub const INTERSECTION_CAPACITY: u32 = 1 << 21;

/// Bytes of one intersection record (`near, far, point, next`).
pub const INTERSECTION_SIZE: u64 = 16;

/// Clamp a working size to what the device can hold: each side to
/// `max_texture_dimension_2d`, and the per-pixel head buffer to
/// `max_storage_buffer_binding_size` (aspect ratio kept).
pub fn clamp_size(size: (u32, u32), limits: &wgpu::Limits) -> (u32, u32) {
    let max_side = limits.max_texture_dimension_2d.max(1);
    let mut width = size.0.clamp(1, max_side);
    let mut height = size.1.clamp(1, max_side);

    let max_pixels = u64::from(limits.max_storage_buffer_binding_size) / 4;
    let pixels = u64::from(width) * u64::from(height);
    if pixels > max_pixels {
        let factor = (max_pixels as f64 / pixels as f64).sqrt();
        width = ((f64::from(width) * factor).floor() as u32).max(1);
        height = ((f64::from(height) * factor).floor() as u32).max(1);
    }
    (width, height)
}

/// One level's per-pixel linked list.
pub struct IntersectionList {
    /// Head index per pixel (0 = empty, `i + 1` = record `i`).
    pub heads: wgpu::Buffer,
    /// Record storage.
    pub records: wgpu::Buffer,
    /// Next free record.
    pub counter: wgpu::Buffer,
    capacity: u32,
}

impl IntersectionList {
    fn new(device: &wgpu::Device, slot: usize, size: (u32, u32), capacity: u32) -> Self {
        let usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST;
        Self {
            heads: create_heads(device, slot, size),
            records: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(if slot == 0 { "Records 0" } else { "Records 1" }),
                size: u64::from(capacity) * INTERSECTION_SIZE,
                usage,
                mapped_at_creation: false,
            }),
            counter: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(if slot == 0 { "Counter 0" } else { "Counter 1" }),
                size: 4,
                usage,
                mapped_at_creation: false,
            }),
            capacity,
        }
    }

    /// Records the list can hold.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Reset the head buffer and counter.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.heads, 0, None);
        encoder.clear_buffer(&self.counter, 0, None);
    }
}

fn create_heads(device: &wgpu::Device, slot: usize, size: (u32, u32)) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(if slot == 0 { "Heads 0" } else { "Heads 1" }),
        size: u64::from(size.0.max(1)) * u64::from(size.1.max(1)) * 4,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_buffer<T: bytemuck::Pod>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Uniform buffers written once per frame.
pub struct UniformBuffers {
    /// [`FrameUniforms`].
    pub frame: wgpu::Buffer,
    /// [`LevelUniforms`] per LOD slot.
    pub levels: [wgpu::Buffer; 2],
    /// Horizontal [`BlurUniforms`].
    pub blur_horizontal: wgpu::Buffer,
    /// Vertical [`BlurUniforms`].
    pub blur_vertical: wgpu::Buffer,
    /// [`AoUniforms`].
    pub ambient: wgpu::Buffer,
    /// [`GridUniforms`].
    pub grid: wgpu::Buffer,
}

impl UniformBuffers {
    fn new(device: &wgpu::Device) -> Self {
        Self {
            frame: uniform_buffer::<FrameUniforms>(device, "Frame Uniforms"),
            levels: [
                uniform_buffer::<LevelUniforms>(device, "Level Uniforms 0"),
                uniform_buffer::<LevelUniforms>(device, "Level Uniforms 1"),
            ],
            blur_horizontal: uniform_buffer::<BlurUniforms>(device, "Blur Horizontal"),
            blur_vertical: uniform_buffer::<BlurUniforms>(device, "Blur Vertical"),
            ambient: uniform_buffer::<AoUniforms>(device, "Ambient Uniforms"),
            grid: uniform_buffer::<GridUniforms>(device, "Grid Uniforms"),
        }
    }
}

/// Environment, material and bump map libraries.
pub struct TextureLibraries {
    /// Equirectangular environment maps.
    pub environments: TextureLibrary,
    /// Matcap materials.
    pub materials: TextureLibrary,
    /// Height maps.
    pub bumps: TextureLibrary,
}

impl TextureLibraries {
    /// Load `<root>/environments`, `<root>/materials` and `<root>/bumps`.
    pub fn load(context: &RenderContext, root: &Path) -> Self {
        Self {
            environments: TextureLibrary::load(
                context,
                "Environment",
                &root.join("environments"),
                [128, 128, 128, 255],
            ),
            materials: TextureLibrary::load(
                context,
                "Material",
                &root.join("materials"),
                [255, 255, 255, 255],
            ),
            bumps: TextureLibrary::load(
                context,
                "Bump",
                &root.join("bumps"),
                [128, 128, 128, 255],
            ),
        }
    }
}

/// Everything the passes bind, owned in one place.
pub struct ResourcePool {
    /// Render targets.
    pub targets: TargetSet,
    /// Uniform buffers.
    pub uniforms: UniformBuffers,
    /// Intersection lists per LOD slot.
    pub lists: [IntersectionList; 2],
    /// Occupancy grid cell counters.
    pub grid_cells: wgpu::Buffer,
    /// Flattened palette.
    pub palette: TypedBuffer<[f32; 4]>,
    /// Clamp-to-edge linear sampler.
    pub clamp_sampler: wgpu::Sampler,
    /// Repeating linear sampler.
    pub repeat_sampler: wgpu::Sampler,
    /// Occlusion rotation noise.
    pub noise: wgpu::TextureView,
    /// Occlusion hemisphere kernel.
    pub kernel: [[f32; 4]; AO_KERNEL_SIZE],
    /// Texture libraries.
    pub libraries: TextureLibraries,
    points: [TypedBuffer<PointRecord>; 3],
    uploaded_timestep: Option<usize>,
    palette_offsets: (u32, u32),
}

impl ResourcePool {
    /// Allocate every resource at the context size, upload `scene`, load
    /// texture libraries from `textures`, and check every framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::FramebufferIncomplete`] if any framebuffer
    /// fails the completeness check.
    pub fn new(
        context: &RenderContext,
        scene: &Scene,
        textures: &Path,
    ) -> Result<Self, DynasurfError> {
        let device = &context.device;
        let limits = context.limits();
        let size = clamp_size(context.size(), &limits);
        let targets = TargetSet::new(device, size, context.format());
        framebuffer::check_all(&targets, &AttachmentLimits::from(&limits))?;

        let capacity = INTERSECTION_CAPACITY
            .min((u64::from(limits.max_storage_buffer_binding_size) / INTERSECTION_SIZE) as u32);
        let lists = [
            IntersectionList::new(device, 0, size, capacity),
            IntersectionList::new(device, 1, size, capacity),
        ];

        let storage = wgpu::BufferUsages::STORAGE;
        let empty: &[PointRecord] = &[];
        let points = [
            TypedBuffer::from_slice(device, &context.queue, "Sparse Points", empty, storage),
            TypedBuffer::from_slice(device, &context.queue, "Dense Points", empty, storage),
            TypedBuffer::from_slice(device, &context.queue, "Hierarchical Points", empty, storage),
        ];
        let palette = TypedBuffer::from_slice(
            device,
            &context.queue,
            "Palette",
            &[[0.0f32; 4]],
            storage,
        );

        let grid_cells = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Grid Cells"),
            size: u64::from(grid_cell_count(MAX_GRID_DEPTH)) * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut rng = rand::rng();
        let kernel = ambient::generate_kernel(&mut rng);
        let noise = ambient::create_noise_texture(context, &ambient::generate_noise(&mut rng));

        let mut pool = Self {
            targets,
            uniforms: UniformBuffers::new(device),
            lists,
            grid_cells,
            palette,
            clamp_sampler: linear_sampler(device, "Clamp Sampler"),
            repeat_sampler: repeat_sampler(device, "Repeat Sampler"),
            noise,
            kernel,
            libraries: TextureLibraries::load(context, textures),
            points,
            uploaded_timestep: None,
            palette_offsets: (0, 0),
        };
        pool.upload_scene(context, scene);
        log::debug!("resource pool ready at {}x{}", size.0, size.1);
        Ok(pool)
    }

    /// Reallocate viewport-sized targets and head buffers for `size`
    /// (clamped to device limits). Returns the effective size.
    pub fn resize(&mut self, context: &RenderContext, size: (u32, u32)) -> (u32, u32) {
        let clamped = clamp_size(size, &context.limits());
        if clamped != size {
            log::warn!(
                "working size {}x{} clamped to {}x{}",
                size.0,
                size.1,
                clamped.0,
                clamped.1
            );
        }
        if self.targets.resize(&context.device, clamped) {
            for (slot, list) in self.lists.iter_mut().enumerate() {
                list.heads = create_heads(&context.device, slot, clamped);
            }
        }
        clamped
    }

    /// Replace point sets and palette with `scene`'s. The hierarchical set
    /// is uploaded for timestep 0 until [`Self::sync_timestep`] says
    /// otherwise.
    pub fn upload_scene(&mut self, context: &RenderContext, scene: &Scene) {
        for level in [LodLevel::Sparse, LodLevel::Dense] {
            self.points[level.index()].write(
                &context.device,
                &context.queue,
                scene.level_points(level, 0).records(),
            );
        }
        self.uploaded_timestep = None;
        self.sync_timestep(context, scene, 0);

        let palette = scene.palette().to_gpu();
        self.palette
            .write(&context.device, &context.queue, &palette.entries);
        self.palette_offsets = (palette.residue_offset, palette.chain_offset);
        log::debug!(
            "scene uploaded: {} timestep(s), {} sparse, {} dense points",
            scene.timestep_count(),
            scene.level_points(LodLevel::Sparse, 0).len(),
            scene.level_points(LodLevel::Dense, 0).len(),
        );
    }

    /// Upload the hierarchical points of `timestep` if not already resident.
    pub fn sync_timestep(&mut self, context: &RenderContext, scene: &Scene, timestep: usize) {
        if self.uploaded_timestep == Some(timestep) {
            return;
        }
        let records = scene.level_points(LodLevel::Hierarchical, timestep).records();
        self.points[LodLevel::Hierarchical.index()].write(
            &context.device,
            &context.queue,
            records,
        );
        self.uploaded_timestep = Some(timestep);
    }

    /// Point buffer of `level`.
    pub fn points(&self, level: LodLevel) -> &TypedBuffer<PointRecord> {
        &self.points[level.index()]
    }

    /// Palette residue and chain offsets.
    pub fn palette_offsets(&self) -> (u32, u32) {
        self.palette_offsets
    }

    /// Working resolution.
    pub fn size(&self) -> (u32, u32) {
        self.targets.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(side: u32, binding: u32) -> wgpu::Limits {
        wgpu::Limits {
            max_texture_dimension_2d: side,
            max_storage_buffer_binding_size: binding,
            ..wgpu::Limits::default()
        }
    }

    #[test]
    fn sizes_within_limits_are_kept() {
        let l = limits(8192, 128 << 20);
        assert_eq!(clamp_size((1920, 1080), &l), (1920, 1080));
    }

    #[test]
    fn zero_size_becomes_one_pixel() {
        let l = limits(8192, 128 << 20);
        assert_eq!(clamp_size((0, 0), &l), (1, 1));
    }

    #[test]
    fn sides_are_clamped_to_texture_limit() {
        let l = limits(2048, 128 << 20);
        assert_eq!(clamp_size((4096, 1000), &l), (2048, 1000));
    }

    #[test]
    fn head_buffer_fits_binding_limit() {
        let l = limits(16384, 4 * 1000 * 1000);
        let (w, h) = clamp_size((4000, 2000), &l);
        assert!(u64::from(w) * u64::from(h) <= 1_000_000);
        // Aspect ratio is kept.
        assert!(((w as f32 / h as f32) - 2.0).abs() < 0.01);
    }

    #[test]
    fn record_size_matches_wgsl_struct() {
        assert_eq!(INTERSECTION_SIZE, 16);
        assert!(u64::from(INTERSECTION_CAPACITY) * INTERSECTION_SIZE <= 128 << 20);
    }
}
