//! Shared wgpu boilerplate helpers for impostor, screen-space and compute
//! pipelines.
//!
//! Impostor pipelines draw 6 vertices per instance and fetch point data from
//! storage buffers; screen-space pipelines draw a single oversized triangle.
//! Neither uses vertex buffers.

/// Vertices per impostor quad (two triangles).
pub const IMPOSTOR_VERTICES: u32 = 6;

/// Inputs for [`create_screen_space_pipeline`] and
/// [`create_impostor_pipeline`].
pub struct PipelineDef<'a> {
    /// Debug label prefix.
    pub label: &'a str,
    /// Composed shader module.
    pub shader: &'a wgpu::ShaderModule,
    /// Fragment entry point (vertex entry is always `vs_main`).
    pub fragment_entry: &'a str,
    /// Color targets, in `@location` order.
    pub targets: &'a [Option<wgpu::ColorTargetState>],
    /// Depth attachment state, if the pass has one.
    pub depth: Option<wgpu::DepthStencilState>,
    /// Bind group layouts, in group order.
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
}

/// Color target without blending, writing all channels.
pub fn color_target(format: wgpu::TextureFormat) -> Option<wgpu::ColorTargetState> {
    Some(wgpu::ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })
}

/// Color target combining source and destination with `max`.
pub fn max_blend_target(
    format: wgpu::TextureFormat,
) -> Option<wgpu::ColorTargetState> {
    let max = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Max,
    };
    Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState {
            color: max,
            alpha: max,
        }),
        write_mask: wgpu::ColorWrites::ALL,
    })
}

/// Depth attachment state.
pub fn depth_state(
    format: wgpu::TextureFormat,
    write: bool,
    compare: wgpu::CompareFunction,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    def: &PipelineDef<'_>,
    primitive: wgpu::PrimitiveState,
) -> wgpu::RenderPipeline {
    let pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", def.label)),
            bind_group_layouts: def.bind_group_layouts,
            push_constant_ranges: &[],
        });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{} Pipeline", def.label)),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: def.shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: def.shader,
            entry_point: Some(def.fragment_entry),
            targets: def.targets,
            compilation_options: Default::default(),
        }),
        primitive,
        depth_stencil: def.depth.clone(),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Create a full-screen render pipeline with a `vs_main` vertex entry
/// point and no vertex buffers.
pub fn create_screen_space_pipeline(
    device: &wgpu::Device,
    def: &PipelineDef<'_>,
) -> wgpu::RenderPipeline {
    create_pipeline(device, def, wgpu::PrimitiveState::default())
}

/// Create an instanced impostor pipeline: one quad of
/// [`IMPOSTOR_VERTICES`] per instance, no culling.
pub fn create_impostor_pipeline(
    device: &wgpu::Device,
    def: &PipelineDef<'_>,
) -> wgpu::RenderPipeline {
    create_pipeline(
        device,
        def,
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
    )
}

/// Create a compute pipeline for `entry` with its own layout.
pub fn create_compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    entry: &str,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::ComputePipeline {
    let pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts,
            push_constant_ranges: &[],
        });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&format!("{label} Pipeline")),
        layout: Some(&pipeline_layout),
        module: shader,
        entry_point: Some(entry),
        compilation_options: Default::default(),
        cache: None,
    })
}

/// ClampToEdge + Linear sampler (the most common post-process sampler).
pub fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Repeat + Linear sampler for tiling material and bump maps.
pub fn repeat_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
