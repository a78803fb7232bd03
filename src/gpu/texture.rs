//! Framework-agnostic render-target texture abstraction.

/// A render-target texture, its default view, and the parameters needed to
/// reallocate it.
///
/// The texture is created with `RENDER_ATTACHMENT | TEXTURE_BINDING |
/// COPY_SRC` usage, making it suitable for off-screen rendering followed by
/// sampling in a later pass or a copy into the output.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    label: &'static str,
    format: wgpu::TextureFormat,
}

impl RenderTarget {
    /// Create a new render-target texture with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            label,
            format,
        }
    }

    /// Reallocate at a new size. Contents are discarded. No-op when the size
    /// is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if self.size() != size {
            *self = Self::new(device, self.label, size, self.format);
        }
    }

    /// Debug label.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Texel format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Dimensions in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}
