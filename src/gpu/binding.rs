//! Declarative per-pass binding tables.
//!
//! Every pass declares its resources once as a static [`PassLayout`]: a list
//! of `{binding, name, kind, visibility}` slots. The same table produces the
//! wgpu bind group layout and validates the resources supplied for a bind
//! group, so layout and shader bindings cannot drift apart per call site.

use crate::error::DynasurfError;

/// What a binding slot expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Uniform buffer.
    Uniform,
    /// Storage buffer.
    Storage {
        /// `var<storage, read>` when true, `read_write` otherwise.
        read_only: bool,
    },
    /// Float 2D texture.
    Texture {
        /// Whether the slot is sampled with filtering.
        filterable: bool,
    },
    /// Sampler.
    Sampler {
        /// Whether the slot is a filtering sampler.
        filtering: bool,
    },
}

/// One binding slot of a pass.
#[derive(Debug, Clone, Copy)]
pub struct SlotDesc {
    /// `@binding` index.
    pub binding: u32,
    /// Resource name for diagnostics.
    pub name: &'static str,
    /// Expected resource kind.
    pub kind: SlotKind,
    /// Shader stages that access the slot.
    pub visibility: wgpu::ShaderStages,
}

impl SlotDesc {
    /// Uniform buffer slot.
    pub const fn uniform(
        binding: u32,
        name: &'static str,
        visibility: wgpu::ShaderStages,
    ) -> Self {
        Self {
            binding,
            name,
            kind: SlotKind::Uniform,
            visibility,
        }
    }

    /// Read-only storage buffer slot.
    pub const fn storage(
        binding: u32,
        name: &'static str,
        visibility: wgpu::ShaderStages,
    ) -> Self {
        Self {
            binding,
            name,
            kind: SlotKind::Storage { read_only: true },
            visibility,
        }
    }

    /// Read-write storage buffer slot.
    pub const fn storage_rw(
        binding: u32,
        name: &'static str,
        visibility: wgpu::ShaderStages,
    ) -> Self {
        Self {
            binding,
            name,
            kind: SlotKind::Storage { read_only: false },
            visibility,
        }
    }

    /// Fragment-visible texture slot read with `textureLoad`.
    pub const fn texture(binding: u32, name: &'static str) -> Self {
        Self {
            binding,
            name,
            kind: SlotKind::Texture { filterable: false },
            visibility: wgpu::ShaderStages::FRAGMENT,
        }
    }

    /// Fragment-visible texture slot read with `textureSample`.
    pub const fn filtered_texture(binding: u32, name: &'static str) -> Self {
        Self {
            binding,
            name,
            kind: SlotKind::Texture { filterable: true },
            visibility: wgpu::ShaderStages::FRAGMENT,
        }
    }

    /// Fragment-visible filtering sampler slot.
    pub const fn sampler(binding: u32, name: &'static str) -> Self {
        Self {
            binding,
            name,
            kind: SlotKind::Sampler { filtering: true },
            visibility: wgpu::ShaderStages::FRAGMENT,
        }
    }

    fn layout_entry(&self) -> wgpu::BindGroupLayoutEntry {
        let ty = match self.kind {
            SlotKind::Uniform => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            SlotKind::Storage { read_only } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            SlotKind::Texture { filterable } => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            SlotKind::Sampler { filtering } => {
                wgpu::BindingType::Sampler(if filtering {
                    wgpu::SamplerBindingType::Filtering
                } else {
                    wgpu::SamplerBindingType::NonFiltering
                })
            }
        };
        wgpu::BindGroupLayoutEntry {
            binding: self.binding,
            visibility: self.visibility,
            ty,
            count: None,
        }
    }

    /// Check a resource against this slot, returning the reason it does not
    /// fit.
    fn accepts(&self, resource: ResourceKind) -> Result<(), String> {
        match (self.kind, resource) {
            (SlotKind::Uniform, ResourceKind::Buffer { usage }) => {
                if usage.contains(wgpu::BufferUsages::UNIFORM) {
                    Ok(())
                } else {
                    Err(format!("'{}' buffer lacks UNIFORM usage", self.name))
                }
            }
            (SlotKind::Storage { .. }, ResourceKind::Buffer { usage }) => {
                if usage.contains(wgpu::BufferUsages::STORAGE) {
                    Ok(())
                } else {
                    Err(format!("'{}' buffer lacks STORAGE usage", self.name))
                }
            }
            (
                SlotKind::Texture { filterable },
                ResourceKind::Texture { format },
            ) => match format.sample_type(None, None) {
                Some(wgpu::TextureSampleType::Float {
                    filterable: format_filterable,
                }) if format_filterable || !filterable => Ok(()),
                Some(wgpu::TextureSampleType::Float { .. }) => Err(format!(
                    "'{}' needs a filterable format, got {format:?}",
                    self.name
                )),
                _ => Err(format!(
                    "'{}' needs a float color format, got {format:?}",
                    self.name
                )),
            },
            (
                SlotKind::Sampler { filtering },
                ResourceKind::Sampler {
                    filtering: sampler_filtering,
                },
            ) => {
                if filtering || !sampler_filtering {
                    Ok(())
                } else {
                    Err(format!(
                        "'{}' needs a non-filtering sampler",
                        self.name
                    ))
                }
            }
            (kind, resource) => Err(format!(
                "'{}' expects {kind:?}, got {resource:?}",
                self.name
            )),
        }
    }
}

/// Resource supplied for one slot when creating a bind group.
#[derive(Clone, Copy)]
pub enum SlotResource<'a> {
    /// Whole-buffer binding.
    Buffer(&'a wgpu::Buffer),
    /// Texture view plus the format of its texture.
    Texture(&'a wgpu::TextureView, wgpu::TextureFormat),
    /// Sampler plus whether it filters.
    Sampler(&'a wgpu::Sampler, bool),
}

impl SlotResource<'_> {
    /// Shape of the resource, as far as slot validation is concerned.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Buffer(buffer) => ResourceKind::Buffer {
                usage: buffer.usage(),
            },
            Self::Texture(_, format) => ResourceKind::Texture { format: *format },
            Self::Sampler(_, filtering) => ResourceKind::Sampler {
                filtering: *filtering,
            },
        }
    }

    fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        match self {
            Self::Buffer(buffer) => buffer.as_entire_binding(),
            Self::Texture(view, _) => wgpu::BindingResource::TextureView(view),
            Self::Sampler(sampler, _) => wgpu::BindingResource::Sampler(sampler),
        }
    }
}

/// Device-free description of a supplied resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A buffer with the given usage flags.
    Buffer {
        /// Usage the buffer was created with.
        usage: wgpu::BufferUsages,
    },
    /// A texture view of the given format.
    Texture {
        /// Texel format.
        format: wgpu::TextureFormat,
    },
    /// A sampler.
    Sampler {
        /// Whether it filters.
        filtering: bool,
    },
}

/// Static binding table of one pass (bind group 0).
#[derive(Debug)]
pub struct PassLayout {
    /// Pass label, used for wgpu labels and diagnostics.
    pub label: &'static str,
    /// Slots in the order resources are supplied.
    pub slots: &'static [SlotDesc],
}

impl PassLayout {
    /// wgpu layout entries for every slot.
    pub fn entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.slots.iter().map(SlotDesc::layout_entry).collect()
    }

    /// Create the bind group layout for this pass.
    pub fn create_layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Bind Group Layout", self.label)),
            entries: &self.entries(),
        })
    }

    /// Validate supplied resources against the slot table: one resource per
    /// slot, in order, each of a compatible kind.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::BindingMismatch`] naming the first offending
    /// slot.
    pub fn validate(&self, kinds: &[ResourceKind]) -> Result<(), DynasurfError> {
        if kinds.len() != self.slots.len() {
            return Err(DynasurfError::BindingMismatch {
                pass: self.label,
                reason: format!(
                    "expected {} resources, got {}",
                    self.slots.len(),
                    kinds.len()
                ),
            });
        }
        for (slot, kind) in self.slots.iter().zip(kinds) {
            slot.accepts(*kind)
                .map_err(|reason| DynasurfError::BindingMismatch {
                    pass: self.label,
                    reason,
                })?;
        }
        Ok(())
    }

    /// Validate `resources` and create an immutable bind group from them.
    ///
    /// # Errors
    ///
    /// Returns [`DynasurfError::BindingMismatch`] if validation fails.
    pub fn bind(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        resources: &[SlotResource<'_>],
    ) -> Result<wgpu::BindGroup, DynasurfError> {
        let kinds: Vec<ResourceKind> =
            resources.iter().map(SlotResource::kind).collect();
        self.validate(&kinds)?;
        let entries: Vec<wgpu::BindGroupEntry<'_>> = self
            .slots
            .iter()
            .zip(resources)
            .map(|(slot, resource)| wgpu::BindGroupEntry {
                binding: slot.binding,
                resource: resource.binding_resource(),
            })
            .collect();
        Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", self.label)),
            layout,
            entries: &entries,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: wgpu::ShaderStages = wgpu::ShaderStages::VERTEX;

    static TEST_LAYOUT: PassLayout = PassLayout {
        label: "Test",
        slots: &[
            SlotDesc::uniform(0, "frame", V),
            SlotDesc::storage(1, "points", V),
            SlotDesc::texture(2, "positions"),
            SlotDesc::filtered_texture(3, "ambient"),
            SlotDesc::sampler(4, "linear"),
        ],
    };

    fn good_kinds() -> Vec<ResourceKind> {
        vec![
            ResourceKind::Buffer {
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            },
            ResourceKind::Buffer {
                usage: wgpu::BufferUsages::STORAGE,
            },
            ResourceKind::Texture {
                format: wgpu::TextureFormat::Rgba32Float,
            },
            ResourceKind::Texture {
                format: wgpu::TextureFormat::R8Unorm,
            },
            ResourceKind::Sampler { filtering: true },
        ]
    }

    #[test]
    fn matching_resources_validate() {
        assert!(TEST_LAYOUT.validate(&good_kinds()).is_ok());
    }

    #[test]
    fn wrong_count_is_rejected() {
        let mut kinds = good_kinds();
        let _ = kinds.pop();
        assert!(matches!(
            TEST_LAYOUT.validate(&kinds),
            Err(DynasurfError::BindingMismatch { pass: "Test", .. })
        ));
    }

    #[test]
    fn storage_slot_rejects_uniform_buffer() {
        let mut kinds = good_kinds();
        kinds[1] = ResourceKind::Buffer {
            usage: wgpu::BufferUsages::UNIFORM,
        };
        let err = TEST_LAYOUT.validate(&kinds).unwrap_err();
        assert!(err.to_string().contains("points"));
    }

    #[test]
    fn filtered_slot_rejects_unfilterable_format() {
        let mut kinds = good_kinds();
        kinds[3] = ResourceKind::Texture {
            format: wgpu::TextureFormat::Rgba32Float,
        };
        assert!(TEST_LAYOUT.validate(&kinds).is_err());
    }

    #[test]
    fn texture_slot_rejects_depth_format() {
        let mut kinds = good_kinds();
        kinds[2] = ResourceKind::Texture {
            format: wgpu::TextureFormat::Depth32Float,
        };
        assert!(TEST_LAYOUT.validate(&kinds).is_err());
    }

    #[test]
    fn sampler_in_texture_slot_is_rejected() {
        let mut kinds = good_kinds();
        kinds[2] = ResourceKind::Sampler { filtering: true };
        assert!(TEST_LAYOUT.validate(&kinds).is_err());
    }

    #[test]
    fn entries_follow_slot_bindings() {
        let entries = TEST_LAYOUT.entries();
        let bindings: Vec<u32> = entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1, 2, 3, 4]);
    }
}
