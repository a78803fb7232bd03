//! Named attachment groups and their completeness check.
//!
//! wgpu validates attachments lazily, at pass begin. Checking every group
//! once at setup turns a bad format or size mix into a
//! [`DynasurfError::FramebufferIncomplete`] before anything is drawn.

use crate::error::DynasurfError;
use crate::gpu::texture::RenderTarget;
use crate::renderer::targets::TargetSet;

/// One attachment of a framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentInfo {
    /// Target label.
    pub target: &'static str,
    /// Texel format.
    pub format: wgpu::TextureFormat,
    /// Size in pixels.
    pub size: (u32, u32),
}

impl From<&RenderTarget> for AttachmentInfo {
    fn from(target: &RenderTarget) -> Self {
        Self {
            target: target.label(),
            format: target.format(),
            size: target.size(),
        }
    }
}

/// Device limits the completeness check enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentLimits {
    /// Maximum color attachments per pass.
    pub max_color_attachments: u32,
    /// Maximum summed color bytes per sample.
    pub max_color_attachment_bytes_per_sample: u32,
}

impl From<&wgpu::Limits> for AttachmentLimits {
    fn from(limits: &wgpu::Limits) -> Self {
        Self {
            max_color_attachments: limits.max_color_attachments,
            max_color_attachment_bytes_per_sample: limits
                .max_color_attachment_bytes_per_sample,
        }
    }
}

/// A named group of color attachments plus an optional depth attachment,
/// bound together for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferLayout {
    /// Framebuffer name.
    pub name: &'static str,
    /// Color attachments in `@location` order.
    pub colors: Vec<AttachmentInfo>,
    /// Depth attachment.
    pub depth: Option<AttachmentInfo>,
}

impl FramebufferLayout {
    /// Layout from targets.
    pub fn new(
        name: &'static str,
        colors: &[&RenderTarget],
        depth: Option<&RenderTarget>,
    ) -> Self {
        Self {
            name,
            colors: colors.iter().map(|t| AttachmentInfo::from(*t)).collect(),
            depth: depth.map(AttachmentInfo::from),
        }
    }

    /// Check the attachment set against `limits`.
    ///
    /// # Errors
    ///
    /// [`DynasurfError::FramebufferIncomplete`] naming the first problem:
    /// no attachments, mismatched sizes, a non-renderable color format, a
    /// non-depth depth format, or too many attachments / bytes per sample.
    pub fn check_complete(
        &self,
        limits: &AttachmentLimits,
    ) -> Result<(), DynasurfError> {
        let fail = |reason: String| DynasurfError::FramebufferIncomplete {
            framebuffer: self.name,
            reason,
        };

        let mut attachments = self.colors.iter().chain(self.depth.iter());
        let Some(first) = attachments.next() else {
            return Err(fail("no attachments".to_owned()));
        };
        if let Some(other) = attachments.find(|a| a.size != first.size) {
            return Err(fail(format!(
                "'{}' is {:?} but '{}' is {:?}",
                other.target, other.size, first.target, first.size
            )));
        }

        if self.colors.len() > limits.max_color_attachments as usize {
            return Err(fail(format!(
                "{} color attachments exceed the limit of {}",
                self.colors.len(),
                limits.max_color_attachments
            )));
        }

        let mut bytes = 0;
        for color in &self.colors {
            let cost = if color.format.is_depth_stencil_format() {
                None
            } else {
                color.format.target_pixel_byte_cost()
            };
            match cost {
                Some(cost) => bytes += cost,
                None => {
                    return Err(fail(format!(
                        "'{}' has non-color-renderable format {:?}",
                        color.target, color.format
                    )));
                }
            }
        }
        if bytes > limits.max_color_attachment_bytes_per_sample {
            return Err(fail(format!(
                "{bytes} color bytes per sample exceed the limit of {}",
                limits.max_color_attachment_bytes_per_sample
            )));
        }

        if let Some(depth) = &self.depth {
            if !depth.format.has_depth_aspect() {
                return Err(fail(format!(
                    "'{}' has non-depth format {:?}",
                    depth.target, depth.format
                )));
            }
        }
        Ok(())
    }
}

/// Every framebuffer the pass sequence renders into.
pub fn framebuffers(targets: &TargetSet) -> Vec<FramebufferLayout> {
    let [s0, s1] = &targets.spheres;
    vec![
        FramebufferLayout::new("sphere0", &[&s0.position, &s0.normal], Some(&s0.depth)),
        FramebufferLayout::new("sphere1", &[&s1.position, &s1.normal], Some(&s1.depth)),
        FramebufferLayout::new(
            "surface",
            &[
                &targets.surface_position,
                &targets.surface_normal,
                &targets.surface_diffuse,
                &targets.sphere_diffuse,
            ],
            Some(&targets.surface_depth),
        ),
        FramebufferLayout::new("ambient", &[&targets.ambient], None),
        FramebufferLayout::new("blur", &[&targets.blur], None),
        FramebufferLayout::new("shade", &[&targets.color], None),
        FramebufferLayout::new(
            "dof_h",
            &[&targets.dof_near_h, &targets.dof_far_h],
            None,
        ),
        FramebufferLayout::new("dof_v", &[&targets.dof_near, &targets.dof_far], None),
        FramebufferLayout::new("composite", &[&targets.composite], None),
        FramebufferLayout::new(
            "shadow",
            &[&targets.shadow_color],
            Some(&targets.shadow_depth),
        ),
    ]
}

/// Check every framebuffer once.
///
/// # Errors
///
/// The first [`DynasurfError::FramebufferIncomplete`] found.
pub fn check_all(
    targets: &TargetSet,
    limits: &AttachmentLimits,
) -> Result<(), DynasurfError> {
    for framebuffer in framebuffers(targets) {
        framebuffer.check_complete(limits)?;
        log::debug!("framebuffer '{}' complete", framebuffer.name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: AttachmentLimits = AttachmentLimits {
        max_color_attachments: 8,
        max_color_attachment_bytes_per_sample: 32,
    };

    fn attachment(
        target: &'static str,
        format: wgpu::TextureFormat,
        size: (u32, u32),
    ) -> AttachmentInfo {
        AttachmentInfo {
            target,
            format,
            size,
        }
    }

    fn surface_layout() -> FramebufferLayout {
        let f = wgpu::TextureFormat::Rgba16Float;
        FramebufferLayout {
            name: "surface",
            colors: vec![
                attachment("position", f, (64, 32)),
                attachment("normal", f, (64, 32)),
                attachment("diffuse", f, (64, 32)),
                attachment("sphere", f, (64, 32)),
            ],
            depth: Some(attachment(
                "depth",
                wgpu::TextureFormat::Depth32Float,
                (64, 32),
            )),
        }
    }

    fn reason(result: Result<(), DynasurfError>) -> String {
        match result {
            Err(DynasurfError::FramebufferIncomplete { reason, .. }) => reason,
            other => panic!("expected incomplete framebuffer, got {other:?}"),
        }
    }

    #[test]
    fn surface_layout_is_complete() {
        surface_layout().check_complete(&LIMITS).unwrap();
    }

    #[test]
    fn empty_framebuffer_is_incomplete() {
        let fb = FramebufferLayout {
            name: "empty",
            colors: Vec::new(),
            depth: None,
        };
        assert_eq!(reason(fb.check_complete(&LIMITS)), "no attachments");
    }

    #[test]
    fn size_mismatch_is_incomplete() {
        let mut fb = surface_layout();
        fb.colors[2].size = (32, 32);
        assert!(reason(fb.check_complete(&LIMITS)).contains("'diffuse'"));
    }

    #[test]
    fn depth_format_as_color_is_incomplete() {
        let mut fb = surface_layout();
        fb.colors[0].format = wgpu::TextureFormat::Depth32Float;
        assert!(reason(fb.check_complete(&LIMITS)).contains("non-color"));
    }

    #[test]
    fn color_format_as_depth_is_incomplete() {
        let mut fb = surface_layout();
        fb.depth = Some(attachment(
            "depth",
            wgpu::TextureFormat::Rgba8Unorm,
            (64, 32),
        ));
        assert!(reason(fb.check_complete(&LIMITS)).contains("non-depth"));
    }

    #[test]
    fn bytes_per_sample_limit_is_enforced() {
        let mut fb = surface_layout();
        fb.colors[0].format = wgpu::TextureFormat::Rgba32Float;
        assert!(reason(fb.check_complete(&LIMITS)).contains("bytes per sample"));
    }

    #[test]
    fn attachment_count_limit_is_enforced() {
        let limits = AttachmentLimits {
            max_color_attachments: 2,
            ..LIMITS
        };
        assert!(reason(surface_layout().check_complete(&limits))
            .contains("color attachments"));
    }
}
