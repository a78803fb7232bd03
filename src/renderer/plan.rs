//! Pass ordering for one frame, decided on the host without touching the
//! GPU.
//!
//! wgpu inserts the hazard barriers at pass boundaries, so the order here
//! is also the producer/consumer order: every pass only reads targets that
//! an earlier entry wrote.

use crate::lod::LodSelection;
use crate::options::Options;

/// One GPU pass of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Bin the sparse points into the occupancy grid (compute).
    GridBin,
    /// Light-space impostors into the shadow map.
    Shadow,
    /// Inner-sphere impostors of an active level.
    Sphere {
        /// LOD slot (0 or 1).
        slot: usize,
    },
    /// Clear and rebuild the intersection list of an active level.
    ListGeneration {
        /// LOD slot (0 or 1).
        slot: usize,
    },
    /// Resolve the implicit surface.
    Surface,
    /// Heat map of list lengths into the color target.
    Overlaps,
    /// Sample ambient occlusion.
    AmbientSample,
    /// Horizontal occlusion blur.
    AmbientBlurHorizontal,
    /// Vertical occlusion blur.
    AmbientBlurVertical,
    /// Deferred shading into the color target.
    Shade,
    /// Occupied grid cells over the color target.
    GridOverlay,
    /// Horizontal near/far blur.
    DepthOfFieldHorizontal,
    /// Vertical near/far blur.
    DepthOfFieldVertical,
    /// Blend color, near and far layers into the composite.
    DepthOfFieldBlend,
    /// Copy the final color into the output.
    Blit,
    /// Rescale the final color into the output.
    Display,
}

impl PassKind {
    /// Label used for wgpu passes and logs.
    pub const fn label(self) -> &'static str {
        match self {
            Self::GridBin => "Grid Bin",
            Self::Shadow => "Shadow",
            Self::Sphere { slot: 0 } => "Sphere 0",
            Self::Sphere { .. } => "Sphere 1",
            Self::ListGeneration { slot: 0 } => "List Generation 0",
            Self::ListGeneration { .. } => "List Generation 1",
            Self::Surface => "Surface",
            Self::Overlaps => "Overlaps",
            Self::AmbientSample => "Ambient Sample",
            Self::AmbientBlurHorizontal => "Ambient Blur H",
            Self::AmbientBlurVertical => "Ambient Blur V",
            Self::Shade => "Shade",
            Self::GridOverlay => "Grid Overlay",
            Self::DepthOfFieldHorizontal => "DoF Blur H",
            Self::DepthOfFieldVertical => "DoF Blur V",
            Self::DepthOfFieldBlend => "DoF Blend",
            Self::Blit => "Blit",
            Self::Display => "Display",
        }
    }
}

/// Which target holds the finished frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalSource {
    /// The shaded (or overlap) color target.
    Color,
    /// The depth-of-field composite.
    Composite,
}

/// Everything [`FramePlan::build`] reads.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    /// Options sampled for this frame.
    pub options: &'a Options,
    /// Active LOD levels.
    pub selection: LodSelection,
    /// Working resolution.
    pub working_size: (u32, u32),
    /// Output size.
    pub output_size: (u32, u32),
    /// Format of the final color.
    pub color_format: wgpu::TextureFormat,
    /// Format of the output.
    pub output_format: wgpu::TextureFormat,
    /// Whether the output can be a copy destination.
    pub output_accepts_copy: bool,
}

/// Ordered passes of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    passes: Vec<PassKind>,
    source: FinalSource,
}

impl FramePlan {
    /// Decide the passes for a frame.
    pub fn build(inputs: &PlanInputs<'_>) -> Self {
        let options = inputs.options;
        let debug = &options.debug;
        let overlaps = debug.visualize_overlaps;
        let mut passes = Vec::with_capacity(20);

        if debug.show_grid {
            passes.push(PassKind::GridBin);
        }
        if debug.shadows && !overlaps {
            passes.push(PassKind::Shadow);
        }

        let slots = inputs.selection.active_count();
        for slot in 0..slots {
            passes.push(PassKind::Sphere { slot });
        }
        for slot in 0..slots {
            passes.push(PassKind::ListGeneration { slot });
        }

        let dof = options.depth_of_field.enabled && !overlaps;
        if overlaps {
            passes.push(PassKind::Overlaps);
        } else {
            passes.push(PassKind::Surface);
            if options.lighting.ambient_occlusion {
                passes.extend([
                    PassKind::AmbientSample,
                    PassKind::AmbientBlurHorizontal,
                    PassKind::AmbientBlurVertical,
                ]);
            }
            passes.push(PassKind::Shade);
        }
        if debug.show_grid {
            passes.push(PassKind::GridOverlay);
        }
        if dof {
            passes.extend([
                PassKind::DepthOfFieldHorizontal,
                PassKind::DepthOfFieldVertical,
                PassKind::DepthOfFieldBlend,
            ]);
        }

        let blit = inputs.working_size == inputs.output_size
            && inputs.color_format == inputs.output_format
            && inputs.output_accepts_copy;
        passes.push(if blit { PassKind::Blit } else { PassKind::Display });

        Self {
            passes,
            source: if dof {
                FinalSource::Composite
            } else {
                FinalSource::Color
            },
        }
    }

    /// Passes in execution order.
    pub fn passes(&self) -> &[PassKind] {
        &self.passes
    }

    /// Whether `pass` runs this frame.
    pub fn contains(&self, pass: PassKind) -> bool {
        self.passes.contains(&pass)
    }

    /// Target presented to the output.
    pub fn source(&self) -> FinalSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lod::LodSelector;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

    fn plan_with(options: &Options, t: f32) -> FramePlan {
        FramePlan::build(&PlanInputs {
            options,
            selection: LodSelector::standard().select(t),
            working_size: (800, 600),
            output_size: (800, 600),
            color_format: FORMAT,
            output_format: FORMAT,
            output_accepts_copy: true,
        })
    }

    fn position(plan: &FramePlan, pass: PassKind) -> usize {
        plan.passes()
            .iter()
            .position(|p| *p == pass)
            .unwrap_or_else(|| panic!("{pass:?} missing"))
    }

    #[test]
    fn default_plan_is_minimal() {
        let plan = plan_with(&Options::default(), 1.0);
        assert_eq!(
            plan.passes(),
            &[
                PassKind::Sphere { slot: 0 },
                PassKind::ListGeneration { slot: 0 },
                PassKind::Surface,
                PassKind::Shade,
                PassKind::Blit,
            ]
        );
        assert_eq!(plan.source(), FinalSource::Color);
    }

    #[test]
    fn blended_levels_draw_both_slots_before_the_surface() {
        let plan = plan_with(&Options::default(), 0.25);
        let surface = position(&plan, PassKind::Surface);
        for slot in 0..2 {
            assert!(position(&plan, PassKind::Sphere { slot }) < surface);
            assert!(position(&plan, PassKind::ListGeneration { slot }) < surface);
        }
    }

    #[test]
    fn every_feature_runs_in_dependency_order() {
        let mut options = Options::default();
        options.lighting.ambient_occlusion = true;
        options.depth_of_field.enabled = true;
        options.debug.shadows = true;
        options.debug.show_grid = true;
        let plan = plan_with(&options, 0.25);
        let order = [
            PassKind::GridBin,
            PassKind::Shadow,
            PassKind::Sphere { slot: 0 },
            PassKind::ListGeneration { slot: 1 },
            PassKind::Surface,
            PassKind::AmbientSample,
            PassKind::AmbientBlurHorizontal,
            PassKind::AmbientBlurVertical,
            PassKind::Shade,
            PassKind::GridOverlay,
            PassKind::DepthOfFieldHorizontal,
            PassKind::DepthOfFieldVertical,
            PassKind::DepthOfFieldBlend,
            PassKind::Blit,
        ];
        let positions: Vec<usize> =
            order.iter().map(|p| position(&plan, *p)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
        assert_eq!(plan.source(), FinalSource::Composite);
    }

    #[test]
    fn overlaps_skip_occlusion_shading_and_depth_of_field() {
        let mut options = Options::default();
        options.lighting.ambient_occlusion = true;
        options.depth_of_field.enabled = true;
        options.debug.visualize_overlaps = true;
        let plan = plan_with(&options, 1.0);
        assert!(plan.contains(PassKind::Overlaps));
        for skipped in [
            PassKind::Surface,
            PassKind::AmbientSample,
            PassKind::Shade,
            PassKind::DepthOfFieldBlend,
        ] {
            assert!(!plan.contains(skipped), "{skipped:?}");
        }
        assert_eq!(plan.source(), FinalSource::Color);
    }

    #[test]
    fn mismatched_output_uses_display_pass() {
        let options = Options::default();
        let base = PlanInputs {
            options: &options,
            selection: LodSelector::standard().select(1.0),
            working_size: (400, 300),
            output_size: (800, 600),
            color_format: FORMAT,
            output_format: FORMAT,
            output_accepts_copy: true,
        };
        assert!(FramePlan::build(&base).contains(PassKind::Display));

        let format = PlanInputs {
            working_size: (800, 600),
            output_format: wgpu::TextureFormat::Rgba8Unorm,
            ..base
        };
        assert!(FramePlan::build(&format).contains(PassKind::Display));

        let no_copy = PlanInputs {
            working_size: (800, 600),
            output_accepts_copy: false,
            ..base
        };
        let plan = FramePlan::build(&no_copy);
        assert!(plan.contains(PassKind::Display));
        assert!(!plan.contains(PassKind::Blit));
    }
}
