//! Level-of-detail selection over the ordered point-set levels.
//!
//! The continuous parameter `t ∈ [0, 1]` walks coarse → fine across the
//! [`LodLevel`]s. Away from level boundaries two adjacent levels are active
//! and blended; within [`LOD_EPSILON`] of a boundary only one is drawn.

/// Snap distance to a level boundary, in units of `n * t`.
pub const LOD_EPSILON: f32 = 1e-3;

/// Point-set granularity, ordered coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodLevel {
    /// Coarse clustered points.
    Sparse,
    /// Intermediate clustered points.
    Dense,
    /// Per-timestep atoms.
    Hierarchical,
}

impl LodLevel {
    /// All levels, coarse to fine.
    pub const ALL: [Self; 3] = [Self::Sparse, Self::Dense, Self::Hierarchical];

    /// Position in [`Self::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Sparse => 0,
            Self::Dense => 1,
            Self::Hierarchical => 2,
        }
    }

    /// Level at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Radius multiplier applied to per-element radii.
    pub const fn base_radius(self) -> f32 {
        match self {
            Self::Sparse => 3.0,
            Self::Dense => 1.8,
            Self::Hierarchical => 1.0,
        }
    }

    /// How far spheres of this level grow to merge with neighbours, as a
    /// function of the LOD parameter.
    pub const fn clustering(self) -> LodCurve {
        match self {
            Self::Sparse => LodCurve::Constant(0.5),
            Self::Dense => LodCurve::Linear {
                from: 0.5,
                to: 0.0,
            },
            Self::Hierarchical => LodCurve::Constant(0.0),
        }
    }

    /// Multiplier on the user sharpness, as a function of the LOD
    /// parameter.
    pub const fn sharpness(self) -> LodCurve {
        match self {
            Self::Sparse => LodCurve::Constant(0.5),
            Self::Dense => LodCurve::Linear {
                from: 0.5,
                to: 1.0,
            },
            Self::Hierarchical => LodCurve::Smoothstep {
                from: 0.5,
                to: 1.0,
            },
        }
    }

    /// Per-frame descriptor at LOD parameter `t`.
    pub fn descriptor(self, t: f32, vertex_count: u32) -> LodDescriptor {
        LodDescriptor {
            level: self,
            vertex_count,
            base_radius: self.base_radius(),
            clustering: self.clustering().eval(t),
            sharpness: self.sharpness().eval(t),
        }
    }
}

/// A scalar function of the LOD parameter, kept as data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LodCurve {
    /// Same value everywhere.
    Constant(f32),
    /// Straight line from `from` at `t = 0` to `to` at `t = 1`.
    Linear {
        /// Value at `t = 0`.
        from: f32,
        /// Value at `t = 1`.
        to: f32,
    },
    /// Hermite ease between `from` and `to`.
    Smoothstep {
        /// Value at `t = 0`.
        from: f32,
        /// Value at `t = 1`.
        to: f32,
    },
}

impl LodCurve {
    /// Evaluate at `t`, clamped to `[0, 1]`.
    pub fn eval(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Constant(v) => v,
            Self::Linear { from, to } => from + (to - from) * t,
            Self::Smoothstep { from, to } => {
                let s = t * t * (3.0 - 2.0 * t);
                from + (to - from) * s
            }
        }
    }
}

/// Read-only per-frame description of one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodDescriptor {
    /// Which point set.
    pub level: LodLevel,
    /// Points to draw.
    pub vertex_count: u32,
    /// Radius multiplier.
    pub base_radius: f32,
    /// Clustering growth at the current parameter.
    pub clustering: f32,
    /// Sharpness multiplier at the current parameter.
    pub sharpness: f32,
}

/// Which levels are active this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LodSelection {
    /// One level, weight 1.
    Single(usize),
    /// Two adjacent levels blended by `fraction`.
    Blend {
        /// Coarser level.
        lower: usize,
        /// `lower + 1`.
        upper: usize,
        /// Weight of `upper`; `lower` gets `1 - fraction`.
        fraction: f32,
    },
}

impl LodSelection {
    /// `(first, second)` weights. A single level reports `(1, 0)`.
    pub fn weights(&self) -> (f32, f32) {
        match *self {
            Self::Single(_) => (1.0, 0.0),
            Self::Blend { fraction, .. } => (1.0 - fraction, fraction),
        }
    }

    /// Interpolation fraction between the active levels (0 when single).
    pub fn fraction(&self) -> f32 {
        match *self {
            Self::Single(_) => 0.0,
            Self::Blend { fraction, .. } => fraction,
        }
    }

    /// Number of active levels (1 or 2).
    pub fn active_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Blend { .. } => 2,
        }
    }

    /// Active `(level index, weight)` pairs in slot order.
    pub fn active(&self) -> Vec<(usize, f32)> {
        match *self {
            Self::Single(level) => vec![(level, 1.0)],
            Self::Blend {
                lower,
                upper,
                fraction,
            } => vec![(lower, 1.0 - fraction), (upper, fraction)],
        }
    }
}

/// Maps `t` onto `levels` ordered levels.
#[derive(Debug, Clone, Copy)]
pub struct LodSelector {
    levels: usize,
}

impl LodSelector {
    /// Selector over `levels` levels (at least one).
    pub fn new(levels: usize) -> Self {
        Self {
            levels: levels.max(1),
        }
    }

    /// Selector over [`LodLevel::ALL`].
    pub fn standard() -> Self {
        Self::new(LodLevel::ALL.len())
    }

    /// Select the active level(s) for `t`, clamped to `[0, 1]`.
    pub fn select(&self, t: f32) -> LodSelection {
        let n = (self.levels - 1) as f32;
        let x = n * t.clamp(0.0, 1.0);
        let nearest = x.round();
        if (x - nearest).abs() <= LOD_EPSILON {
            return LodSelection::Single(nearest as usize);
        }
        let lower = x.floor();
        LodSelection::Blend {
            lower: lower as usize,
            upper: lower as usize + 1,
            fraction: x - lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> impl Iterator<Item = f32> {
        (0..=1000).map(|i| i as f32 / 1000.0)
    }

    #[test]
    fn weights_sum_to_one_and_stay_in_range() {
        let selector = LodSelector::standard();
        for t in samples() {
            let (a, b) = selector.select(t).weights();
            assert!((a + b - 1.0).abs() < 1e-6, "t = {t}");
            assert!((0.0..=1.0).contains(&a), "t = {t}");
            assert!((0.0..=1.0).contains(&b), "t = {t}");
        }
    }

    #[test]
    fn boundaries_select_single_level() {
        let selector = LodSelector::standard();
        assert_eq!(selector.select(0.0), LodSelection::Single(0));
        assert_eq!(selector.select(0.5), LodSelection::Single(1));
        assert_eq!(selector.select(1.0), LodSelection::Single(2));
        // Within epsilon of k/n.
        assert_eq!(selector.select(0.5 + 0.0004), LodSelection::Single(1));
        assert_eq!(selector.select(1.0 - 0.0004), LodSelection::Single(2));
    }

    #[test]
    fn interior_selects_adjacent_pair() {
        let selector = LodSelector::standard();
        for t in samples() {
            let x = 2.0 * t;
            if (x - x.round()).abs() <= LOD_EPSILON {
                continue;
            }
            match selector.select(t) {
                LodSelection::Blend {
                    lower,
                    upper,
                    fraction,
                } => {
                    assert_eq!(upper, lower + 1);
                    assert_eq!(lower, x.floor() as usize);
                    assert!((fraction - (x - x.floor())).abs() < 1e-6);
                }
                LodSelection::Single(_) => panic!("t = {t} should blend"),
            }
        }
    }

    #[test]
    fn quarter_blends_sparse_and_dense() {
        let selection = LodSelector::standard().select(0.25);
        assert_eq!(
            selection,
            LodSelection::Blend {
                lower: 0,
                upper: 1,
                fraction: 0.5
            }
        );
        assert_eq!(selection.active(), vec![(0, 0.5), (1, 0.5)]);
    }

    #[test]
    fn out_of_range_parameter_is_clamped() {
        let selector = LodSelector::standard();
        assert_eq!(selector.select(-3.0), LodSelection::Single(0));
        assert_eq!(selector.select(7.0), LodSelection::Single(2));
    }

    #[test]
    fn single_level_selector_never_blends() {
        let selector = LodSelector::new(1);
        assert_eq!(selector.select(0.3), LodSelection::Single(0));
    }

    #[test]
    fn curves_hit_endpoints() {
        let linear = LodCurve::Linear { from: 0.5, to: 1.0 };
        let smooth = LodCurve::Smoothstep { from: 0.5, to: 1.0 };
        assert_eq!(linear.eval(0.0), 0.5);
        assert_eq!(linear.eval(1.0), 1.0);
        assert_eq!(smooth.eval(0.0), 0.5);
        assert_eq!(smooth.eval(1.0), 1.0);
        assert_eq!(smooth.eval(0.5), 0.75);
        assert_eq!(LodCurve::Constant(2.0).eval(0.3), 2.0);
    }

    #[test]
    fn descriptor_carries_level_data() {
        let d = LodLevel::Dense.descriptor(1.0, 42);
        assert_eq!(d.level, LodLevel::Dense);
        assert_eq!(d.vertex_count, 42);
        assert_eq!(d.base_radius, 1.8);
        assert_eq!(d.clustering, 0.0);
        assert_eq!(d.sharpness, 1.0);
    }
}
