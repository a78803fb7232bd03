//! Scene data consumed by the renderer.
//!
//! A [`Scene`] holds the three point-set granularities the LOD selector
//! blends between: the sparse and dense cluster sets, and one hierarchical
//! (full-resolution) set per timestep. Scenes are uploaded wholesale; the
//! renderer never mutates them.

pub mod palette;
pub mod points;
pub mod synthetic;

use glam::Vec3;
pub use palette::{ColorRamp, GpuPalette, Palette};
pub use points::{PointAttributes, PointRecord, PointSet};
pub use synthetic::{helix_bundle, HelixParams};

use crate::lod::LodLevel;

/// Point sets at every granularity plus bounds and palettes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    timesteps: Vec<PointSet>,
    sparse: PointSet,
    dense: PointSet,
    bounds: (Vec3, Vec3),
    palette: Palette,
}

impl Scene {
    /// Scene from explicit sets. Bounds cover every timestep.
    pub fn new(
        timesteps: Vec<PointSet>,
        sparse: PointSet,
        dense: PointSet,
        palette: Palette,
    ) -> Self {
        let bounds = timesteps
            .iter()
            .filter_map(PointSet::bounds)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
            .unwrap_or((Vec3::ZERO, Vec3::ZERO));
        Self {
            timesteps,
            sparse,
            dense,
            bounds,
            palette,
        }
    }

    /// Scene whose sparse and dense sets are grid-clustered from the first
    /// timestep.
    pub fn from_timesteps(
        timesteps: Vec<PointSet>,
        sparse_cell: f32,
        dense_cell: f32,
        palette: Palette,
    ) -> Self {
        let (sparse, dense) = timesteps.first().map_or_else(
            || (PointSet::default(), PointSet::default()),
            |first| (first.downsample(sparse_cell), first.downsample(dense_cell)),
        );
        Self::new(timesteps, sparse, dense, palette)
    }

    /// Number of hierarchical timesteps.
    pub fn timestep_count(&self) -> usize {
        self.timesteps.len()
    }

    /// Hierarchical points of `timestep`, if it exists.
    pub fn timestep(&self, timestep: usize) -> Option<&PointSet> {
        self.timesteps.get(timestep)
    }

    /// All hierarchical timesteps.
    pub fn timesteps(&self) -> &[PointSet] {
        &self.timesteps
    }

    /// Points drawn for `level` at `timestep`. Sparse and dense sets do not
    /// change over time.
    pub fn level_points(&self, level: LodLevel, timestep: usize) -> &PointSet {
        match level {
            LodLevel::Sparse => &self.sparse,
            LodLevel::Dense => &self.dense,
            LodLevel::Hierarchical => {
                static EMPTY: PointSet = PointSet::empty();
                self.timesteps.get(timestep).unwrap_or(&EMPTY)
            }
        }
    }

    /// Object-space `(min, max)` bounds over all timesteps.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.bounds
    }

    /// Bounding-sphere `(center, radius)` of the bounds box.
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        let (lo, hi) = self.bounds;
        ((lo + hi) * 0.5, (hi - lo).length() * 0.5)
    }

    /// Color and radius tables.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(points: &[[f32; 3]]) -> PointSet {
        PointSet::new(
            points
                .iter()
                .map(|p| {
                    PointRecord::new(
                        Vec3::from_array(*p),
                        PointAttributes::default(),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn bounds_span_all_timesteps() {
        let scene = Scene::new(
            vec![set(&[[0.0, 0.0, 0.0]]), set(&[[2.0, 4.0, -2.0]])],
            PointSet::default(),
            PointSet::default(),
            Palette::default(),
        );
        assert_eq!(
            scene.bounds(),
            (Vec3::new(0.0, 0.0, -2.0), Vec3::new(2.0, 4.0, 0.0))
        );
        let (center, radius) = scene.bounding_sphere();
        assert_eq!(center, Vec3::new(1.0, 2.0, -1.0));
        assert!((radius - 6.0_f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn derived_levels_come_from_first_timestep() {
        let scene = Scene::from_timesteps(
            vec![set(&[[0.1, 0.0, 0.0], [0.2, 0.0, 0.0], [9.0, 0.0, 0.0]])],
            100.0,
            1.0,
            Palette::default(),
        );
        assert_eq!(scene.level_points(LodLevel::Sparse, 0).len(), 1);
        assert_eq!(scene.level_points(LodLevel::Dense, 0).len(), 2);
        assert_eq!(scene.level_points(LodLevel::Hierarchical, 0).len(), 3);
    }

    #[test]
    fn missing_timestep_is_empty() {
        let scene = Scene::default();
        assert_eq!(scene.timestep_count(), 0);
        assert!(scene.level_points(LodLevel::Hierarchical, 3).is_empty());
    }
}
