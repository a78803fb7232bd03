//! Point records and point sets.

use glam::Vec3;
use rustc_hash::FxHashMap;

/// Packed per-point attributes: element (8 bits), residue (16 bits) and
/// chain (8 bits), low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointAttributes {
    /// Element index into the element palette (atomic number).
    pub element: u8,
    /// Residue index.
    pub residue: u16,
    /// Chain index.
    pub chain: u8,
}

impl PointAttributes {
    /// Pack into the 32-bit layout the shaders decode.
    pub const fn pack(self) -> u32 {
        self.element as u32 | (self.residue as u32) << 8 | (self.chain as u32) << 24
    }

    /// Inverse of [`pack`](Self::pack).
    pub const fn unpack(bits: u32) -> Self {
        Self {
            element: (bits & 0xff) as u8,
            residue: ((bits >> 8) & 0xffff) as u16,
            chain: (bits >> 24) as u8,
        }
    }
}

/// One GPU point: position plus packed attributes bit-cast to `f32`.
/// 16 bytes, matching `PointRecord` in `points.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointRecord {
    /// Object-space position.
    pub position: [f32; 3],
    /// [`PointAttributes::pack`] stored via `f32::from_bits`.
    pub attributes: f32,
}

impl PointRecord {
    /// Record at `position` with `attributes`.
    pub fn new(position: Vec3, attributes: PointAttributes) -> Self {
        Self {
            position: position.to_array(),
            attributes: f32::from_bits(attributes.pack()),
        }
    }

    /// Position as a vector.
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Decoded attributes.
    pub fn attributes(&self) -> PointAttributes {
        PointAttributes::unpack(self.attributes.to_bits())
    }
}

/// Ordered, immutable-once-uploaded sequence of points.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: Vec<PointRecord>,
}

impl PointSet {
    /// Set with no points.
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Wrap `points`.
    pub fn new(points: Vec<PointRecord>) -> Self {
        Self { points }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Records in upload order.
    pub fn records(&self) -> &[PointRecord] {
        &self.points
    }

    /// Axis-aligned `(min, max)` bounds, `None` when empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.points.iter().map(PointRecord::position);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Coarser set by grid clustering: one point per occupied cell of edge
    /// `cell_size`, at the centroid of its members, carrying the attributes
    /// of the first member. Cells appear in first-member order.
    /// Non-positive cell sizes return a copy.
    pub fn downsample(&self, cell_size: f32) -> Self {
        if cell_size.is_nan() || cell_size <= 0.0 {
            return self.clone();
        }
        let mut cells: FxHashMap<[i32; 3], usize> = FxHashMap::default();
        let mut clusters: Vec<(Vec3, u32, f32)> = Vec::new();
        for record in &self.points {
            let p = record.position();
            let key = (p / cell_size).floor().as_ivec3().to_array();
            let slot = *cells.entry(key).or_insert_with(|| {
                clusters.push((Vec3::ZERO, 0, record.attributes));
                clusters.len() - 1
            });
            let cluster = &mut clusters[slot];
            cluster.0 += p;
            cluster.1 += 1;
        }
        Self::new(
            clusters
                .into_iter()
                .map(|(sum, count, attributes)| PointRecord {
                    position: (sum / count as f32).to_array(),
                    attributes,
                })
                .collect(),
        )
    }
}

impl From<Vec<PointRecord>> for PointSet {
    fn from(points: Vec<PointRecord>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(element: u8, residue: u16, chain: u8) -> PointAttributes {
        PointAttributes {
            element,
            residue,
            chain,
        }
    }

    #[test]
    fn attributes_pack_into_expected_bits() {
        assert_eq!(attrs(6, 0, 0).pack(), 6);
        assert_eq!(attrs(0, 1, 0).pack(), 1 << 8);
        assert_eq!(attrs(0, 0, 1).pack(), 1 << 24);
        assert_eq!(attrs(0xff, 0xffff, 0xff).pack(), u32::MAX);
    }

    #[test]
    fn record_preserves_attribute_bits() {
        // All-ones is a NaN pattern as f32; the bits must survive.
        for a in [attrs(8, 1234, 3), attrs(0xff, 0xffff, 0xff)] {
            let record = PointRecord::new(Vec3::new(1.0, 2.0, 3.0), a);
            assert_eq!(record.attributes(), a);
            let bytes: &[u8] = bytemuck::bytes_of(&record);
            assert_eq!(bytes.len(), 16);
            assert_eq!(&bytes[12..16], &a.pack().to_ne_bytes());
        }
    }

    #[test]
    fn bounds_cover_all_points() {
        let set = PointSet::new(vec![
            PointRecord::new(Vec3::new(-1.0, 2.0, 0.0), attrs(1, 0, 0)),
            PointRecord::new(Vec3::new(3.0, -2.0, 5.0), attrs(1, 0, 0)),
        ]);
        assert_eq!(
            set.bounds(),
            Some((Vec3::new(-1.0, -2.0, 0.0), Vec3::new(3.0, 2.0, 5.0)))
        );
        assert_eq!(PointSet::default().bounds(), None);
    }

    #[test]
    fn downsample_clusters_to_centroids() {
        let set = PointSet::new(vec![
            PointRecord::new(Vec3::new(0.1, 0.1, 0.1), attrs(6, 1, 0)),
            PointRecord::new(Vec3::new(0.3, 0.1, 0.1), attrs(8, 2, 0)),
            PointRecord::new(Vec3::new(5.5, 0.5, 0.5), attrs(7, 3, 1)),
        ]);
        let coarse = set.downsample(1.0);
        assert_eq!(coarse.len(), 2);
        let first = coarse.records()[0];
        assert!((first.position() - Vec3::new(0.2, 0.1, 0.1)).length() < 1e-6);
        assert_eq!(first.attributes(), attrs(6, 1, 0));
        assert_eq!(coarse.records()[1].attributes(), attrs(7, 3, 1));
    }

    #[test]
    fn downsample_with_invalid_cell_size_copies() {
        let set = PointSet::new(vec![PointRecord::new(
            Vec3::ONE,
            attrs(1, 0, 0),
        )]);
        assert_eq!(set.downsample(0.0).len(), 1);
        assert_eq!(set.downsample(f32::NAN).len(), 1);
    }
}
