//! Procedural helix bundles for demos and tests.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::{Palette, PointAttributes, PointRecord, PointSet, Scene};

/// Backbone atoms per residue: N, CA, C, O.
const BACKBONE: [(u8, f32, f32); 4] = [
    (7, 0.0, 0.0),
    (6, 0.35, 0.4),
    (6, 0.7, 0.1),
    (8, 0.9, -0.9),
];

/// Shape of a synthetic helix bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelixParams {
    /// Number of parallel helices, each its own chain.
    pub chains: u8,
    /// Residues per helix.
    pub residues: u16,
    /// Timesteps to generate.
    pub timesteps: usize,
    /// Per-timestep random displacement, in angstroms.
    pub jitter: f32,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            chains: 4,
            residues: 120,
            timesteps: 16,
            jitter: 0.4,
        }
    }
}

/// Helix residue geometry: 3.6 residues per turn, 1.5 Å rise, 2.3 Å
/// radius, plus a side-chain atom pushed outward.
fn helix_frame(params: &HelixParams) -> PointSet {
    let spacing = 12.0;
    let per_row = (f32::from(params.chains).sqrt().ceil() as u8).max(1);
    let mut points = Vec::with_capacity(
        usize::from(params.chains) * usize::from(params.residues) * 5,
    );
    for chain in 0..params.chains {
        let axis = Vec3::new(
            f32::from(chain % per_row) * spacing,
            f32::from(chain / per_row) * spacing,
            0.0,
        );
        for residue in 0..params.residues {
            let angle = f32::from(residue) * TAU / 3.6;
            let z = f32::from(residue) * 1.5;
            for &(element, phase, lift) in &BACKBONE {
                let a = angle + phase;
                let p = axis + Vec3::new(2.3 * a.cos(), 2.3 * a.sin(), z + lift);
                points.push(PointRecord::new(
                    p,
                    PointAttributes {
                        element,
                        residue,
                        chain,
                    },
                ));
            }
            let side = axis + Vec3::new(4.2 * angle.cos(), 4.2 * angle.sin(), z);
            let element = if residue % 7 == 3 { 16 } else { 6 };
            points.push(PointRecord::new(
                side,
                PointAttributes {
                    element,
                    residue,
                    chain,
                },
            ));
        }
    }
    PointSet::new(points)
}

fn jittered<R: Rng + ?Sized>(base: &PointSet, amount: f32, rng: &mut R) -> PointSet {
    if amount <= 0.0 {
        return base.clone();
    }
    base.records()
        .iter()
        .map(|record| {
            let offset = Vec3::new(
                rng.random_range(-amount..amount),
                rng.random_range(-amount..amount),
                rng.random_range(-amount..amount),
            );
            PointRecord::new(record.position() + offset, record.attributes())
        })
        .collect::<Vec<_>>()
        .into()
}

/// Scene of `params.chains` parallel helices. Timestep 0 is the ideal
/// geometry, later ones are jittered copies. The sparse and dense levels
/// are clustered from timestep 0 at 8 Å and 4 Å.
pub fn helix_bundle<R: Rng + ?Sized>(params: &HelixParams, rng: &mut R) -> Scene {
    let base = helix_frame(params);
    let mut timesteps = Vec::with_capacity(params.timesteps);
    if params.timesteps > 0 {
        timesteps.push(base.clone());
    }
    for _ in 1..params.timesteps {
        timesteps.push(jittered(&base, params.jitter, rng));
    }
    Scene::from_timesteps(timesteps, 8.0, 4.0, Palette::default())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::lod::LodLevel;

    #[test]
    fn bundle_has_expected_counts() {
        let params = HelixParams {
            chains: 2,
            residues: 10,
            timesteps: 3,
            jitter: 0.2,
        };
        let scene = helix_bundle(&params, &mut StdRng::seed_from_u64(1));
        assert_eq!(scene.timestep_count(), 3);
        assert_eq!(scene.level_points(LodLevel::Hierarchical, 2).len(), 100);
        let sparse = scene.level_points(LodLevel::Sparse, 0).len();
        let dense = scene.level_points(LodLevel::Dense, 0).len();
        assert!(sparse > 0 && sparse <= dense && dense <= 100);
    }

    #[test]
    fn attributes_name_chain_and_residue() {
        let params = HelixParams {
            chains: 3,
            residues: 4,
            timesteps: 1,
            jitter: 0.0,
        };
        let scene = helix_bundle(&params, &mut StdRng::seed_from_u64(2));
        let last = scene.timesteps()[0].records().last().map(PointRecord::attributes);
        assert_eq!(
            last,
            Some(PointAttributes {
                element: 16,
                residue: 3,
                chain: 2
            })
        );
    }

    #[test]
    fn zero_timesteps_is_empty() {
        let params = HelixParams {
            timesteps: 0,
            ..HelixParams::default()
        };
        let scene = helix_bundle(&params, &mut StdRng::seed_from_u64(3));
        assert_eq!(scene.timestep_count(), 0);
        assert!(scene.level_points(LodLevel::Sparse, 0).is_empty());
    }
}
