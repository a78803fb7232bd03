//! Color and radius lookup tables uploaded alongside the point sets.
//!
//! The GPU palette is one `array<vec4<f32>>`: 256 element entries (rgb +
//! van der Waals radius), then the residue colors, then the chain colors.

/// Entries reserved for elements (indexed by atomic number).
pub const ELEMENT_ENTRIES: usize = 256;

/// Radius and color for elements without a dedicated entry.
const DEFAULT_ELEMENT: [f32; 4] = [0.6, 0.6, 0.6, 1.5];

/// A color ramp defined by N evenly-spaced color stops.
pub struct ColorRamp {
    stops: Vec<[f32; 3]>,
}

impl ColorRamp {
    /// Ramp through `stops`; fewer than two stops yield a constant ramp.
    pub fn new(stops: Vec<[f32; 3]>) -> Self {
        Self { stops }
    }

    /// Interpolate the ramp at position `t` in [0, 1].
    pub fn sample(&self, t: f32) -> [f32; 3] {
        match self.stops.len() {
            0 => [0.5, 0.5, 0.5],
            1 => self.stops[0],
            len => {
                let t = t.clamp(0.0, 1.0);
                let n = len - 1;
                let scaled = t * n as f32;
                let idx = (scaled as usize).min(n - 1);
                let frac = scaled - idx as f32;

                let a = &self.stops[idx];
                let b = &self.stops[idx + 1];
                [
                    a[0] + (b[0] - a[0]) * frac,
                    a[1] + (b[1] - a[1]) * frac,
                    a[2] + (b[2] - a[2]) * frac,
                ]
            }
        }
    }

    /// `count` colors evenly spaced along the ramp.
    pub fn spread(&self, count: usize) -> Vec<[f32; 4]> {
        (0..count)
            .map(|i| {
                let t = if count > 1 {
                    i as f32 / (count - 1) as f32
                } else {
                    0.0
                };
                let [r, g, b] = self.sample(t);
                [r, g, b, 1.0]
            })
            .collect()
    }
}

impl Default for ColorRamp {
    /// Blue → Green → Yellow → Red
    fn default() -> Self {
        Self::new(vec![
            [0.2, 0.35, 0.9],
            [0.2, 0.8, 0.35],
            [1.0, 0.9, 0.1],
            [0.9, 0.15, 0.1],
        ])
    }
}

/// Per-category lookup tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// `ELEMENT_ENTRIES` entries of rgb + radius.
    pub elements: Vec<[f32; 4]>,
    /// Residue colors (index taken modulo the length).
    pub residues: Vec<[f32; 4]>,
    /// Chain colors (index taken modulo the length).
    pub chains: Vec<[f32; 4]>,
}

/// Flattened palette plus the offsets the shaders index with.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuPalette {
    /// Elements, residues, chains back to back.
    pub entries: Vec<[f32; 4]>,
    /// First residue entry.
    pub residue_offset: u32,
    /// First chain entry.
    pub chain_offset: u32,
}

impl Default for Palette {
    fn default() -> Self {
        let mut elements = vec![DEFAULT_ELEMENT; ELEMENT_ENTRIES];
        // CPK colors with van der Waals radii in angstroms.
        for (number, entry) in [
            (1, [0.9, 0.9, 0.9, 1.2]),
            (6, [0.45, 0.45, 0.45, 1.7]),
            (7, [0.2, 0.3, 0.95, 1.55]),
            (8, [0.95, 0.15, 0.1, 1.52]),
            (15, [1.0, 0.5, 0.0, 1.8]),
            (16, [0.95, 0.85, 0.2, 1.8]),
        ] {
            elements[number] = entry;
        }
        let ramp = ColorRamp::default();
        Self {
            elements,
            residues: ramp.spread(20),
            chains: ramp.spread(8),
        }
    }
}

impl Palette {
    /// Radius of `element`.
    pub fn radius(&self, element: u8) -> f32 {
        self.elements
            .get(element as usize)
            .map_or(DEFAULT_ELEMENT[3], |e| e[3])
    }

    /// Largest element radius.
    pub fn max_radius(&self) -> f32 {
        self.elements.iter().fold(0.0, |m, e| e[3].max(m))
    }

    /// Flatten for upload. The element table is padded or truncated to
    /// [`ELEMENT_ENTRIES`]; empty residue or chain tables get one grey
    /// entry so modulo lookups stay in range.
    pub fn to_gpu(&self) -> GpuPalette {
        let mut entries = self.elements.clone();
        entries.resize(ELEMENT_ENTRIES, DEFAULT_ELEMENT);
        let residue_offset = entries.len() as u32;
        extend_non_empty(&mut entries, &self.residues);
        let chain_offset = entries.len() as u32;
        extend_non_empty(&mut entries, &self.chains);
        GpuPalette {
            entries,
            residue_offset,
            chain_offset,
        }
    }
}

fn extend_non_empty(entries: &mut Vec<[f32; 4]>, table: &[[f32; 4]]) {
    if table.is_empty() {
        entries.push([0.5, 0.5, 0.5, 1.0]);
    } else {
        entries.extend_from_slice(table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_layout_has_fixed_element_block() {
        let gpu = Palette::default().to_gpu();
        assert_eq!(gpu.residue_offset, 256);
        assert_eq!(gpu.chain_offset, 276);
        assert_eq!(gpu.entries.len(), 284);
        assert_eq!(gpu.entries[8][3], 1.52);
    }

    #[test]
    fn empty_tables_get_placeholder_entry() {
        let palette = Palette {
            elements: Vec::new(),
            residues: Vec::new(),
            chains: Vec::new(),
        };
        let gpu = palette.to_gpu();
        assert_eq!(gpu.residue_offset, 256);
        assert_eq!(gpu.chain_offset, 257);
        assert_eq!(gpu.entries.len(), 258);
    }

    #[test]
    fn ramp_endpoints_and_spread() {
        let ramp = ColorRamp::new(vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert_eq!(ramp.sample(0.0), [0.0, 0.0, 0.0]);
        assert_eq!(ramp.sample(1.0), [1.0, 1.0, 1.0]);
        assert_eq!(ramp.sample(0.5), [0.5, 0.5, 0.5]);
        let spread = ramp.spread(3);
        assert_eq!(spread[1], [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn radius_lookup_falls_back() {
        let palette = Palette::default();
        assert_eq!(palette.radius(6), 1.7);
        assert_eq!(palette.radius(200), 1.5);
        assert_eq!(palette.max_radius(), 1.8);
    }
}
