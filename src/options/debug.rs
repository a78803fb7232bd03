use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Deepest occupancy grid level.
pub const MAX_GRID_DEPTH: u32 = 6;

/// Debug visualization toggles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Debug", inline)]
#[serde(default)]
pub struct DebugOptions {
    /// Replace shading with a heat map of list entries per pixel.
    #[schemars(title = "Visualize Overlaps")]
    pub visualize_overlaps: bool,
    /// Render the light-space shadow map and sample it while shading.
    #[schemars(title = "Shadows")]
    pub shadows: bool,
    /// Overlay occupied occupancy-grid cells.
    #[schemars(title = "Show Grid")]
    pub show_grid: bool,
    /// Octree depth of the occupancy grid.
    #[schemars(title = "Grid Depth", range(min = 1, max = 6))]
    pub grid_depth: u32,
    /// Depth whose cells the overlay draws.
    #[schemars(title = "Grid Level", range(min = 1, max = 6))]
    pub grid_level: u32,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            visualize_overlaps: false,
            shadows: false,
            show_grid: false,
            grid_depth: 4,
            grid_level: 2,
        }
    }
}

impl DebugOptions {
    /// Grid depth clamped to `1..=MAX_GRID_DEPTH`.
    pub fn clamped_grid_depth(&self) -> u32 {
        self.grid_depth.clamp(1, MAX_GRID_DEPTH)
    }

    /// Overlay level clamped to `1..=grid depth`.
    pub fn clamped_grid_level(&self) -> u32 {
        self.grid_level.clamp(1, self.clamped_grid_depth())
    }
}
