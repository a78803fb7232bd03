//! Binding tables of every pass. Slot order and indices mirror the
//! `@binding` declarations of the matching WGSL program.

use crate::gpu::binding::{PassLayout, SlotDesc};

const V: wgpu::ShaderStages = wgpu::ShaderStages::VERTEX;
const F: wgpu::ShaderStages = wgpu::ShaderStages::FRAGMENT;
const C: wgpu::ShaderStages = wgpu::ShaderStages::COMPUTE;
const VF: wgpu::ShaderStages = wgpu::ShaderStages::VERTEX_FRAGMENT;

/// Sphere impostors (`sphere.wgsl`) and light-space impostors
/// (`shadow.wgsl`).
pub static IMPOSTOR: PassLayout = PassLayout {
    label: "Impostor",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::uniform(1, "level", VF),
        SlotDesc::storage(2, "points", V),
        SlotDesc::storage(3, "palette", V),
    ],
};

/// Intersection list generation (`spawn.wgsl`).
pub static SPAWN: PassLayout = PassLayout {
    label: "List Generation",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::uniform(1, "level", VF),
        SlotDesc::storage(2, "points", V),
        SlotDesc::storage(3, "palette", V),
        SlotDesc::storage_rw(4, "heads", F),
        SlotDesc::storage_rw(5, "records", F),
        SlotDesc::storage_rw(6, "counter", F),
    ],
};

/// Implicit surface resolve and overlap heat map (`surface.wgsl`).
pub static SURFACE: PassLayout = PassLayout {
    label: "Surface",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::uniform(1, "level0", F),
        SlotDesc::uniform(2, "level1", F),
        SlotDesc::storage(3, "palette", F),
        SlotDesc::storage(4, "points0", F),
        SlotDesc::storage(5, "points1", F),
        SlotDesc::storage(6, "heads0", F),
        SlotDesc::storage(7, "heads1", F),
        SlotDesc::storage(8, "records0", F),
        SlotDesc::storage(9, "records1", F),
        SlotDesc::texture(10, "sphere_position0"),
        SlotDesc::texture(11, "sphere_normal0"),
        SlotDesc::texture(12, "sphere_position1"),
        SlotDesc::texture(13, "sphere_normal1"),
    ],
};

/// Ambient occlusion sampling (`aosample.wgsl`).
pub static AO_SAMPLE: PassLayout = PassLayout {
    label: "Ambient Sample",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::uniform(1, "ao", F),
        SlotDesc::texture(2, "surface_position"),
        SlotDesc::texture(3, "surface_normal"),
        SlotDesc::texture(4, "noise"),
    ],
};

/// Separable ambient occlusion blur (`aoblur.wgsl`).
pub static AO_BLUR: PassLayout = PassLayout {
    label: "Ambient Blur",
    slots: &[
        SlotDesc::uniform(0, "blur", F),
        SlotDesc::filtered_texture(1, "source"),
        SlotDesc::sampler(2, "source_sampler"),
    ],
};

/// Deferred shading (`shade.wgsl`).
pub static SHADE: PassLayout = PassLayout {
    label: "Shade",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::texture(1, "surface_position"),
        SlotDesc::texture(2, "surface_normal"),
        SlotDesc::texture(3, "surface_diffuse"),
        SlotDesc::texture(4, "sphere_diffuse"),
        SlotDesc::texture(5, "ambient_map"),
        SlotDesc::filtered_texture(6, "environment_map"),
        SlotDesc::filtered_texture(7, "material_map"),
        SlotDesc::filtered_texture(8, "bump_map"),
        SlotDesc::texture(9, "shadow_map"),
        SlotDesc::sampler(10, "repeat_sampler"),
        SlotDesc::sampler(11, "clamp_sampler"),
    ],
};

/// Separable depth-of-field blur (`dofblur.wgsl`).
pub static DOF_BLUR: PassLayout = PassLayout {
    label: "DoF Blur",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::uniform(1, "blur", F),
        SlotDesc::texture(2, "near_source"),
        SlotDesc::texture(3, "far_source"),
        SlotDesc::texture(4, "surface_position"),
    ],
};

/// Depth-of-field composite (`dofblend.wgsl`).
pub static DOF_BLEND: PassLayout = PassLayout {
    label: "DoF Blend",
    slots: &[
        SlotDesc::uniform(0, "frame", VF),
        SlotDesc::texture(1, "color_map"),
        SlotDesc::texture(2, "near_map"),
        SlotDesc::texture(3, "far_map"),
        SlotDesc::texture(4, "surface_position"),
    ],
};

/// Rescaling present (`display.wgsl`).
pub static DISPLAY: PassLayout = PassLayout {
    label: "Display",
    slots: &[
        SlotDesc::filtered_texture(0, "source"),
        SlotDesc::sampler(1, "source_sampler"),
    ],
};

/// Occupancy grid binning (`grid.wgsl`, `cs_bin`).
pub static GRID_BIN: PassLayout = PassLayout {
    label: "Grid Bin",
    slots: &[
        SlotDesc::uniform(0, "grid", C),
        SlotDesc::storage(1, "points", C),
        SlotDesc::storage_rw(2, "cells", C),
    ],
};

/// Occupancy grid overlay (`grid.wgsl`, `vs_main` / `fs_cells`).
pub static GRID_CELLS: PassLayout = PassLayout {
    label: "Grid Cells",
    slots: &[
        SlotDesc::uniform(0, "grid", V),
        SlotDesc::uniform(3, "frame", V),
        SlotDesc::storage(4, "cell_counts", V),
    ],
};

/// Every table, for setup-time checks.
pub static ALL: [&PassLayout; 11] = [
    &IMPOSTOR,
    &SPAWN,
    &SURFACE,
    &AO_SAMPLE,
    &AO_BLUR,
    &SHADE,
    &DOF_BLUR,
    &DOF_BLEND,
    &DISPLAY,
    &GRID_BIN,
    &GRID_CELLS,
];
