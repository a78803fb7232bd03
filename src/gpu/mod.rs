//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, typed storage buffers,
//! declarative pass binding tables, texture libraries, and shader
//! composition.

/// Declarative per-pass binding tables validated against supplied resources.
pub mod binding;
/// Growable typed GPU buffers.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate helpers for impostor and screen-space pipelines.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` and define support via naga-oil.
pub mod shader_composer;
/// Framework-agnostic render-target texture abstraction.
pub mod texture;
/// Directory-backed texture libraries (environment, material, bump maps).
pub mod texture_library;
