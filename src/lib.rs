// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![warn(unused_results)]
#![warn(unused_qualifications)]
// Cast hygiene
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]

//! GPU level-of-detail sphere-surface renderer built on wgpu.
//!
//! Dynasurf renders molecular point clouds as smooth implicit surfaces. Each
//! frame it builds a per-pixel intersection list (an A-buffer) of the
//! spheres of influence around every point, resolves the blended implicit
//! field along each view ray, and composites the result through ambient
//! occlusion, deferred shading and depth of field.
//!
//! # Key entry points
//!
//! - [`renderer::FrameSequencer`] - owns all GPU state and runs one frame
//!   per [`display`](renderer::FrameSequencer::display) call
//! - [`scene::Scene`] - point sets at three granularities plus palettes
//! - [`options::Options`] - runtime configuration with TOML presets and a
//!   JSON schema for UI overlays
//! - [`lod::LodSelector`] - maps the continuous LOD parameter onto one or
//!   two active point-set levels
//!
//! # Architecture
//!
//! Passes run in a fixed order decided by a pure
//! [`renderer::plan::FramePlan`]: sphere impostors per active level,
//! intersection-list generation, surface resolve, optional ambient
//! occlusion, shading, optional depth of field, then a blit or display pass
//! into the caller's output texture. wgpu pass boundaries provide the
//! hazard barriers between producers and consumers.

pub mod error;
pub mod gpu;
pub mod lod;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod view;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::DynasurfError;
