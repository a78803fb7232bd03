//! The sphere-surface pass sequence.
//!
//! Resources, programs and the frame plan are separate modules; the
//! [`FrameSequencer`] ties them together into one `display` call per frame.

pub mod ambient;
pub mod framebuffer;
pub mod layouts;
pub mod plan;
pub mod programs;
pub mod resources;
pub mod sequencer;
pub mod targets;
pub mod uniforms;

pub use sequencer::{FrameOutcome, FrameSequencer};
