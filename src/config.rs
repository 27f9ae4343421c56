//! Top-level configuration for the `metronome` binary.
//!
//! The conducting engine can be used without pulling in this configuration
//! layer, but it provides a convenient substrate for running scores.

pub mod clap;
pub mod err;
pub mod order;
pub mod top;

pub use err::{Error, Result};
pub use top::Config;
