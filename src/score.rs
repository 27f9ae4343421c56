//! Scores: scripted runs described in TOML.
//!
//! A score lists a set of players, each of which takes a fixed sequence of
//! steps, and the order in which checkpoints on those steps should be
//! reached.  Scores make it possible to explore interleavings without
//! writing any Rust, and are what the `metronome` binary runs.
//!
//! ```toml
//! [[player]]
//! name = "reader"
//! steps = ["load", "check"]
//!
//! [[player]]
//! name = "writer"
//! steps = ["store"]
//!
//! [[checkpoint]]
//! player = "reader"
//! phase = "after"
//! site = "load"
//!
//! [[checkpoint]]
//! player = "writer"
//! phase = "before"
//! site = "store"
//! ```

pub mod cast;
pub mod err;
pub mod interleave;
pub mod perform;

pub use cast::{Cast, Transcript};
pub use err::{Error, Result};
pub use interleave::Interleaver;
pub use perform::{perform, Frame, Performance};

use crate::model::{Phase, Site};
use serde::{Deserialize, Serialize};
use std::{path::Path, str::FromStr};

/// A scripted run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// The players taking part.
    #[serde(rename = "player", default)]
    pub players: Vec<Part>,
    /// The checkpoints to reach, in order.
    #[serde(rename = "checkpoint", default)]
    pub order: Vec<Cue>,
}

/// One player's part in a score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// The player's name, which cues use to refer to it.
    pub name: String,
    /// The sites the player visits, in order.
    #[serde(default)]
    pub steps: Vec<Site>,
}

/// A reference to a checkpoint in a score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    /// The name of the player owning the checkpoint.
    pub player: String,
    /// Whether the checkpoint is before or after the step.
    pub phase: Phase,
    /// The step the checkpoint is on.
    pub site: Site,
    /// An optional display name for the checkpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Score {
    /// Loads a score from the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    /// Tries to dump this score as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reorders this score's cues using `interleaver`.
    pub fn reorder(&mut self, interleaver: &mut dyn Interleaver) {
        interleaver.interleave(&mut self.order)
    }
}

/// Scores parse from TOML.
impl FromStr for Score {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
