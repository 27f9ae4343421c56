//! Per-player reports from finished runs.

use crate::model::Checkpoint;
use serde::Serialize;

/// What happened to a player over a run.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    /// The display name of the player.
    pub player: String,
    /// How the player's callable ended.
    pub status: Status,
    /// Declared checkpoints the player finished without ever reaching.
    pub missed: Vec<Checkpoint>,
}

impl Report {
    /// Constructs the report for a player that was never started.
    pub fn idle(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            status: Status::Idle,
            missed: vec![],
        }
    }

    /// Did the player finish normally, reaching all of its checkpoints?
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{player::Status, Report};
    /// assert!(!Report::idle("p").is_clean());
    ///
    /// let finished = Report { status: Status::Finished, ..Report::idle("p") };
    /// assert!(finished.is_clean());
    /// ```
    pub fn is_clean(&self) -> bool {
        self.status == Status::Finished && self.missed.is_empty()
    }
}

/// How a player's callable ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status", content = "message")]
pub enum Status {
    /// The callable returned normally.
    Finished,
    /// The callable panicked with the given message.
    Panicked(String),
    /// The player had no checkpoints scheduled, so it was never started.
    Idle,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finished => f.write_str("finished"),
            Self::Panicked(msg) => write!(f, "panicked: {}", msg),
            Self::Idle => f.write_str("idle"),
        }
    }
}
