use super::{err, order};
use crate::{run::thread, ux::out};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// The top-level config structure.
pub struct Config {
    /// The strategy for ordering a score's checkpoints.
    pub order: order::Strategy,
    /// The seed for the shuffle order strategy, if fixed.
    pub seed: Option<u64>,
    /// How to output the performance.
    pub output: out::Choice,
    /// Options for the player threads.
    pub thread: thread::Options,
}

impl Config {
    /// Tries to dump a config to a string.
    pub fn to_string(&self) -> err::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tries to load a config from a string.
    pub fn from_str(s: &str) -> err::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Tries to load a config from the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> err::Result<Self> {
        Self::from_str(&std::fs::read_to_string(path)?)
    }
}
