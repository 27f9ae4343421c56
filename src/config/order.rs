//! Config for the order in which a score's checkpoints are reached.

use super::err;
use crate::score::{interleave, Interleaver};
use rand::{rngs::StdRng, SeedableRng};
use serde::{de::Visitor, Deserialize, Serialize};

/// String representations of order strategies.
pub mod string {
    /// String representation of the declared order strategy.
    pub const DECLARED: &str = "declared";
    /// String representation of the shuffle order strategy.
    pub const SHUFFLE: &str = "shuffle";
    /// String representations of all order strategies.
    pub const ALL: &[&str] = &[DECLARED, SHUFFLE];
}

/// Enumeration of order strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Strategy {
    /// Reach checkpoints in the order the score lists them.
    Declared,
    /// Reach checkpoints in a random interleaving of each player's order.
    Shuffle,
}

/// The default strategy keeps the score's order.
impl Default for Strategy {
    fn default() -> Self {
        Self::Declared
    }
}

/// Tries to parse a [Strategy] from a string.
///
/// # Examples
///
/// ```
/// use metronome::config::order::Strategy;
/// assert_eq!(str::parse::<Strategy>("declared").unwrap(), Strategy::Declared);
/// assert_eq!(str::parse::<Strategy>("Shuffle").unwrap(), Strategy::Shuffle);
/// assert!(str::parse::<Strategy>("reverse").is_err());
/// ```
impl std::str::FromStr for Strategy {
    type Err = err::Error;

    fn from_str(s: &str) -> err::Result<Self> {
        let s = s.to_lowercase();
        match &*s {
            string::DECLARED => Ok(Self::Declared),
            string::SHUFFLE => Ok(Self::Shuffle),
            _ => Err(err::Error::BadOrderStrategy(s)),
        }
    }
}

/// Formats a [Strategy] by applying the inverse of [FromStr].
impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Declared => string::DECLARED,
            Self::Shuffle => string::SHUFFLE,
        })
    }
}

/// Serialize by stringification.
impl Serialize for Strategy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize by parsing.
impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(StrategyVisitor)
    }
}

struct StrategyVisitor;

impl<'de> Visitor<'de> for StrategyVisitor {
    type Value = Strategy;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "one of: {}", string::ALL.join(", "))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl Strategy {
    /// Gets an iterator of all available strategies.
    pub fn all() -> impl Iterator<Item = Self> {
        vec![Self::Declared, Self::Shuffle].into_iter()
    }

    /// Makes the interleaver for this strategy.
    ///
    /// `seed` fixes the interleaving chosen by the shuffle strategy; without
    /// it, the shuffle seeds itself from the operating system.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{config::order::Strategy, score::{Cue, Interleaver}, Phase, Site};
    /// let cue = |p: &str| Cue { player: p.to_owned(), phase: Phase::Before, site: Site::new("s"), name: None };
    /// let mut x = vec![cue("a"), cue("b"), cue("c")];
    /// let mut y = x.clone();
    /// Strategy::Shuffle.to_interleaver(Some(9)).interleave(&mut x);
    /// Strategy::Shuffle.to_interleaver(Some(9)).interleave(&mut y);
    /// assert_eq!(x, y);
    /// ```
    pub fn to_interleaver(&self, seed: Option<u64>) -> Box<dyn Interleaver> {
        match self {
            Self::Declared => Box::new(interleave::Keep),
            Self::Shuffle => Box::new(seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)),
        }
    }
}
