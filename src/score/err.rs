//! Errors that can occur while loading and performing scores.
use crate::Site;
use thiserror::Error;

/// A score error.
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't read the score file.
    #[error("couldn't read score")]
    Io(#[from] std::io::Error),

    /// We couldn't deserialise the score from TOML.
    #[error("couldn't parse score: {0}")]
    Deserialize(#[from] toml::de::Error),

    /// We couldn't serialise the score to TOML.
    #[error("couldn't dump score: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Two players in the score share a name.
    #[error("more than one player is called '{0}'")]
    DuplicatePlayer(String),

    /// The checkpoint list mentions a player the score doesn't have.
    #[error("checkpoint list mentions unknown player '{0}'")]
    UnknownPlayer(String),

    /// The checkpoint list mentions a step a player doesn't take.
    #[error("player '{player}' has no step '{site}'")]
    UnknownSite {
        /// The player named in the checkpoint.
        player: String,
        /// The site named in the checkpoint.
        site: Site,
    },

    /// Conducting the score failed.
    #[error(transparent)]
    Run(#[from] crate::err::Error),
}

/// Results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
