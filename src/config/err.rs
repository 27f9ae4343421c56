//! Errors that can occur during configuration.
use thiserror::Error;

/// A configuration error.
#[derive(Debug, Error)]
pub enum Error {
    /// The user supplied the given string, which was a bad order strategy.
    #[error("unsupported order strategy: {0}")]
    BadOrderStrategy(String),

    /// The user supplied the given string, which was a bad output choice.
    #[error("unsupported output: {0}")]
    BadOutput(String),

    /// The user supplied a bad shuffle seed.
    #[error("couldn't parse seed: {0}")]
    BadSeed(std::num::ParseIntError),

    /// The user supplied a bad thread stack size.
    #[error("couldn't parse stack size: {0}")]
    BadStackSize(std::num::ParseIntError),

    /// We couldn't read the config file.
    #[error("couldn't read config")]
    Io(#[from] std::io::Error),

    /// We couldn't deserialise the config from TOML.
    #[error("couldn't parse config: {0}")]
    Deserialize(#[from] toml::de::Error),

    /// We couldn't serialise the config to TOML.
    #[error("couldn't dump config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
