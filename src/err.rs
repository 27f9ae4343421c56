//! Errors raised while scheduling and conducting players.
use crate::model::Checkpoint;
use thiserror::Error;

/// Enumeration of errors that can happen in the conducting engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A cascade was released with a token other than the one at its cursor.
    ///
    /// This is always a bug in whatever drives the cascade.
    #[error("{cascade} cascade released out of turn (expected {}, got {got})", describe_expected(.expected))]
    ProtocolViolation {
        /// The name of the cascade.
        cascade: &'static str,
        /// The token at the cursor, or `None` if every token was released.
        expected: Option<usize>,
        /// The token that was presented.
        got: usize,
    },

    /// Someone asked about a token past the end of a cascade.
    #[error("{cascade} cascade has no token {token} (it has {len})")]
    UnknownToken {
        cascade: &'static str,
        token: usize,
        len: usize,
    },

    /// The order mentions a checkpoint owned by a player that isn't being
    /// conducted.
    #[error("{0} belongs to a player that isn't being conducted")]
    UnknownPlayer(Checkpoint),

    /// The order mentions the same checkpoint twice.
    #[error("{0} appears more than once in the order")]
    DuplicateCheckpoint(Checkpoint),

    /// The order mentions an implicit or null checkpoint.
    #[error("{0} isn't a declared checkpoint")]
    NotDeclared(Checkpoint),

    /// The conductor ran off the end of the schedule looking for a checkpoint.
    #[error("schedule ran out before reaching {0}")]
    ScheduleExhausted(Checkpoint),

    /// A player thread couldn't be spawned.
    #[error("couldn't spawn player thread")]
    Spawn(#[from] std::io::Error),

    /// A player thread died outside of its adapter's control.
    #[error("player thread '{0}' was lost")]
    PlayerLost(String),

    /// A lock guarding synchronisation state was poisoned.
    #[error("a synchronisation lock was poisoned")]
    LockPoisoned,
}

fn describe_expected(expected: &Option<usize>) -> String {
    expected.map_or_else(|| "nothing".to_owned(), |t| format!("token {}", t))
}

/// Results over [Error].
pub type Result<T> = std::result::Result<T, Error>;

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
