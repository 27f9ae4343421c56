//! Deterministic single-stepping of concurrent players.
//!
//! A *player* is a callable running on its own thread.  The caller declares
//! *checkpoints* on each player (before or after a call site), then lists
//! them in the global order they should be reached.  A [Conductor] runs the
//! players and, on each [Conductor::advance], lets execution proceed until the
//! next checkpoint in that order is reached, holding every player still while
//! the driver inspects their state.
//!
//! ```
//! use metronome::{run::conductor, Player};
//! use std::sync::Mutex;
//!
//! let log = Mutex::new(Vec::new());
//! let mut player = Player::new("writer", |probe| {
//!     probe.call("first", || log.lock().unwrap().push(1));
//!     probe.call("second", || log.lock().unwrap().push(2));
//! });
//! let second = player.before("second");
//!
//! let finale = conductor::scope(vec![player], vec![second.clone()], |c| {
//!     let reached = c.advance().unwrap();
//!     assert_eq!(reached, Some(second));
//!     assert_eq!(*log.lock().unwrap(), vec![1]);
//! })
//! .unwrap();
//!
//! assert!(finale.reports.iter().all(|r| r.is_clean()));
//! assert_eq!(*log.lock().unwrap(), vec![1, 2]);
//! ```

pub mod config;
pub mod err;
pub mod model;
pub mod player;
pub mod run;
pub mod score;
pub mod ux;

pub use model::{Checkpoint, Phase, Site};
pub use player::{Player, Report};
pub use run::{Conductor, Probe};
