//! The conducting engine.
//!
//! A run has one driver thread, holding a [Conductor], and one thread per
//! player.  The two sides hand control back and forth through a
//! [baton::Baton] whose positions are the entries of a [Schedule].

mod adapter;
pub mod baton;
pub mod cascade;
pub mod conductor;
pub mod schedule;
pub mod thread;

pub use adapter::Probe;
pub use conductor::{Conductor, Finale};
pub use schedule::Schedule;
