//! User-facing parts of `metronome`.

pub mod out;
