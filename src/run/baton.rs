//! The baton: the handshake between the conductor and its players.

use super::cascade::Cascade;
use crate::err;

/// A pair of release cascades over the same schedule positions.
///
/// The conductor grants a position on the *release* cascade, and the player
/// owning that position confirms it on the *acknowledge* cascade once it
/// gets there.  Both cascades only move forward one position at a time, so
/// at most one position is ever in flight.
pub struct Baton {
    release: Cascade,
    acknowledge: Cascade,
}

impl Baton {
    /// Constructs a baton over `len` schedule positions.
    pub fn new(len: usize) -> Self {
        Self {
            release: Cascade::new("release", len),
            acknowledge: Cascade::new("acknowledge", len),
        }
    }

    /// Gets the number of schedule positions this baton covers.
    pub fn len(&self) -> usize {
        self.release.len()
    }

    /// Is this baton empty of schedule positions?
    pub fn is_empty(&self) -> bool {
        self.release.is_empty()
    }

    /// Player side: blocks until the conductor lets us proceed to `index`.
    pub fn await_turn(&self, index: usize) -> err::Result<()> {
        self.release.wait_on(index)
    }

    /// Player side: tells the conductor we've reached `index`.
    pub fn confirm(&self, index: usize) -> err::Result<()> {
        self.acknowledge.release(index)
    }

    /// Conductor side: lets the player owning `index` proceed to it.
    pub fn grant(&self, index: usize) -> err::Result<()> {
        self.release.release(index)
    }

    /// Conductor side: blocks until the player owning `index` has reached it.
    pub fn await_confirm(&self, index: usize) -> err::Result<()> {
        self.acknowledge.wait_on(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    /// A player and conductor can pass the baton back and forth.
    fn test_handshake() -> err::Result<()> {
        let baton = Arc::new(Baton::new(3));
        let b = baton.clone();
        let player = thread::spawn(move || -> err::Result<()> {
            for i in 0..3 {
                b.await_turn(i)?;
                b.confirm(i)?;
            }
            Ok(())
        });

        for i in 0..3 {
            baton.grant(i)?;
            baton.await_confirm(i)?;
        }
        player.join().expect("player panicked")?;
        Ok(())
    }

    #[test]
    /// Neither side can skip ahead of the other's cursor.
    fn test_confirm_out_of_order() -> err::Result<()> {
        let baton = Baton::new(2);
        assert!(baton.confirm(1).is_err());
        assert!(baton.grant(1).is_err());
        baton.grant(0)?;
        baton.confirm(0)?;
        baton.await_confirm(0)?;
        Ok(())
    }
}
