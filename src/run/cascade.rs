//! Release cascades: ordered sets of one-shot signals.

use crate::err;
use std::sync::{Condvar, Mutex};
use tracing::trace;

/// An ordered set of one-shot signals, released strictly in token order.
///
/// Tokens are the integers `0..len`.  Releasing any token other than the one
/// at the cursor is a protocol violation; this is what stops two parties from
/// releasing the same point twice, or out of order.
///
/// # Examples
///
/// ```
/// use metronome::run::cascade::Cascade;
/// let c = Cascade::new("example", 2);
/// assert!(c.release(1).is_err());
/// c.release(0).unwrap();
/// c.wait_on(0).unwrap();
/// assert_eq!(c.cursor().unwrap(), Some(1));
/// ```
pub struct Cascade {
    name: &'static str,
    /// Index of the next token to release.
    cursor: Mutex<usize>,
    signals: Vec<Signal>,
}

/// A single one-shot signal.
#[derive(Default)]
struct Signal {
    raised: Mutex<bool>,
    cv: Condvar,
}

impl Signal {
    fn raise(&self) -> err::Result<()> {
        *self.raised.lock()? = true;
        self.cv.notify_all();
        Ok(())
    }

    fn wait(&self) -> err::Result<()> {
        let mut raised = self.raised.lock()?;
        while !*raised {
            raised = self.cv.wait(raised)?;
        }
        Ok(())
    }

    fn is_raised(&self) -> err::Result<bool> {
        Ok(*self.raised.lock()?)
    }
}

impl Cascade {
    /// Constructs a cascade with `len` unreleased tokens.
    ///
    /// `name` appears in logs and errors.
    pub fn new(name: &'static str, len: usize) -> Self {
        Self {
            name,
            cursor: Mutex::new(0),
            signals: (0..len).map(|_| Signal::default()).collect(),
        }
    }

    /// Gets the number of tokens in this cascade.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Is this cascade empty of tokens?
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Gets the next token to release, or `None` if all have been released.
    pub fn cursor(&self) -> err::Result<Option<usize>> {
        let cursor = *self.cursor.lock()?;
        Ok(Some(cursor).filter(|c| *c < self.len()))
    }

    /// Releases `token`, which must be the token at the cursor.
    pub fn release(&self, token: usize) -> err::Result<()> {
        let mut cursor = self.cursor.lock()?;
        let expected = Some(*cursor).filter(|c| *c < self.len());
        if expected != Some(token) {
            return Err(err::Error::ProtocolViolation {
                cascade: self.name,
                expected,
                got: token,
            });
        }
        // Raising under the cursor lock keeps raises in cursor order.
        self.signals[token].raise()?;
        *cursor += 1;
        trace!(cascade = self.name, token, "released");
        Ok(())
    }

    /// Blocks until `token` has been released.
    ///
    /// Returns at once if it already has been.
    pub fn wait_on(&self, token: usize) -> err::Result<()> {
        trace!(cascade = self.name, token, "waiting");
        self.signal(token)?.wait()?;
        trace!(cascade = self.name, token, "woken");
        Ok(())
    }

    /// Checks, without blocking, whether `token` has been released.
    pub fn is_released(&self, token: usize) -> err::Result<bool> {
        self.signal(token)?.is_raised()
    }

    fn signal(&self, token: usize) -> err::Result<&Signal> {
        self.signals.get(token).ok_or(err::Error::UnknownToken {
            cascade: self.name,
            token,
            len: self.len(),
        })
    }
}
