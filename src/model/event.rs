//! Events delivered by the instrumentation on a player thread.

use super::{checkpoint::Phase, site::Site};

/// Something that happened on a player thread.
///
/// Events arrive in true temporal order: `Start`, then any number of
/// `Enter`/`Exit` pairs, then `Complete`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// The player's callable is about to run.
    Start,
    /// Execution is about to enter a site.
    Enter(&'a Site),
    /// Execution has just returned from a site.
    Exit(&'a Site),
    /// The player's callable has finished, normally or by panicking.
    Complete,
}

impl<'a> Event<'a> {
    /// Gets the checkpoint phase this event corresponds to.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{model::Event, Phase, Site};
    /// let site = Site::new("f");
    /// assert_eq!(Event::Start.phase(), Phase::Before);
    /// assert_eq!(Event::Enter(&site).phase(), Phase::Before);
    /// assert_eq!(Event::Exit(&site).phase(), Phase::After);
    /// assert_eq!(Event::Complete.phase(), Phase::After);
    /// ```
    pub fn phase(&self) -> Phase {
        match self {
            Self::Start | Self::Enter(_) => Phase::Before,
            Self::Exit(_) | Self::Complete => Phase::After,
        }
    }

    /// Gets the site this event happened at, if it was at a site.
    pub fn site(&self) -> Option<&'a Site> {
        match *self {
            Self::Enter(s) | Self::Exit(s) => Some(s),
            Self::Start | Self::Complete => None,
        }
    }
}
