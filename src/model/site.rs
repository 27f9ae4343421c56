//! Call-site identities.

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt::Display};

/// The identity of an instrumented call site.
///
/// Sites compare by name: the instrumentation reporting a site and the
/// checkpoints declared against it must agree on naming.
///
/// # Examples
///
/// ```
/// use metronome::Site;
/// assert_eq!(Site::new("push"), Site::from(String::from("push")));
/// assert_ne!(Site::new("push"), Site::new("pop"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Site(Cow<'static, str>);

impl Site {
    /// Constructs a site from a static name without allocating.
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Gets the name of this site.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Site {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Site {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&Site> for Site {
    fn from(site: &Site) -> Self {
        site.clone()
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
