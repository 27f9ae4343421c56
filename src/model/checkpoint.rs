//! Checkpoints, and the rules for matching them against events.

use super::{event::Event, site::Site};
use serde::{Deserialize, Serialize, Serializer};
use std::{
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

/// String representations of phases.
pub mod string {
    /// String representation of the before phase.
    pub const BEFORE: &str = "before";
    /// String representation of the after phase.
    pub const AFTER: &str = "after";
    /// String representations of all phases.
    pub const ALL: &[&str] = &[BEFORE, AFTER];
}

/// Whether a checkpoint sits just before a call, or just after it returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// The checkpoint holds the player just before it enters the site.
    Before,
    /// The checkpoint holds the player just after the site returns.
    After,
}

/// We display phases by their string representations.
///
/// # Examples
///
/// ```
/// use metronome::Phase;
/// assert_eq!(Phase::Before.to_string(), "before");
/// assert_eq!(Phase::After.to_string(), "after");
/// ```
impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Before => string::BEFORE,
            Self::After => string::AFTER,
        })
    }
}

/// Phases parse case-insensitively.
///
/// # Examples
///
/// ```
/// use metronome::Phase;
/// assert_eq!(str::parse::<Phase>("Before"), Ok(Phase::Before));
/// assert_eq!(str::parse::<Phase>("AFTER"), Ok(Phase::After));
/// assert!(str::parse::<Phase>("during").is_err());
/// ```
impl FromStr for Phase {
    /// Errors just take ownership of the invalid string.
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lc = s.to_lowercase();
        match &*lc {
            string::BEFORE => Ok(Self::Before),
            string::AFTER => Ok(Self::After),
            _ => Err(lc),
        }
    }
}

/// The identity of a player, shared by every checkpoint the player owns.
///
/// Two players with the same name are still different players.
#[derive(Clone)]
pub struct PlayerId(Arc<str>);

impl PlayerId {
    /// Mints a new player identity with the given display name.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Gets the display name of the player.
    pub fn name(&self) -> &str {
        &self.0
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const u8 as usize
    }
}

impl PartialEq for PlayerId {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for PlayerId {}

impl Hash for PlayerId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state)
    }
}

impl Debug for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PlayerId({:?}@{:#x})", &*self.0, self.address())
    }
}

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The different sorts of checkpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    /// A checkpoint the caller declared against a site.
    Declared {
        /// The site at which the checkpoint sits.
        site: Site,
        /// Whether the checkpoint sits before or after the site.
        phase: Phase,
    },
    /// The implicit checkpoint at the very start of a player's run.
    Initial,
    /// The implicit checkpoint at the very end of a player's run.
    Terminal,
    /// A checkpoint that never matches anything.
    Null,
}

/// A point in a player's execution where it can be held by the conductor.
///
/// Checkpoints are cheap handles: cloning one gives another handle on the
/// same checkpoint.  Equality and hashing go by identity, so two checkpoints
/// declared on the same site of the same player are still distinct.
#[derive(Clone)]
pub struct Checkpoint(Arc<Inner>);

struct Inner {
    owner: Option<PlayerId>,
    kind: Kind,
    name: Option<String>,
}

impl Checkpoint {
    fn make(owner: Option<PlayerId>, kind: Kind, name: Option<String>) -> Self {
        Self(Arc::new(Inner { owner, kind, name }))
    }

    /// Declares a checkpoint for `owner` at `phase` of `site`.
    ///
    /// Usually called through [crate::Player::before] and friends, which
    /// also record the checkpoint against the player.
    pub(crate) fn declared(owner: &PlayerId, site: Site, phase: Phase, name: Option<String>) -> Self {
        Self::make(Some(owner.clone()), Kind::Declared { site, phase }, name)
    }

    /// Makes the implicit initial checkpoint of `owner`.
    pub(crate) fn initial(owner: &PlayerId) -> Self {
        Self::make(Some(owner.clone()), Kind::Initial, None)
    }

    /// Makes the implicit terminal checkpoint of `owner`.
    pub(crate) fn terminal(owner: &PlayerId) -> Self {
        Self::make(Some(owner.clone()), Kind::Terminal, None)
    }

    /// Makes a null checkpoint, which belongs to no player and matches
    /// nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{model::Event, Checkpoint};
    /// let null = Checkpoint::null();
    /// assert!(null.is_null());
    /// assert!(!null.matches(&Event::Start));
    /// assert!(!null.matches(&Event::Complete));
    /// assert_ne!(null, Checkpoint::null());
    /// ```
    pub fn null() -> Self {
        Self::make(None, Kind::Null, None)
    }

    /// Gets the identity of the player owning this checkpoint, if any.
    pub fn owner(&self) -> Option<&PlayerId> {
        self.0.owner.as_ref()
    }

    /// Gets what sort of checkpoint this is.
    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// Gets the display name given to this checkpoint, if any.
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Gets the site this checkpoint targets, if it is declared.
    pub fn site(&self) -> Option<&Site> {
        match &self.0.kind {
            Kind::Declared { site, .. } => Some(site),
            _ => None,
        }
    }

    /// Gets the phase of this checkpoint.
    ///
    /// Initial checkpoints sit before the player's run and terminal
    /// checkpoints after it; null checkpoints have no phase.
    pub fn phase(&self) -> Option<Phase> {
        match &self.0.kind {
            Kind::Declared { phase, .. } => Some(*phase),
            Kind::Initial => Some(Phase::Before),
            Kind::Terminal => Some(Phase::After),
            Kind::Null => None,
        }
    }

    /// Is this a caller-declared checkpoint?
    pub fn is_declared(&self) -> bool {
        matches!(self.0.kind, Kind::Declared { .. })
    }

    /// Is this a player's implicit initial checkpoint?
    pub fn is_initial(&self) -> bool {
        matches!(self.0.kind, Kind::Initial)
    }

    /// Is this a player's implicit terminal checkpoint?
    pub fn is_terminal(&self) -> bool {
        matches!(self.0.kind, Kind::Terminal)
    }

    /// Is this one of a player's implicit checkpoints?
    pub fn is_implicit(&self) -> bool {
        self.is_initial() || self.is_terminal()
    }

    /// Is this a null checkpoint?
    pub fn is_null(&self) -> bool {
        matches!(self.0.kind, Kind::Null)
    }

    /// Does `event` reach this checkpoint?
    ///
    /// Declared checkpoints match enter (before) or exit (after) events on
    /// their own site.  The initial checkpoint matches any enter event, which
    /// in practice is the start of the player's callable; the terminal
    /// checkpoint matches only the completion of the callable.
    pub fn matches(&self, event: &Event<'_>) -> bool {
        match &self.0.kind {
            Kind::Declared { site, phase } => {
                event.phase() == *phase && event.site().map_or(false, |s| s == site)
            }
            Kind::Initial => event.phase() == Phase::Before,
            Kind::Terminal => matches!(event, Event::Complete),
            Kind::Null => false,
        }
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Checkpoint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Checkpoint {}

impl Hash for Checkpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state)
    }
}

/// Checkpoints display as a short human-readable label.
impl Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.name() {
            write!(f, "'{}' ", name)?;
        }
        let owner = self.owner().map_or("?", PlayerId::name);
        match &self.0.kind {
            Kind::Declared { site, phase } => write!(f, "{} {} {}", owner, phase, site),
            Kind::Initial => write!(f, "{} start", owner),
            Kind::Terminal => write!(f, "{} end", owner),
            Kind::Null => f.write_str("(none)"),
        }
    }
}

impl Debug for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<CP {} at {:#x}>", self, self.address())
    }
}

/// Serialize by displaying.
impl Serialize for Checkpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerId {
        PlayerId::new("p")
    }

    #[test]
    /// Checkpoints on the same site and phase are still different checkpoints.
    fn test_identity_not_value() {
        let p = player();
        let a = Checkpoint::declared(&p, Site::new("f"), Phase::Before, None);
        let b = Checkpoint::declared(&p, Site::new("f"), Phase::Before, None);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let set: std::collections::HashSet<Checkpoint> = vec![a.clone(), b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    /// Players with the same name are different players.
    fn test_player_identity() {
        let (p, q) = (player(), player());
        assert_ne!(p, q);
        assert_eq!(p, p.clone());
        assert_eq!(p.name(), q.name());
    }

    #[test]
    /// Before checkpoints match entries to their own site, and nothing else.
    fn test_before_matching() {
        let f = Site::new("f");
        let g = Site::new("g");
        let cp = Checkpoint::declared(&player(), f.clone(), Phase::Before, None);

        assert!(cp.matches(&Event::Enter(&f)));
        assert!(!cp.matches(&Event::Exit(&f)));
        assert!(!cp.matches(&Event::Enter(&g)));
        assert!(!cp.matches(&Event::Start));
        assert!(!cp.matches(&Event::Complete));
    }

    #[test]
    /// After checkpoints match exits from their own site, and nothing else.
    fn test_after_matching() {
        let f = Site::new("f");
        let cp = Checkpoint::declared(&player(), f.clone(), Phase::After, None);

        assert!(cp.matches(&Event::Exit(&f)));
        assert!(!cp.matches(&Event::Enter(&f)));
        assert!(!cp.matches(&Event::Exit(&Site::new("g"))));
        assert!(!cp.matches(&Event::Complete));
    }

    #[test]
    /// Implicit checkpoints ignore site identity.
    fn test_implicit_matching() {
        let p = player();
        let initial = Checkpoint::initial(&p);
        let terminal = Checkpoint::terminal(&p);
        let f = Site::new("f");

        assert!(initial.matches(&Event::Start));
        assert!(initial.matches(&Event::Enter(&f)));
        assert!(!initial.matches(&Event::Complete));

        assert!(terminal.matches(&Event::Complete));
        assert!(!terminal.matches(&Event::Exit(&f)));
        assert!(!terminal.matches(&Event::Start));
    }

    #[test]
    /// Checkpoint kinds are reported consistently.
    fn test_kind_predicates() {
        let p = player();
        let declared = Checkpoint::declared(&p, Site::new("f"), Phase::After, Some("x".to_owned()));
        assert!(declared.is_declared() && !declared.is_implicit());
        assert_eq!(declared.phase(), Some(Phase::After));
        assert_eq!(declared.site(), Some(&Site::new("f")));
        assert_eq!(declared.name(), Some("x"));
        assert_eq!(declared.owner(), Some(&p));

        assert!(Checkpoint::initial(&p).is_implicit());
        assert!(Checkpoint::terminal(&p).is_implicit());
        assert_eq!(Checkpoint::terminal(&p).phase(), Some(Phase::After));
        assert_eq!(Checkpoint::null().phase(), None);
        assert_eq!(Checkpoint::null().owner(), None);
    }

    #[test]
    /// Labels mention the name, owner, phase and site.
    fn test_display() {
        let p = PlayerId::new("reader");
        let cp = Checkpoint::declared(&p, Site::new("load"), Phase::Before, Some("r1".to_owned()));
        assert_eq!(cp.to_string(), "'r1' reader before load");
        assert_eq!(Checkpoint::initial(&p).to_string(), "reader start");
        assert_eq!(Checkpoint::terminal(&p).to_string(), "reader end");
        assert_eq!(Checkpoint::null().to_string(), "(none)");
    }
}
