//! Players: callables to be conducted, and the checkpoints declared on them.

pub mod report;

pub use report::{Report, Status};

use crate::{
    model::{Checkpoint, Phase, PlayerId, Site},
    run::Probe,
};

/// The boxed callable a player runs.
pub type Body<'env> = Box<dyn FnOnce(&Probe<'_>) + Send + 'env>;

/// A callable that runs on its own thread under the control of a conductor.
///
/// The callable receives a [Probe], through which it reports the call sites
/// it enters and exits.  Checkpoints are declared on those sites with
/// [Player::before] and [Player::after], in the order the player will reach
/// them.
pub struct Player<'env> {
    id: PlayerId,
    initial: Checkpoint,
    terminal: Checkpoint,
    declared: Vec<Checkpoint>,
    body: Body<'env>,
}

impl<'env> Player<'env> {
    /// Constructs a player called `name` that will run `body`.
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: FnOnce(&Probe<'_>) + Send + 'env,
    {
        let id = PlayerId::new(name);
        Self {
            initial: Checkpoint::initial(&id),
            terminal: Checkpoint::terminal(&id),
            id,
            declared: vec![],
            body: Box::new(body),
        }
    }

    /// Declares a checkpoint just before the player next enters `site`.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{Phase, Player};
    /// let mut p = Player::new("p", |probe| probe.enter("f"));
    /// let cp = p.before("f");
    /// assert_eq!(cp.phase(), Some(Phase::Before));
    /// assert_eq!(p.declared(), &[cp]);
    /// ```
    pub fn before(&mut self, site: impl Into<Site>) -> Checkpoint {
        self.checkpoint(site, Phase::Before, None)
    }

    /// Declares a checkpoint just after the player next returns from `site`.
    pub fn after(&mut self, site: impl Into<Site>) -> Checkpoint {
        self.checkpoint(site, Phase::After, None)
    }

    /// Declares a checkpoint with the given phase and optional display name.
    ///
    /// Checkpoints must be declared in the order the player reaches them.
    pub fn checkpoint(&mut self, site: impl Into<Site>, phase: Phase, name: Option<&str>) -> Checkpoint {
        let cp = Checkpoint::declared(&self.id, site.into(), phase, name.map(str::to_owned));
        self.declared.push(cp.clone());
        cp
    }

    /// Gets the display name of this player.
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Gets the identity of this player.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Gets the implicit checkpoint at the start of this player's run.
    pub fn initial(&self) -> &Checkpoint {
        &self.initial
    }

    /// Gets the implicit checkpoint at the end of this player's run.
    pub fn terminal(&self) -> &Checkpoint {
        &self.terminal
    }

    /// Gets the checkpoints declared on this player, in declaration order.
    pub fn declared(&self) -> &[Checkpoint] {
        &self.declared
    }

    /// Consumes this player, yielding its callable.
    pub(crate) fn into_body(self) -> Body<'env> {
        self.body
    }
}

impl std::fmt::Debug for Player<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("declared", &self.declared)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// Every player gets its own implicit checkpoints.
    fn test_implicit_checkpoints() {
        let p = Player::new("p", |_| {});
        let q = Player::new("p", |_| {});

        assert!(p.initial().is_initial());
        assert!(p.terminal().is_terminal());
        assert_eq!(p.initial().owner(), Some(p.id()));
        assert_ne!(p.initial(), q.initial());
        assert_ne!(p.id(), q.id());
    }

    #[test]
    /// Declarations keep their order and their owner.
    fn test_declaration_order() {
        let mut p = Player::new("p", |_| {});
        let a = p.before("f");
        let b = p.checkpoint("f", Phase::After, Some("out"));
        let c = p.before("g");

        assert_eq!(p.declared(), &[a.clone(), b.clone(), c]);
        assert_eq!(b.name(), Some("out"));
        assert!(p.declared().iter().all(|cp| cp.owner() == Some(p.id())));
        assert_eq!(a.site(), Some(&Site::new("f")));
    }
}
