//! Building the global schedule of checkpoints for a run.

use crate::{
    err,
    model::{Checkpoint, PlayerId},
    player::Player,
};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// The full, ordered list of checkpoints for one run.
///
/// A schedule contains every checkpoint in the caller's order, interleaved
/// with the implicit start and end checkpoints of each player the order
/// touches.  Positions in the schedule are the tokens of the baton.
///
/// A touched player's declared checkpoints that come after its last listed
/// one go at the end of the schedule, followed by the player's end, so the
/// player stays held at its last listed checkpoint until the run finishes.
#[derive(Debug, Default)]
pub struct Schedule {
    entries: Vec<Checkpoint>,
    positions: HashMap<Checkpoint, usize>,
    slices: HashMap<PlayerId, Vec<usize>>,
}

/// A player's checkpoints not yet moved into the schedule.
struct Queue {
    initial: Option<Checkpoint>,
    rest: VecDeque<Checkpoint>,
}

impl Queue {
    fn new(player: &Player<'_>) -> Self {
        let mut rest: VecDeque<Checkpoint> = player.declared().iter().cloned().collect();
        rest.push_back(player.terminal().clone());
        Self {
            initial: Some(player.initial().clone()),
            rest,
        }
    }

    /// Drains everything up to and including `cp`, starting with the
    /// initial checkpoint if it hasn't yet been drained.
    ///
    /// If `cp` was already drained, this drains only the initial checkpoint
    /// (if any).
    fn drain_through(&mut self, cp: &Checkpoint) -> Vec<Checkpoint> {
        let mut out: Vec<Checkpoint> = self.initial.take().into_iter().collect();
        if let Some(n) = self.rest.iter().position(|x| x == cp) {
            out.extend(self.rest.drain(..=n));
        }
        if self.rest.len() == 1 {
            out.extend(self.rest.pop_front());
        }
        out
    }

    /// Drains whatever a touched player still has queued.
    ///
    /// Untouched players keep their initial checkpoint, and drain nothing.
    fn drain_leftovers(&mut self) -> Vec<Checkpoint> {
        if self.initial.is_some() {
            return vec![];
        }
        self.rest.drain(..).collect()
    }
}

impl Schedule {
    /// Builds a schedule for `players` from the caller's checkpoint `order`.
    ///
    /// Every checkpoint in `order` must be a declared checkpoint of one of
    /// `players`, and may appear only once.  Players that own no checkpoint
    /// in `order` get no schedule entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{run::Schedule, Player};
    /// let mut p = Player::new("p", |_| {});
    /// let a = p.before("a");
    /// let b = p.before("b");
    ///
    /// let s = Schedule::build(&[p], &[a.clone(), b.clone()]).unwrap();
    /// assert_eq!(s.len(), 4);
    /// assert!(s.get(0).unwrap().is_initial());
    /// assert_eq!(s.position(&a), Some(1));
    /// assert_eq!(s.position(&b), Some(2));
    /// assert!(s.get(3).unwrap().is_terminal());
    /// ```
    pub fn build(players: &[Player<'_>], order: &[Checkpoint]) -> err::Result<Self> {
        let mut queues: HashMap<&PlayerId, Queue> =
            players.iter().map(|p| (p.id(), Queue::new(p))).collect();
        let mut seen = HashSet::with_capacity(order.len());
        let mut schedule = Self::default();

        for cp in order {
            if !cp.is_declared() {
                return Err(err::Error::NotDeclared(cp.clone()));
            }
            if !seen.insert(cp) {
                return Err(err::Error::DuplicateCheckpoint(cp.clone()));
            }
            let queue = cp
                .owner()
                .and_then(|o| queues.get_mut(o))
                .ok_or_else(|| err::Error::UnknownPlayer(cp.clone()))?;
            for entry in queue.drain_through(cp) {
                schedule.push(entry);
            }
        }

        for player in players {
            if let Some(queue) = queues.get_mut(player.id()) {
                for entry in queue.drain_leftovers() {
                    schedule.push(entry);
                }
            }
        }

        debug!(
            entries = schedule.len(),
            players = schedule.slices.len(),
            "built schedule"
        );
        Ok(schedule)
    }

    fn push(&mut self, cp: Checkpoint) {
        let index = self.entries.len();
        if let Some(owner) = cp.owner() {
            self.slices.entry(owner.clone()).or_default().push(index);
        }
        self.positions.insert(cp.clone(), index);
        self.entries.push(cp);
    }

    /// Gets the number of entries in the schedule.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the schedule empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets the checkpoint at position `index`, if there is one.
    pub fn get(&self, index: usize) -> Option<&Checkpoint> {
        self.entries.get(index)
    }

    /// Gets every checkpoint in the schedule, in order.
    pub fn entries(&self) -> &[Checkpoint] {
        &self.entries
    }

    /// Gets the position of `cp` in the schedule, if it is scheduled.
    pub fn position(&self, cp: &Checkpoint) -> Option<usize> {
        self.positions.get(cp).copied()
    }

    /// Gets the positions belonging to `player`, in order.
    ///
    /// Players without entries get an empty slice.
    pub fn slice(&self, player: &PlayerId) -> &[usize] {
        self.slices.get(player).map_or(&[][..], Vec::as_slice)
    }
}
