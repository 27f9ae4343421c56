//! The player side of a conducted run.

use super::{baton::Baton, schedule::Schedule};
use crate::{
    err,
    model::{Checkpoint, Event, Site},
    player::{Body, Player, Report, Status},
};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, trace, warn};

/// Drives the handshake for one player, on that player's thread.
///
/// The adapter keeps a cursor into the player's slice of the schedule.  Each
/// time an event matches the checkpoint under the cursor, the adapter passes
/// it: it waits to be granted that position, confirms it, and then parks
/// waiting for the grant of the player's next position.  This means the
/// player stays put at the checkpoint it just reached until the conductor
/// moves on to the player's next checkpoint.
pub(crate) struct Adapter {
    name: String,
    schedule: Arc<Schedule>,
    baton: Arc<Baton>,
    slice: Vec<usize>,
    cursor: Cell<usize>,
    missed: RefCell<Vec<Checkpoint>>,
}

impl Adapter {
    /// Constructs an adapter for `player` over a shared schedule and baton.
    pub(crate) fn new(player: &Player<'_>, schedule: Arc<Schedule>, baton: Arc<Baton>) -> Self {
        Self {
            name: player.name().to_owned(),
            slice: schedule.slice(player.id()).to_vec(),
            schedule,
            baton,
            cursor: Cell::new(0),
            missed: RefCell::new(vec![]),
        }
    }

    /// Runs `body` under this adapter, returning a report once it finishes.
    ///
    /// Panics in `body` are caught and reported; either way, every schedule
    /// position the player hasn't yet passed is passed on the way out.
    pub(crate) fn perform(self, body: Body<'_>) -> err::Result<Report> {
        self.observe(Event::Start)?;
        debug!(player = %self.name, "started");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&Probe { adapter: &self })));
        self.observe(Event::Complete)?;
        self.walk_off()?;

        let status = match outcome {
            Ok(()) => Status::Finished,
            Err(payload) => Status::Panicked(panic_message(payload.as_ref())),
        };
        debug!(player = %self.name, ?status, "finished");
        Ok(Report {
            player: self.name,
            status,
            missed: self.missed.into_inner(),
        })
    }

    /// Gets the schedule position under the cursor, if any remain.
    fn pending(&self) -> Option<usize> {
        self.slice.get(self.cursor.get()).copied()
    }

    fn observe(&self, event: Event<'_>) -> err::Result<()> {
        if let Some(index) = self.pending() {
            let matched = self.schedule.get(index).map_or(false, |cp| cp.matches(&event));
            if matched {
                self.pass(index)?;
            }
        }
        Ok(())
    }

    fn pass(&self, index: usize) -> err::Result<()> {
        self.baton.await_turn(index)?;
        self.baton.confirm(index)?;
        trace!(player = %self.name, index, "passed");

        self.cursor.set(self.cursor.get() + 1);
        if let Some(next) = self.pending() {
            self.baton.await_turn(next)?;
        }
        Ok(())
    }

    /// Passes every remaining position, recording any declared ones as missed.
    fn walk_off(&self) -> err::Result<()> {
        while let Some(index) = self.pending() {
            if let Some(cp) = self.schedule.get(index).filter(|cp| cp.is_declared()) {
                warn!(player = %self.name, checkpoint = %cp, "finished without reaching checkpoint");
                self.missed.borrow_mut().push(cp.clone());
            }
            self.pass(index)?;
        }
        Ok(())
    }

    fn hook(&self, event: Event<'_>) {
        if let Err(e) = self.observe(event) {
            panic!("player '{}' lost the baton: {}", self.name, e);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "(non-string panic)".to_owned()
    }
}

/// The handle through which a player reports what it's doing.
///
/// Each player's callable gets a probe for its own thread, and calls
/// [Probe::enter] and [Probe::exit] (or, more conveniently, [Probe::call])
/// around the sites it wants to be held at.  A probe may block inside these
/// calls while the conductor has the player held.
///
/// Probes can't leave their thread.
pub struct Probe<'a> {
    adapter: &'a Adapter,
}

impl<'a> Probe<'a> {
    /// Reports that the player is about to enter `site`.
    pub fn enter(&self, site: impl Into<Site>) {
        let site = site.into();
        self.adapter.hook(Event::Enter(&site))
    }

    /// Reports that the player has just returned from `site`.
    pub fn exit(&self, site: impl Into<Site>) {
        let site = site.into();
        self.adapter.hook(Event::Exit(&site))
    }

    /// Runs `f` as the site `site`, reporting entry and exit around it.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::{run::conductor, Player};
    /// let mut p = Player::new("p", |probe| {
    ///     let x = probe.call("compute", || 6 * 7);
    ///     assert_eq!(x, 42);
    /// });
    /// let after = p.after("compute");
    /// let finale = conductor::scope(vec![p], vec![after], |c| c.advance().unwrap()).unwrap();
    /// assert!(finale.result.is_some());
    /// ```
    pub fn call<T>(&self, site: impl Into<Site>, f: impl FnOnce() -> T) -> T {
        let site = site.into();
        self.adapter.hook(Event::Enter(&site));
        let result = f();
        self.adapter.hook(Event::Exit(&site));
        result
    }

    /// Gets the name of the player this probe belongs to.
    pub fn player(&self) -> &str {
        &self.adapter.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        thread,
        time::Duration,
    };

    /// Sets up a single player and its adapter against a fresh baton.
    fn rig(
        mut player: Player<'static>,
        sites: &[&'static str],
    ) -> err::Result<(Arc<Baton>, Adapter, Body<'static>)> {
        let order: Vec<Checkpoint> = sites.iter().map(|s| player.before(*s)).collect();
        let schedule = Arc::new(Schedule::build(std::slice::from_ref(&player), &order)?);
        let baton = Arc::new(Baton::new(schedule.len()));
        let adapter = Adapter::new(&player, schedule, baton.clone());
        Ok((baton, adapter, player.into_body()))
    }

    #[test]
    /// The player waits for each grant and stays held at each checkpoint.
    fn test_handshake() -> err::Result<()> {
        let log = Arc::new(Mutex::new(vec![]));
        let l = log.clone();
        let player = Player::new("p", move |probe| {
            probe.call("a", || l.lock().unwrap().push('a'));
            probe.call("b", || l.lock().unwrap().push('b'));
        });
        let (baton, adapter, body) = rig(player, &["a", "b"])?;
        let handle = thread::spawn(move || adapter.perform(body));

        // start
        baton.grant(0)?;
        baton.await_confirm(0)?;
        // before a
        baton.grant(1)?;
        baton.await_confirm(1)?;
        thread::sleep(Duration::from_millis(10));
        assert!(log.lock().unwrap().is_empty());
        // before b
        baton.grant(2)?;
        baton.await_confirm(2)?;
        thread::sleep(Duration::from_millis(10));
        assert_eq!(*log.lock().unwrap(), vec!['a']);
        // end
        baton.grant(3)?;
        baton.await_confirm(3)?;

        let report = handle.join().expect("player thread panicked")?;
        assert_eq!(report.status, Status::Finished);
        assert!(report.missed.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!['a', 'b']);
        Ok(())
    }

    #[test]
    /// Checkpoints on sites the player never visits are passed on the way out.
    fn test_missed_checkpoint() -> err::Result<()> {
        let player = Player::new("p", |probe| probe.enter("a"));
        let (baton, adapter, body) = rig(player, &["a", "nowhere"])?;
        let handle = thread::spawn(move || adapter.perform(body));

        for i in 0..4 {
            baton.grant(i)?;
            baton.await_confirm(i)?;
        }

        let report = handle.join().expect("player thread panicked")?;
        assert_eq!(report.missed.len(), 1);
        assert_eq!(report.missed[0].site(), Some(&Site::new("nowhere")));
        assert!(!report.is_clean());
        Ok(())
    }

    #[test]
    /// Panics in the player are caught and reported.
    fn test_panic() -> err::Result<()> {
        let player = Player::new("p", |probe| {
            probe.enter("a");
            panic!("oh no");
        });
        let (baton, adapter, body) = rig(player, &["a"])?;
        let handle = thread::spawn(move || adapter.perform(body));

        for i in 0..3 {
            baton.grant(i)?;
            baton.await_confirm(i)?;
        }

        let report = handle.join().expect("player thread panicked")?;
        assert_eq!(report.status, Status::Panicked("oh no".to_owned()));
        assert!(report.missed.is_empty());
        Ok(())
    }

    #[test]
    /// Panic payloads are turned into messages where possible.
    fn test_panic_message() {
        let owned: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(owned.as_ref()), "code 7");
        let other: Box<dyn Any + Send> = Box::new(7);
        assert_eq!(panic_message(other.as_ref()), "(non-string panic)");
    }
}
