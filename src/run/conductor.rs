//! The conductor: the driver side of a conducted run.

use super::{
    adapter::Adapter,
    baton::Baton,
    schedule::Schedule,
    thread::{self, Job, Joiner, Threader},
};
use crate::{
    err,
    model::{Checkpoint, PlayerId},
    player::{Player, Report},
};
use std::{
    collections::HashSet,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, trace, warn};

/// Steps a set of players through a fixed order of checkpoints.
///
/// Each call to [Conductor::advance] lets the players run just far enough to
/// reach the next checkpoint in the order, and then holds them all still:
/// the player owning that checkpoint stays parked at it until a later
/// advance needs that player to move on.
///
/// `'h` is the lifetime of the handles on the player threads.
pub struct Conductor<'h> {
    schedule: Arc<Schedule>,
    baton: Arc<Baton>,
    order: Vec<Checkpoint>,
    /// Next schedule position to grant.
    next_entry: usize,
    /// Next index into `order` to stop at.
    next_stop: usize,
    held: Checkpoint,
    seats: Vec<Seat<'h>>,
    /// Players whose threads couldn't be started; we confirm for them.
    orphans: HashSet<PlayerId>,
}

/// A player's place in the run.
struct Seat<'h> {
    name: String,
    joiner: Option<Joiner<'h>>,
}

impl Conductor<'static> {
    /// Starts `players` on detached threads, ready to be stepped through
    /// `order`.
    pub fn start(players: Vec<Player<'static>>, order: Vec<Checkpoint>) -> err::Result<Self> {
        Self::start_with(players, order, &thread::Detached::default())
    }
}

impl<'h> Conductor<'h> {
    /// Starts `players` on threads spawned by `threader`, ready to be stepped
    /// through `order`.
    ///
    /// Players are held at their start until the first advance that needs
    /// them.  Players owning nothing in `order` are never started.
    pub fn start_with<'env, T: Threader<'env, 'h>>(
        players: Vec<Player<'env>>,
        order: Vec<Checkpoint>,
        threader: &T,
    ) -> err::Result<Self> {
        let schedule = Arc::new(Schedule::build(&players, &order)?);
        let baton = Arc::new(Baton::new(schedule.len()));
        let mut conductor = Self {
            schedule,
            baton,
            order,
            next_entry: 0,
            next_stop: 0,
            held: Checkpoint::null(),
            seats: Vec::with_capacity(players.len()),
            orphans: HashSet::new(),
        };

        let mut failure = None;
        for player in players {
            let seat = conductor.seat(player, threader);
            failure = failure.or(seat.err());
        }
        if let Some(e) = failure {
            // Drain so the players we did start can finish.
            if let Err(cleanup) = conductor.finish() {
                warn!(error = %cleanup, "couldn't wind down after failed start");
            }
            return Err(e);
        }
        Ok(conductor)
    }

    fn seat<'env, T: Threader<'env, 'h>>(&mut self, player: Player<'env>, threader: &T) -> err::Result<()> {
        let name = player.name().to_owned();
        if self.schedule.slice(player.id()).is_empty() {
            warn!(player = %name, "player has no scheduled checkpoints, so won't run");
            self.seats.push(Seat { name, joiner: None });
            return Ok(());
        }

        let adapter = Adapter::new(&player, self.schedule.clone(), self.baton.clone());
        let id = player.id().clone();
        let body = player.into_body();
        let job: Job<'env> = Box::new(move || adapter.perform(body));
        match threader.spawn(name.clone(), job) {
            Ok(joiner) => {
                debug!(player = %name, "spawned player");
                self.seats.push(Seat {
                    name,
                    joiner: Some(joiner),
                });
                Ok(())
            }
            Err(e) => {
                self.orphans.insert(id);
                self.seats.push(Seat { name, joiner: None });
                Err(e)
            }
        }
    }

    /// Runs the players until they reach the next checkpoint in the order.
    ///
    /// Returns that checkpoint, leaving its owner held there; returns `None`
    /// without blocking once the order is exhausted.  Implicit checkpoints,
    /// and any declared ones left out of the order, go by along the way.
    pub fn advance(&mut self) -> err::Result<Option<Checkpoint>> {
        let target = match self.order.get(self.next_stop) {
            Some(cp) => cp.clone(),
            None => return Ok(None),
        };
        let stop = self
            .schedule
            .position(&target)
            .ok_or_else(|| err::Error::ScheduleExhausted(target.clone()))?;
        while self.next_entry <= stop {
            self.step()?;
        }

        self.next_stop += 1;
        debug!(checkpoint = %target, "reached");
        self.held = target.clone();
        Ok(Some(target))
    }

    /// Grants the next schedule position, and waits for its owner to get
    /// there.
    fn step(&mut self) -> err::Result<()> {
        let index = self.next_entry;
        let cp = self
            .schedule
            .get(index)
            .ok_or_else(|| err::Error::ScheduleExhausted(self.held.clone()))?;
        self.baton.grant(index)?;
        if cp.owner().map_or(false, |o| self.orphans.contains(o)) {
            self.baton.confirm(index)?;
        }
        self.baton.await_confirm(index)?;
        trace!(index, checkpoint = %cp, "stepped");
        self.next_entry += 1;
        Ok(())
    }

    /// Gets the checkpoint most recently returned by [Conductor::advance].
    ///
    /// Its owner is held there until the conductor next needs it.
    pub fn held(&self) -> Option<&Checkpoint> {
        Some(&self.held).filter(|cp| !cp.is_null())
    }

    /// Gets the schedule this conductor is working through.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Gets the number of checkpoints left in the order.
    pub fn remaining(&self) -> usize {
        self.order.len() - self.next_stop
    }

    /// Lets every player run to completion, and collects their reports.
    ///
    /// Reports come back in the order the players were given.
    pub fn finish(mut self) -> err::Result<Vec<Report>> {
        while self.next_entry < self.schedule.len() {
            self.step()?;
        }
        self.held = Checkpoint::null();
        self.next_stop = self.order.len();
        debug!("released all players");

        self.seats
            .into_iter()
            .map(|seat| match seat.joiner {
                Some(joiner) => joiner.join(&seat.name),
                None => Ok(Report::idle(seat.name)),
            })
            .collect()
    }
}

/// Stepping through a conductor yields each checkpoint in turn.
impl Iterator for Conductor<'_> {
    type Item = err::Result<Checkpoint>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

/// The outcome of a scoped run.
#[derive(Debug)]
pub struct Finale<R> {
    /// Whatever the driving closure returned.
    pub result: R,
    /// The report for each player, in the order the players were given.
    pub reports: Vec<Report>,
}

/// Conducts `players`, which may borrow from the caller, through `order`.
///
/// `body` drives the conductor; once it returns, the players are let run to
/// completion and joined.  If `body` panics, the players are still released
/// and joined before the panic carries on.
pub fn scope<'env, R>(
    players: Vec<Player<'env>>,
    order: Vec<Checkpoint>,
    body: impl FnOnce(&mut Conductor<'_>) -> R,
) -> err::Result<Finale<R>> {
    scope_with(players, order, &thread::Options::default(), body)
}

/// Like [scope], but with explicit thread options.
pub fn scope_with<'env, R>(
    players: Vec<Player<'env>>,
    order: Vec<Checkpoint>,
    options: &thread::Options,
    body: impl FnOnce(&mut Conductor<'_>) -> R,
) -> err::Result<Finale<R>> {
    let outcome = crossbeam::thread::scope(|s| {
        let threader = thread::Scoped::new(s, options.clone());
        let mut conductor = Conductor::start_with(players, order, &threader)?;
        let result = panic::catch_unwind(AssertUnwindSafe(|| body(&mut conductor)));
        let reports = conductor.finish();
        match result {
            Ok(result) => Ok(Finale {
                result,
                reports: reports?,
            }),
            Err(payload) => panic::resume_unwind(payload),
        }
    });
    outcome.unwrap_or_else(|payload| panic::resume_unwind(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Status;
    use std::{sync::Mutex, thread::sleep, time::Duration};

    const FIRST: &str = "first";
    const SECOND: &str = "second";
    const THIRD: &str = "third";

    /// A simple stateful machine that logs each step it takes.
    #[derive(Default)]
    struct Machine(Mutex<Vec<u8>>);

    impl Machine {
        fn log(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, x: u8) {
            self.0.lock().unwrap().push(x)
        }

        /// Makes a player that runs this machine through three steps.
        fn player<'a>(&'a self, name: &str) -> Player<'a> {
            Player::new(name, move |probe| {
                probe.call(FIRST, || self.push(1));
                probe.call(SECOND, || self.push(2));
                probe.call(THIRD, || self.push(3));
            })
        }
    }

    /// Declares a checkpoint before each step of a machine player.
    fn before_each(p: &mut Player<'_>) -> Vec<Checkpoint> {
        vec![p.before(FIRST), p.before(SECOND), p.before(THIRD)]
    }

    #[test]
    /// A single player is held before each step in turn.
    fn test_single_player() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let order = before_each(&mut p);
        let expected = order.clone();

        let finale = scope(vec![p], order, |c| -> err::Result<()> {
            assert!(m.log().is_empty());
            assert_eq!(c.advance()?.as_ref(), Some(&expected[0]));
            assert!(m.log().is_empty());
            assert_eq!(c.advance()?.as_ref(), Some(&expected[1]));
            assert_eq!(m.log(), vec![1]);
            assert_eq!(c.advance()?.as_ref(), Some(&expected[2]));
            assert_eq!(m.log(), vec![1, 2]);
            assert_eq!(c.advance()?, None);
            assert_eq!(m.log(), vec![1, 2]);
            Ok(())
        })?;
        finale.result?;

        assert_eq!(m.log(), vec![1, 2, 3]);
        assert!(finale.reports.iter().all(Report::is_clean));
        Ok(())
    }

    #[test]
    /// A player doesn't move until one of its checkpoints is due.
    fn test_sequential_players() -> err::Result<()> {
        let (m1, m2) = (Machine::default(), Machine::default());
        let (mut p1, mut p2) = (m1.player("p1"), m2.player("p2"));
        let mut order = before_each(&mut p1);
        order.extend(before_each(&mut p2));
        let p2_first = order[3].clone();

        let finale = scope(vec![p1, p2], order, |c| -> err::Result<()> {
            for _ in 0..3 {
                c.advance()?;
                assert!(m2.log().is_empty());
            }
            assert_eq!(m1.log(), vec![1, 2]);

            assert_eq!(c.advance()?, Some(p2_first));
            assert_eq!(m1.log(), vec![1, 2, 3]);
            assert!(m2.log().is_empty());

            c.advance()?;
            assert_eq!(m2.log(), vec![1]);
            Ok(())
        })?;
        finale.result?;

        assert_eq!(m1.log(), vec![1, 2, 3]);
        assert_eq!(m2.log(), vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    /// Interleaved checkpoints give interleaved state.
    fn test_interleaved_players() -> err::Result<()> {
        let (m1, m2) = (Machine::default(), Machine::default());
        let (mut p1, mut p2) = (m1.player("p1"), m2.player("p2"));
        let a = before_each(&mut p1);
        let b = before_each(&mut p2);
        let order = vec![
            a[0].clone(),
            b[0].clone(),
            a[1].clone(),
            a[2].clone(),
            b[1].clone(),
            b[2].clone(),
        ];

        let finale = scope(vec![p1, p2], order, |c| -> err::Result<()> {
            let expected: [(&[u8], &[u8]); 6] = [
                (&[], &[]),
                (&[], &[]),
                (&[1], &[]),
                (&[1, 2], &[]),
                (&[1, 2, 3], &[1]),
                (&[1, 2, 3], &[1, 2]),
            ];
            for (want1, want2) in expected.iter() {
                c.advance()?;
                assert_eq!(&m1.log()[..], *want1);
                assert_eq!(&m2.log()[..], *want2);
            }
            Ok(())
        })?;
        finale.result?;
        Ok(())
    }

    #[test]
    /// After-phase checkpoints hold the player once the site returns.
    fn test_after_phase() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let order = vec![p.after(FIRST), p.after(THIRD)];

        let finale = scope(vec![p], order, |c| -> err::Result<()> {
            c.advance()?;
            assert_eq!(m.log(), vec![1]);
            c.advance()?;
            assert_eq!(m.log(), vec![1, 2, 3]);
            Ok(())
        })?;
        finale.result?;
        Ok(())
    }

    #[test]
    /// State stays frozen between advances.
    fn test_frozen() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let order = vec![p.before(SECOND)];

        let finale = scope(vec![p], order, |c| -> err::Result<()> {
            c.advance()?;
            sleep(Duration::from_millis(50));
            assert_eq!(m.log(), vec![1]);
            assert!(c.held().is_some());
            Ok(())
        })?;
        finale.result?;
        assert_eq!(m.log(), vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    /// A player stays held at its last listed checkpoint, even when it has
    /// later ones that aren't listed.
    fn test_frozen_before_unlisted() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let first = p.before(FIRST);
        let _second = p.before(SECOND);
        let _third = p.before(THIRD);

        let finale = scope(vec![p], vec![first.clone()], |c| -> err::Result<()> {
            assert_eq!(c.advance()?, Some(first.clone()));
            sleep(Duration::from_millis(50));
            assert!(m.log().is_empty());
            assert_eq!(c.held(), Some(&first));

            assert_eq!(c.advance()?, None);
            sleep(Duration::from_millis(50));
            assert!(m.log().is_empty());
            Ok(())
        })?;
        finale.result?;

        assert_eq!(m.log(), vec![1, 2, 3]);
        assert!(finale.reports[0].is_clean());
        Ok(())
    }

    #[test]
    /// Exhausted conductors keep returning nothing.
    fn test_exhausted() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let order = vec![p.before(FIRST)];

        let finale = scope(vec![p], order, |c| -> err::Result<()> {
            assert_eq!(c.remaining(), 1);
            assert!(c.held().is_none());
            assert!(c.advance()?.is_some());
            assert_eq!(c.remaining(), 0);
            for _ in 0..3 {
                assert_eq!(c.advance()?, None);
            }
            Ok(())
        })?;
        finale.result?;
        Ok(())
    }

    #[test]
    /// Iterating a conductor yields the whole order.
    fn test_iterator() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let order = before_each(&mut p);
        let expected = order.clone();

        let finale = scope(vec![p], order, |c| c.collect::<err::Result<Vec<_>>>())?;
        assert_eq!(finale.result?, expected);
        Ok(())
    }

    #[test]
    /// Players that panic still finish the run, and are reported.
    fn test_panicking_player() -> err::Result<()> {
        let mut p = Player::new("p", |probe| {
            probe.enter(FIRST);
            panic!("boom");
        });
        let first = p.before(FIRST);
        let second = p.before(SECOND);

        let finale = scope(vec![p], vec![first, second.clone()], |c| -> err::Result<()> {
            c.advance()?;
            // The player dies without reaching `second`, which is let go.
            assert_eq!(c.advance()?, Some(second.clone()));
            Ok(())
        })?;
        finale.result?;

        let report = &finale.reports[0];
        assert_eq!(report.status, Status::Panicked("boom".to_owned()));
        assert_eq!(report.missed, vec![second]);
        Ok(())
    }

    #[test]
    /// Players without scheduled checkpoints are idle.
    fn test_idle_player() -> err::Result<()> {
        let m = Machine::default();
        let mut p = m.player("p");
        let idle = Player::new("q", |probe| probe.enter(FIRST));
        let order = vec![p.before(SECOND)];

        let finale = scope(vec![p, idle], order, |c| c.advance())?;
        assert!(finale.result?.is_some());
        assert_eq!(finale.reports[0].status, Status::Finished);
        assert_eq!(finale.reports[1].player, "q");
        assert_eq!(finale.reports[1].status, Status::Idle);
        Ok(())
    }

    #[test]
    /// Conductors can run players on detached threads.
    fn test_detached() -> err::Result<()> {
        let m = Arc::new(Machine::default());
        let m2 = m.clone();
        let mut p = Player::new("p", move |probe| {
            probe.call(FIRST, || m2.push(1));
            probe.call(SECOND, || m2.push(2));
        });
        let order = vec![p.before(SECOND)];

        let mut c = Conductor::start(vec![p], order)?;
        assert!(m.log().is_empty());
        c.advance()?;
        assert_eq!(m.log(), vec![1]);
        let reports = c.finish()?;
        assert_eq!(m.log(), vec![1, 2]);
        assert!(reports[0].is_clean());
        Ok(())
    }

    /// Spawns threads for every player but one.
    struct Refusing<T>(T, &'static str);

    impl<'env, 'h, T: Threader<'env, 'h>> Threader<'env, 'h> for Refusing<T> {
        fn spawn(&self, name: String, job: Job<'env>) -> err::Result<Joiner<'h>> {
            if name == self.1 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "no threads left").into());
            }
            self.0.spawn(name, job)
        }
    }

    #[test]
    /// A player that can't be started fails the start, but the players that
    /// did start are let run to completion.
    fn test_spawn_failure() {
        let (m, n) = (Machine::default(), Machine::default());
        let (mut p, mut q) = (m.player("p"), n.player("q"));
        let order = vec![p.before(SECOND), q.before(FIRST)];

        let result = crossbeam::thread::scope(|s| {
            let threader = Refusing(thread::Scoped::new(s, thread::Options::default()), "q");
            Conductor::start_with(vec![p, q], order, &threader).and_then(Conductor::finish)
        })
        .unwrap();

        assert!(matches!(result, Err(err::Error::Spawn(_))));
        assert_eq!(m.log(), vec![1, 2, 3]);
        assert!(n.log().is_empty());
    }

    #[test]
    /// Bad orders are rejected before any thread starts.
    fn test_bad_order() {
        let mut p = Player::new("p", |_| {});
        let q = Player::new("q", |_| {});
        let a = p.before(FIRST);
        let result = scope(vec![q], vec![a], |_| ());
        assert!(matches!(result, Err(err::Error::UnknownPlayer(_))));
    }

    #[test]
    /// Panics in the driving closure still let the players finish.
    fn test_driver_panic() {
        let m = Machine::default();
        let mut p = m.player("p");
        let order = before_each(&mut p);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            scope(vec![p], order, |c| {
                c.advance().unwrap();
                panic!("driver gave up");
            })
        }));
        assert!(result.is_err());
        assert_eq!(m.log(), vec![1, 2, 3]);
    }
}
