//! Turning scores into players.

use super::{err, Score};
use crate::{model::Checkpoint, player::Player};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

/// A log of the steps a scripted player has completed.
#[derive(Debug, Default)]
pub struct Transcript(Mutex<Vec<String>>);

impl Transcript {
    /// Records that a step completed.
    pub fn record(&self, step: impl Into<String>) {
        self.lock().push(step.into())
    }

    /// Copies out the steps recorded so far.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    // A player panicking mid-record leaves the log intact, so poisoning
    // doesn't matter here.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The players and checkpoint order built from a score.
pub struct Cast {
    /// The players, in score order.
    pub players: Vec<Player<'static>>,
    /// The checkpoints to reach, in order.
    pub order: Vec<Checkpoint>,
    /// Each player's name and transcript, in score order.
    pub transcripts: Vec<(String, Arc<Transcript>)>,
}

impl Score {
    /// Builds players and a checkpoint order from this score.
    ///
    /// Each player performs its steps through its probe, recording each step
    /// in its transcript as the step's body.  Checkpoints are declared on
    /// their players in the order the score cues them, so repeated cues of
    /// the same step refer to successive visits.
    ///
    /// # Examples
    ///
    /// ```
    /// use metronome::score::Score;
    /// let score: Score = r#"
    /// [[player]]
    /// name = "p"
    /// steps = ["a", "a"]
    ///
    /// [[checkpoint]]
    /// player = "p"
    /// phase = "after"
    /// site = "a"
    /// "#.parse().unwrap();
    ///
    /// let cast = score.cast().unwrap();
    /// assert_eq!(cast.players.len(), 1);
    /// assert_eq!(cast.order.len(), 1);
    /// assert_eq!(cast.order[0].to_string(), "p after a");
    /// ```
    pub fn cast(&self) -> err::Result<Cast> {
        let mut players = Vec::with_capacity(self.players.len());
        let mut transcripts = Vec::with_capacity(self.players.len());
        let mut by_name = HashMap::with_capacity(self.players.len());

        for (i, part) in self.players.iter().enumerate() {
            if by_name.insert(part.name.as_str(), i).is_some() {
                return Err(err::Error::DuplicatePlayer(part.name.clone()));
            }
            let transcript = Arc::new(Transcript::default());
            let steps = part.steps.clone();
            let log = transcript.clone();
            players.push(Player::new(&part.name, move |probe| {
                for step in &steps {
                    probe.call(step, || log.record(step.name()));
                }
            }));
            transcripts.push((part.name.clone(), transcript));
        }

        let mut order = Vec::with_capacity(self.order.len());
        for cue in &self.order {
            let i = *by_name
                .get(cue.player.as_str())
                .ok_or_else(|| err::Error::UnknownPlayer(cue.player.clone()))?;
            if !self.players[i].steps.contains(&cue.site) {
                return Err(err::Error::UnknownSite {
                    player: cue.player.clone(),
                    site: cue.site.clone(),
                });
            }
            order.push(players[i].checkpoint(&cue.site, cue.phase, cue.name.as_deref()));
        }

        debug!(players = players.len(), checkpoints = order.len(), "cast score");
        Ok(Cast {
            players,
            order,
            transcripts,
        })
    }
}
