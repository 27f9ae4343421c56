//! Performing scores.

use super::{err, Score};
use crate::{
    model::Checkpoint,
    player::Report,
    run::{conductor, thread},
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// What every player had done when a checkpoint was reached.
#[derive(Clone, Debug, Serialize)]
pub struct Frame {
    /// The checkpoint reached.
    pub checkpoint: Checkpoint,
    /// The name of the player holding the checkpoint.
    pub player: String,
    /// Each player's completed steps, by player name.
    pub transcripts: BTreeMap<String, Vec<String>>,
}

/// The full record of a performed score.
#[derive(Clone, Debug, Serialize)]
pub struct Performance {
    /// One frame per checkpoint reached, in order.
    pub frames: Vec<Frame>,
    /// The report for each player, in score order.
    pub reports: Vec<Report>,
}

impl Performance {
    /// Did every player finish normally, reaching all of its checkpoints?
    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(Report::is_clean)
    }
}

/// Performs `score`, calling `on_frame` on each frame as it's captured.
///
/// # Examples
///
/// ```
/// use metronome::{run::thread::Options, score};
/// let s: score::Score = r#"
/// [[player]]
/// name = "p"
/// steps = ["a", "b"]
///
/// [[checkpoint]]
/// player = "p"
/// phase = "before"
/// site = "b"
/// "#.parse().unwrap();
///
/// let perf = score::perform(&s, &Options::default(), |_| ()).unwrap();
/// assert_eq!(perf.frames[0].transcripts["p"], vec!["a"]);
/// assert!(perf.is_clean());
/// ```
pub fn perform(
    score: &Score,
    options: &thread::Options,
    mut on_frame: impl FnMut(&Frame),
) -> err::Result<Performance> {
    let cast = score.cast()?;
    let transcripts = cast.transcripts;

    let finale = conductor::scope_with(cast.players, cast.order, options, |c| -> crate::err::Result<_> {
        let mut frames = vec![];
        for checkpoint in c {
            let checkpoint = checkpoint?;
            let frame = Frame {
                player: checkpoint.owner().map_or_else(String::new, |o| o.name().to_owned()),
                transcripts: transcripts
                    .iter()
                    .map(|(name, t)| (name.clone(), t.snapshot()))
                    .collect(),
                checkpoint,
            };
            on_frame(&frame);
            frames.push(frame);
        }
        Ok(frames)
    })?;

    let performance = Performance {
        frames: finale.result?,
        reports: finale.reports,
    };
    info!(frames = performance.frames.len(), clean = performance.is_clean(), "performed score");
    Ok(performance)
}
