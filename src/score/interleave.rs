//! Traits for reordering a score's cues.

use super::Cue;
use std::collections::VecDeque;

/// Trait for things that can reorder a score's cues.
pub trait Interleaver {
    /// Reorders `cues`, keeping each player's cues in their relative order.
    ///
    /// A player's own checkpoints must be reached in the order it runs into
    /// them, so only the interleaving between players is up for grabs.
    fn interleave(&mut self, cues: &mut Vec<Cue>);
}

/// Any random number generator can interleave.
///
/// Each interleaving is equally likely: the next cue comes from each player
/// with probability proportional to how many cues that player has left.
impl<R: rand::Rng + ?Sized> Interleaver for R {
    fn interleave(&mut self, cues: &mut Vec<Cue>) {
        let mut lanes: Vec<VecDeque<Cue>> = vec![];
        for cue in cues.drain(..) {
            match lanes.iter_mut().find(|l| l.front().map_or(false, |c| c.player == cue.player)) {
                Some(lane) => lane.push_back(cue),
                None => lanes.push(VecDeque::from(vec![cue])),
            }
        }

        let mut left: usize = lanes.iter().map(VecDeque::len).sum();
        while left > 0 {
            let mut pick = self.gen_range(0..left);
            for lane in lanes.iter_mut() {
                if pick < lane.len() {
                    cues.extend(lane.pop_front());
                    break;
                }
                pick -= lane.len();
            }
            left -= 1;
        }
    }
}

/// An interleaver that keeps the order as written.
pub struct Keep;

impl Interleaver for Keep {
    fn interleave(&mut self, _: &mut Vec<Cue>) {}
}
