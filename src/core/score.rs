use serde::{Deserialize, Serialize};

use crate::{action::ActionRecord, types::ScoreDelta};

/// Running set score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Score {
    /// Our points.
    pub ours: u32,
    /// Opponent points.
    pub opponent: u32,
}

impl Score {
    /// Builds a score pair.
    pub fn new(ours: u32, opponent: u32) -> Self {
        Self { ours, opponent }
    }

    /// Credits one point to the side named by `delta`.
    pub fn apply(&mut self, delta: ScoreDelta) {
        match delta {
            ScoreDelta::None => {}
            ScoreDelta::Us => self.ours += 1,
            ScoreDelta::Opponent => self.opponent += 1,
        }
    }

    /// Exact inverse of [`Score::apply`] for a delta previously applied.
    pub fn revert(&mut self, delta: ScoreDelta) {
        match delta {
            ScoreDelta::None => {}
            ScoreDelta::Us => self.ours = self.ours.saturating_sub(1),
            ScoreDelta::Opponent => self.opponent = self.opponent.saturating_sub(1),
        }
    }

    /// Score obtained by folding stored deltas from zero.
    pub fn fold<'a>(records: impl IntoIterator<Item = &'a ActionRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut acc, rec| {
            acc.apply(rec.delta);
            acc
        })
    }

    /// `(ours, opponent)` tuple.
    pub fn as_pair(self) -> (u32, u32) {
        (self.ours, self.opponent)
    }
}
