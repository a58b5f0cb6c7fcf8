use crate::{
    action::{ActionDraft, ActionRecord},
    error::ScoutError,
};

use super::{score::Score, scoring::ScoringPolicy};

/// Append-only action log for one set, carrying its score projection.
///
/// `score() == Score::fold(records())` holds after every public call: both are only
/// ever changed together inside `push` and `undo_last`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    records: Vec<ActionRecord>,
    score: Score,
}

impl ActionLog {
    /// Empty log at 0-0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `draft`, stores the delta on the record, and updates the score.
    pub fn append<P: ScoringPolicy + ?Sized>(
        &mut self,
        policy: &P,
        draft: ActionDraft,
    ) -> Result<&ActionRecord, ScoutError> {
        draft.validate()?;
        let delta = policy.classify(draft.action, draft.quality);
        Ok(self.push(ActionRecord::from_draft(draft, delta)))
    }

    /// Pops the tail record and reverses its stored delta.
    pub fn undo_last(&mut self) -> Result<ActionRecord, ScoutError> {
        let rec = self.records.pop().ok_or(ScoutError::EmptyLog)?;
        self.score.revert(rec.delta);
        Ok(rec)
    }

    /// Current score, O(1).
    pub fn score(&self) -> Score {
        self.score
    }

    /// Borrowed view of the records in append order.
    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    /// Owned copy of the records for persistence or aggregation.
    pub fn snapshot(&self) -> Vec<ActionRecord> {
        self.records.clone()
    }

    /// Most recent `n` records, oldest first.
    pub fn recent(&self, n: usize) -> &[ActionRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Last record, if any.
    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded this set.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record and resets the score to 0-0.
    pub fn clear(&mut self) {
        self.records.clear();
        self.score = Score::default();
    }

    /// Appends an already-classified record, trusting its stored delta.
    pub(crate) fn push(&mut self, record: ActionRecord) -> &ActionRecord {
        self.score.apply(record.delta);
        let idx = self.records.len();
        self.records.push(record);
        &self.records[idx]
    }
}
