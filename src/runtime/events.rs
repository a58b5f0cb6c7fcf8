//! Runtime event stream payloads.

use crate::{
    action::ActionRecord,
    core::{roster::Player, score::Score, selection::SelectionState},
    types::{OpSeq, PlayerId, SetNumber},
};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoutEvent {
    /// The half-selection changed (picked, replaced or cancelled).
    SelectionChanged {
        /// New selection state.
        state: SelectionState,
    },
    /// An action was logged.
    ActionRecorded {
        /// Logged record.
        record: ActionRecord,
        /// Score after the append.
        score: Score,
    },
    /// The last action was removed.
    UndoApplied {
        /// Removed record.
        record: ActionRecord,
        /// Score after the rollback.
        score: Score,
    },
    /// A roster slot changed hands.
    Substituted {
        /// Roster slot index.
        slot: usize,
        /// Player who left.
        outgoing: PlayerId,
        /// Player who came on.
        incoming: Player,
    },
    /// A set was durably saved.
    SetSaved {
        /// Saved set.
        set_number: SetNumber,
    },
    /// Saving a set failed; engine state is unchanged.
    SaveFailed {
        /// Set that failed to save.
        set_number: SetNumber,
        /// Sink error text.
        reason: String,
    },
    /// A new set began.
    SetStarted {
        /// Number of the new set.
        set_number: SetNumber,
    },
    /// The match was closed.
    MatchFinalized,
    /// A journal write failed. Unwritten ops stay queued and are retried.
    JournalFailed {
        /// Sink error text.
        reason: String,
    },
    /// The journal has reached at least this op sequence.
    DurableUpTo {
        /// Highest sequence known durable.
        op_seq: OpSeq,
    },
}
