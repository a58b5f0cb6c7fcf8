//! Engine error taxonomy.

use thiserror::Error;

use crate::types::{OpSeq, PlayerId, SetNumber};

/// Errors raised by the scouting engine. All are recoverable and leave state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoutError {
    /// Undo requested on an empty log.
    #[error("nothing to undo")]
    EmptyLog,

    /// A player id is not present in the set it was expected in.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// Malformed action: quality out of range or inconsistent player/quality fields.
    #[error("invalid action record: {0}")]
    InvalidActionRecord(String),

    /// The same player id appears twice in a roster.
    #[error("duplicate player {0} in roster")]
    DuplicatePlayer(PlayerId),

    /// Rosters must contain at least one player.
    #[error("roster is empty")]
    EmptyRoster,

    /// Roster length does not match the configured size.
    #[error("roster has {actual} players, expected {expected}")]
    RosterSize {
        /// Configured size.
        expected: usize,
        /// Supplied size.
        actual: usize,
    },

    /// The match has been finalized; no further mutation is accepted.
    #[error("match already finalized")]
    MatchFinalized,

    /// A set with no recorded actions cannot be saved.
    #[error("set {0} has no actions to save")]
    EmptySet(SetNumber),

    /// The current set has not been durably saved.
    #[error("set {0} has unsaved changes")]
    UnsavedSet(SetNumber),

    /// A replayed op does not agree with the rebuilt state.
    #[error("journal replay mismatch at op {seq}")]
    ReplayMismatch {
        /// Offending op sequence.
        seq: OpSeq,
    },
}

/// Shorthand for engine results.
pub type ScoutResult<T> = Result<T, ScoutError>;
