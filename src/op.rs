//! Journal operation model and persistence wrappers.

use serde::{Deserialize, Serialize};

use crate::{
    action::ActionRecord,
    core::roster::Player,
    types::{OpSeq, PlayerId, SetNumber},
};

/// Version number for serialized [`StoredOpEnvelope`] payloads.
pub const OP_FORMAT_VERSION: u16 = 1;

/// Immutable session mutation appended to the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// A classified action was appended to the log.
    Record {
        /// Appended record, delta included.
        record: ActionRecord,
    },
    /// The tail record was removed.
    Undo {
        /// Removed record, kept so replay can verify the tail.
        record: ActionRecord,
    },
    /// One roster slot changed hands.
    Substitute {
        /// Roster slot index.
        slot: usize,
        /// Player leaving the court.
        outgoing: PlayerId,
        /// Player entering the court.
        incoming: Player,
    },
    /// Log and score were cleared and the set counter advanced.
    NextSet {
        /// Number of the set that starts.
        set_number: SetNumber,
    },
    /// The match was closed.
    Finalize,
}

/// Journal row metadata plus operation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Monotonic operation sequence.
    pub seq: OpSeq,
    /// Operation timestamp in milliseconds.
    pub ts_ms: u64,
    /// Set in progress when the op was applied.
    pub set_number: SetNumber,
    /// Operation body.
    pub op: Op,
}

/// Versioned wrapper for stable on-disk payload decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOpEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// Wrapped operation.
    pub stored: StoredOp,
}

impl StoredOpEnvelope {
    /// Constructs an envelope using [`OP_FORMAT_VERSION`].
    pub fn new(stored: StoredOp) -> Self {
        Self {
            format_version: OP_FORMAT_VERSION,
            stored,
        }
    }
}
