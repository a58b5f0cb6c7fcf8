//! Persistence boundary: journal sink and finished-set sink.

/// SQLite journal and set storage.
pub mod sqlite;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::session::SetSnapshot,
    error::ScoutError,
    op::StoredOp,
    types::OpSeq,
};

/// Errors surfaced by sink implementations.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Payload encode/decode failure.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Anything else, including replay errors.
    #[error("{0}")]
    Message(String),
}

impl From<ScoutError> for PersistError {
    fn from(value: ScoutError) -> Self {
        Self::Message(format!("scout error: {value}"))
    }
}

/// Result alias for sink calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Caller-supplied match header. `id` correlates all sets of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Stable match identifier.
    pub id: String,
    /// Scout / match name.
    pub name: String,
    /// Match date as entered by the user.
    pub date: String,
    /// Team being scouted.
    pub team_id: String,
}

/// Append-only sink for journal entries.
pub trait OpSink: Send {
    /// Appends ops in order and returns the highest durable sequence.
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq>;

    /// Forces buffered writes down.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}

/// Durable storage for finished sets.
pub trait SetSink: Send {
    /// Stores one set under `game`, creating the game record on first use.
    ///
    /// Saving the same set number twice replaces the earlier copy.
    fn save_set(&mut self, game: &GameInfo, set: &SetSnapshot) -> PersistResult<()>;
}

/// Sink handling both the journal and finished sets.
pub trait ScoutSink: OpSink + SetSink {}

impl<T: OpSink + SetSink> ScoutSink for T {}
