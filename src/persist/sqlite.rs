//! SQLite-backed journal and finished-set sink.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::{
    action::ActionRecord,
    config::ScoutConfig,
    core::{
        roster::{Player, Roster},
        score::Score,
        session::{ScoutSession, SetSnapshot},
    },
    op::{Op, StoredOp, StoredOpEnvelope},
    types::{OpSeq, Quality, SetNumber},
};

use super::{GameInfo, OpSink, PersistError, PersistResult, SetSink};

/// SQLite implementation of [`crate::persist::OpSink`] and [`crate::persist::SetSink`].
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates a SQLite-backed sink at `path`.
    ///
    /// Enables WAL mode and sets `synchronous=NORMAL`.
    pub fn open(path: impl AsRef<Path>) -> PersistResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite sink.
    pub fn open_in_memory() -> PersistResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> PersistResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn })
    }

    /// Rebuilds a session by replaying the whole journal over the starting roster.
    pub fn load_session(
        &self,
        roster: Roster,
        team: Vec<Player>,
        config: &ScoutConfig,
    ) -> PersistResult<ScoutSession> {
        let events = self.load_events_after(0)?;
        let count = events.len();
        let session = ScoutSession::replay(roster, team, config, events)?;
        info!(ops = count, set = session.set_number(), "session replayed");
        Ok(session)
    }

    /// Loads journal entries strictly after `seq`.
    pub fn load_events_after(&self, seq: OpSeq) -> PersistResult<Vec<StoredOp>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, ts_ms, payload FROM events WHERE seq > ?1 ORDER BY seq ASC")?;

        let rows = stmt.query_map(params![seq as i64], |row| {
            let seq: i64 = row.get(0)?;
            let ts_ms: i64 = row.get(1)?;
            let payload: Vec<u8> = row.get(2)?;
            let mut op = decode_stored_op_payload(&payload).map_err(|err| {
                rusqlite::Error::FromSqlConversionFailure(
                    payload.len(),
                    rusqlite::types::Type::Blob,
                    Box::new(std::io::Error::other(err)),
                )
            })?;
            op.seq = seq as OpSeq;
            op.ts_ms = ts_ms as u64;
            Ok(op)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Returns the latest sequence persisted in the events table.
    pub fn latest_seq(&self) -> PersistResult<OpSeq> {
        let seq: Option<i64> = self
            .conn
            .query_row("SELECT MAX(seq) FROM events", [], |row| row.get(0))
            .optional()?
            .flatten();
        Ok(seq.unwrap_or(0) as OpSeq)
    }

    /// Loaded game header, if the game has been saved at least once.
    pub fn load_game(&self, game_id: &str) -> PersistResult<Option<GameInfo>> {
        let game = self
            .conn
            .query_row(
                "SELECT id, name, date, team_id FROM games WHERE id = ?1",
                params![game_id],
                |row| {
                    Ok(GameInfo {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        date: row.get(2)?,
                        team_id: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(game)
    }

    /// All saved sets of a game, ordered by set number.
    pub fn load_sets(&self, game_id: &str) -> PersistResult<Vec<SetSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT set_number, our_score, opponent_score FROM sets WHERE game_id = ?1 ORDER BY set_number ASC",
        )?;
        let headers = stmt
            .query_map(params![game_id], |row| {
                let set_number: i64 = row.get(0)?;
                let ours: i64 = row.get(1)?;
                let opponent: i64 = row.get(2)?;
                Ok((
                    set_number as SetNumber,
                    Score::new(ours as u32, opponent as u32),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(headers.len());
        for (set_number, score) in headers {
            out.push(SetSnapshot {
                set_number,
                score,
                actions: self.load_set_actions(game_id, set_number)?,
            });
        }
        Ok(out)
    }

    fn load_set_actions(&self, game_id: &str, set_number: SetNumber) -> PersistResult<Vec<ActionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT player_id, action, quality, delta FROM set_actions WHERE game_id = ?1 AND set_number = ?2 ORDER BY idx ASC",
        )?;
        let rows = stmt
            .query_map(params![game_id, set_number as i64], |row| {
                let player_id: Option<String> = row.get(0)?;
                let action: String = row.get(1)?;
                let quality: Option<i64> = row.get(2)?;
                let delta: String = row.get(3)?;
                Ok((player_id, action, quality, delta))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (player_id, action, quality, delta) in rows {
            let quality = quality
                .map(|q| {
                    u8::try_from(q)
                        .map_err(|_| PersistError::Message(format!("quality {q} out of range")))
                        .and_then(|q| Quality::new(q).map_err(PersistError::from))
                })
                .transpose()?;
            let record = ActionRecord {
                player_id,
                action: from_text(action)?,
                quality,
                delta: from_text(delta)?,
            };
            record.validate()?;
            out.push(record);
        }
        Ok(out)
    }
}

impl OpSink for SqliteSink {
    fn append_ops(&mut self, ops: &[StoredOp]) -> PersistResult<OpSeq> {
        if ops.is_empty() {
            return self.latest_seq();
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO events(seq, ts_ms, set_number, kind, payload) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for stored in ops {
                let payload = serde_json::to_vec(&StoredOpEnvelope::new(stored.clone()))?;
                stmt.execute(params![
                    stored.seq as i64,
                    stored.ts_ms as i64,
                    stored.set_number as i64,
                    op_kind(&stored.op),
                    payload,
                ])?;
            }
        }
        tx.commit()?;

        Ok(ops.last().map(|o| o.seq).unwrap_or(0))
    }

    fn flush(&mut self) -> PersistResult<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(PASSIVE);")?;
        Ok(())
    }
}

impl SetSink for SqliteSink {
    fn save_set(&mut self, game: &GameInfo, set: &SetSnapshot) -> PersistResult<()> {
        let ts_ms = now_ms() as i64;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO games(id, name, date, team_id, saved_at_ms) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![game.id, game.name, game.date, game.team_id, ts_ms],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO sets(game_id, set_number, our_score, opponent_score, saved_at_ms) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                game.id,
                set.set_number as i64,
                set.score.ours as i64,
                set.score.opponent as i64,
                ts_ms
            ],
        )?;
        tx.execute(
            "DELETE FROM set_actions WHERE game_id = ?1 AND set_number = ?2",
            params![game.id, set.set_number as i64],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO set_actions(game_id, set_number, idx, player_id, action, quality, delta) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (idx, rec) in set.actions.iter().enumerate() {
                stmt.execute(params![
                    game.id,
                    set.set_number as i64,
                    idx as i64,
                    rec.player_id,
                    to_text(&rec.action)?,
                    rec.quality.map(|q| i64::from(q.value())),
                    to_text(&rec.delta)?,
                ])?;
            }
        }
        tx.commit()?;
        debug!(game = %game.id, set = set.set_number, actions = set.actions.len(), "set saved");
        Ok(())
    }
}

fn op_kind(op: &Op) -> i64 {
    match op {
        Op::Record { .. } => 1,
        Op::Undo { .. } => 2,
        Op::Substitute { .. } => 3,
        Op::NextSet { .. } => 4,
        Op::Finalize => 5,
    }
}

fn to_text<T: Serialize>(value: &T) -> PersistResult<String> {
    match serde_json::to_value(value)? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(PersistError::Message(format!("expected unit variant, got {other}"))),
    }
}

fn from_text<T: DeserializeOwned>(text: String) -> PersistResult<T> {
    Ok(serde_json::from_value(serde_json::Value::String(text))?)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn decode_stored_op_payload(payload: &[u8]) -> Result<StoredOp, String> {
    let envelope = serde_json::from_slice::<StoredOpEnvelope>(payload)
        .map_err(|e| format!("op payload decode failed: {e}"))?;
    if envelope.format_version != crate::op::OP_FORMAT_VERSION {
        return Err(format!(
            "unsupported op format version: {}",
            envelope.format_version
        ));
    }
    Ok(envelope.stored)
}
