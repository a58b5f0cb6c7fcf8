//! Action draft and committed record types.

use serde::{Deserialize, Serialize};

use crate::{
    core::roster::Roster,
    error::ScoutError,
    types::{ActionType, PlayerId, Quality, ScoreDelta},
};

/// A fully assembled action that has not yet been classified or logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDraft {
    /// Acting player; `None` for team-level events.
    pub player_id: Option<PlayerId>,
    /// Action kind.
    pub action: ActionType,
    /// Execution rating; `None` for team-level events.
    pub quality: Option<Quality>,
}

impl ActionDraft {
    /// Skill touch by a rostered player.
    pub fn skill(player_id: impl Into<PlayerId>, action: ActionType, quality: Quality) -> Self {
        Self {
            player_id: Some(player_id.into()),
            action,
            quality: Some(quality),
        }
    }

    /// Team-level event with no player and no rating.
    pub fn generic(action: ActionType) -> Self {
        Self {
            player_id: None,
            action,
            quality: None,
        }
    }

    /// Checks that player and quality presence agree with the action kind.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.action.is_generic() {
            if self.player_id.is_some() || self.quality.is_some() {
                return Err(ScoutError::InvalidActionRecord(format!(
                    "{} carries a player or quality",
                    self.action
                )));
            }
        } else if self.player_id.is_none() || self.quality.is_none() {
            return Err(ScoutError::InvalidActionRecord(format!(
                "{} requires a player and a quality",
                self.action
            )));
        }
        Ok(())
    }
}

/// Immutable log entry. `delta` is fixed at append time so undo never reclassifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Acting player; `None` for team-level events.
    pub player_id: Option<PlayerId>,
    /// Action kind.
    pub action: ActionType,
    /// Execution rating; `None` for team-level events.
    pub quality: Option<Quality>,
    /// Score side credited when this record was appended.
    pub delta: ScoreDelta,
}

impl ActionRecord {
    /// Builds a record from a validated draft and its classification.
    pub fn from_draft(draft: ActionDraft, delta: ScoreDelta) -> Self {
        Self {
            player_id: draft.player_id,
            action: draft.action,
            quality: draft.quality,
            delta,
        }
    }

    /// Same field checks as [`ActionDraft::validate`].
    pub fn validate(&self) -> Result<(), ScoutError> {
        ActionDraft {
            player_id: self.player_id.clone(),
            action: self.action,
            quality: self.quality,
        }
        .validate()
    }

    /// Point-log line: `"Surname - Action"`, or just the action for team events.
    ///
    /// Players no longer on `roster` (substituted out) render as `"Unknown"`.
    pub fn describe(&self, roster: &Roster) -> String {
        match &self.player_id {
            None => self.action.short_label().to_string(),
            Some(id) => {
                let name = roster
                    .get(id)
                    .map(|p| p.surname.as_str())
                    .unwrap_or("Unknown");
                format!("{name} - {}", self.action.short_label())
            }
        }
    }
}
