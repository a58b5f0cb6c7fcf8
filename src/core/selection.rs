use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    action::ActionDraft,
    types::{ActionType, Quality},
};

use super::roster::Player;

/// Half-made selection between two taps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionState {
    /// Nothing picked.
    #[default]
    Idle,
    /// Player tapped first, waiting for an action.
    PlayerPicked {
        /// Selected player.
        player: Player,
    },
    /// Action tapped first, waiting for a player.
    ActionPicked {
        /// Selected skill.
        action: ActionType,
        /// Selected rating.
        quality: Quality,
    },
}

impl SelectionState {
    /// True in `Idle`.
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }

    /// Id of the picked player, if any.
    pub fn player_id(&self) -> Option<&str> {
        match self {
            SelectionState::PlayerPicked { player } => Some(player.id.as_str()),
            _ => None,
        }
    }
}

/// Result of feeding one tap into the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A new or replacement half-selection is held.
    Selected,
    /// The repeat tap cleared the half-selection.
    Cancelled,
    /// Both halves are known; exactly one draft goes downstream.
    Committed(ActionDraft),
}

/// Order-independent pairing of a player tap and an action tap.
///
/// Tapping the held player or the held action/quality again cancels; tapping a different
/// one of the same kind replaces it; tapping the other kind commits and returns to idle.
#[derive(Debug, Clone, Default)]
pub struct SelectionProtocol {
    state: SelectionState,
}

impl SelectionProtocol {
    /// Starts idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, for UI highlighting.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Feeds a player tap.
    pub fn on_player_tap(&mut self, player: &Player) -> Transition {
        let transition = match std::mem::take(&mut self.state) {
            SelectionState::Idle => {
                self.state = SelectionState::PlayerPicked {
                    player: player.clone(),
                };
                Transition::Selected
            }
            SelectionState::PlayerPicked { player: held } if held.id == player.id => {
                Transition::Cancelled
            }
            SelectionState::PlayerPicked { .. } => {
                self.state = SelectionState::PlayerPicked {
                    player: player.clone(),
                };
                Transition::Selected
            }
            SelectionState::ActionPicked { action, quality } => {
                Transition::Committed(ActionDraft::skill(player.id.clone(), action, quality))
            }
        };
        debug!(player = %player.id, ?transition, "player tap");
        transition
    }

    /// Feeds an action/quality tap. Callers route team-level events elsewhere.
    pub fn on_action_tap(&mut self, action: ActionType, quality: Quality) -> Transition {
        let transition = match std::mem::take(&mut self.state) {
            SelectionState::Idle => {
                self.state = SelectionState::ActionPicked { action, quality };
                Transition::Selected
            }
            SelectionState::ActionPicked {
                action: held_action,
                quality: held_quality,
            } if held_action == action && held_quality == quality => Transition::Cancelled,
            SelectionState::ActionPicked { .. } => {
                self.state = SelectionState::ActionPicked { action, quality };
                Transition::Selected
            }
            SelectionState::PlayerPicked { player } => {
                Transition::Committed(ActionDraft::skill(player.id, action, quality))
            }
        };
        debug!(%action, quality = quality.value(), ?transition, "action tap");
        transition
    }

    /// Drops any half-selection. Returns true if something was held.
    pub fn cancel(&mut self) -> bool {
        !std::mem::take(&mut self.state).is_idle()
    }
}
