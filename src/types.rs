//! Shared primitive IDs and scouting enums.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

/// Stable external player key.
pub type PlayerId = String;
/// Monotonic journal sequence number.
pub type OpSeq = u64;
/// One-based set counter within a match.
pub type SetNumber = u32;

/// Court position, used only to order the initial roster display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Setter.
    Setter,
    /// Outside hitter.
    Outside,
    /// Middle blocker.
    Middle,
    /// Opposite hitter.
    Opposite,
    /// Libero.
    Libero,
}

impl Position {
    /// Display rank for the initial line-up listing.
    pub fn display_order(self) -> u8 {
        match self {
            Position::Outside => 1,
            Position::Middle => 2,
            Position::Libero => 3,
            Position::Opposite => 4,
            Position::Setter => 5,
        }
    }
}

/// Recorded action kind: six skills plus two team-level events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Serve.
    Serve,
    /// Serve reception.
    Pass,
    /// Dig / defense.
    Dig,
    /// Set / assist.
    Set,
    /// Attack.
    Attack,
    /// Block.
    Block,
    /// Point won by the opponent with no player attributable.
    OpponentPoint,
    /// Error committed by the opponent.
    OpponentError,
}

impl ActionType {
    /// All skill actions in button-row order.
    pub const SKILLS: [ActionType; 6] = [
        ActionType::Dig,
        ActionType::Set,
        ActionType::Attack,
        ActionType::Block,
        ActionType::Pass,
        ActionType::Serve,
    ];

    /// True for team-level events that never carry a player or quality.
    pub fn is_generic(self) -> bool {
        matches!(self, ActionType::OpponentPoint | ActionType::OpponentError)
    }

    /// Full display label.
    pub fn label(self) -> &'static str {
        match self {
            ActionType::Serve => "Serve",
            ActionType::Pass => "Pass",
            ActionType::Dig => "Dig",
            ActionType::Set => "Set",
            ActionType::Attack => "Attack",
            ActionType::Block => "Block",
            ActionType::OpponentPoint => "Opponent Point",
            ActionType::OpponentError => "Opponent Error",
        }
    }

    /// Abbreviated label used in the point log.
    pub fn short_label(self) -> &'static str {
        match self {
            ActionType::OpponentPoint => "Opp. Point",
            ActionType::OpponentError => "Opp. Error",
            other => other.label(),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Team-level score button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericEvent {
    /// Opponent scored outright.
    OpponentPoint,
    /// Opponent gave the point away.
    OpponentError,
}

impl From<GenericEvent> for ActionType {
    fn from(value: GenericEvent) -> Self {
        match value {
            GenericEvent::OpponentPoint => ActionType::OpponentPoint,
            GenericEvent::OpponentError => ActionType::OpponentError,
        }
    }
}

/// Execution rating in `0..=3`; 3 is a perfect/winning touch, 0 an outright error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Outright error.
    pub const ERROR: Quality = Quality(0);
    /// Poor execution.
    pub const POOR: Quality = Quality(1);
    /// Good execution.
    pub const GOOD: Quality = Quality(2);
    /// Perfect or point-winning execution.
    pub const PERFECT: Quality = Quality(3);
    /// Every rating, best first, as laid out on the action buttons.
    pub const ALL: [Quality; 4] = [Quality(3), Quality(2), Quality(1), Quality(0)];

    /// Validates a raw rating.
    pub fn new(value: u8) -> Result<Self, ScoutError> {
        if value <= 3 {
            Ok(Self(value))
        } else {
            Err(ScoutError::InvalidActionRecord(format!(
                "quality {value} outside 0..=3"
            )))
        }
    }

    /// Raw rating.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = ScoutError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(value: Quality) -> Self {
        value.0
    }
}

/// Which side, if any, an action scored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScoreDelta {
    /// No score change.
    #[default]
    None,
    /// Point for our team.
    Us,
    /// Point for the opponent.
    Opponent,
}
