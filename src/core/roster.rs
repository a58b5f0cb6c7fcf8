use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::{
    error::ScoutError,
    types::{PlayerId, Position},
};

/// Rostered player as fetched from the team source. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable external key.
    pub id: PlayerId,
    /// Display name.
    pub surname: String,
    /// Jersey number.
    pub number: u16,
    /// Court position.
    pub position: Position,
}

impl Player {
    /// Convenience constructor.
    pub fn new(
        id: impl Into<PlayerId>,
        surname: impl Into<String>,
        number: u16,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            surname: surname.into(),
            number,
            position,
        }
    }
}

/// Ordered on-court players for the current match. Ids are unique and the list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Player>", into = "Vec<Player>")]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Builds a roster, preserving the given order.
    pub fn new(players: Vec<Player>) -> Result<Self, ScoutError> {
        if players.is_empty() {
            return Err(ScoutError::EmptyRoster);
        }
        {
            let mut seen = HashSet::with_capacity(players.len());
            for p in &players {
                if !seen.insert(p.id.as_str()) {
                    return Err(ScoutError::DuplicatePlayer(p.id.clone()));
                }
            }
        }
        Ok(Self { players })
    }

    /// Builds a roster ordered by [`Position::display_order`]; ties keep input order.
    pub fn by_position(mut players: Vec<Player>) -> Result<Self, ScoutError> {
        players.sort_by_key(|p| p.position.display_order());
        Self::new(players)
    }

    /// Players in slot order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Always false for a constructed roster.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Looks up a player by id.
    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Slot index of a player.
    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// True when `id` is on court.
    pub fn contains(&self, id: &str) -> bool {
        self.slot_of(id).is_some()
    }

    pub(crate) fn with_slot_replaced(&self, slot: usize, incoming: Player) -> Self {
        let mut players = self.players.clone();
        players[slot] = incoming;
        Self { players }
    }
}

impl TryFrom<Vec<Player>> for Roster {
    type Error = ScoutError;

    fn try_from(value: Vec<Player>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Roster> for Vec<Player> {
    fn from(value: Roster) -> Self {
        value.players
    }
}
