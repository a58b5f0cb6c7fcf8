use tracing::info;

use crate::error::ScoutError;

use super::roster::{Player, Roster};

/// Bench players: the full team minus everyone currently on court, in team order.
pub fn eligible_incoming(roster: &Roster, team: &[Player]) -> Vec<Player> {
    team.iter()
        .filter(|p| !roster.contains(&p.id))
        .cloned()
        .collect()
}

/// Swaps `outgoing_id` for `incoming_id` in place of the same slot.
///
/// Returns the new roster and the slot index. The input roster is left as is, so a
/// failure leaves the caller's roster unchanged. Logged actions are never touched.
pub fn substitute(
    roster: &Roster,
    team: &[Player],
    outgoing_id: &str,
    incoming_id: &str,
) -> Result<(Roster, usize), ScoutError> {
    let slot = roster
        .slot_of(outgoing_id)
        .ok_or_else(|| ScoutError::PlayerNotFound(outgoing_id.to_string()))?;

    let incoming = team
        .iter()
        .find(|p| p.id == incoming_id && !roster.contains(&p.id))
        .cloned()
        .ok_or_else(|| ScoutError::PlayerNotFound(incoming_id.to_string()))?;

    info!(slot, outgoing = outgoing_id, incoming = incoming_id, "substitution");
    Ok((roster.with_slot_replaced(slot, incoming), slot))
}
