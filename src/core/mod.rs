//! In-memory scouting engine.

/// Append-only per-set action log with its score projection.
pub mod log;
/// On-court players.
pub mod roster;
/// Score pair.
pub mod score;
/// Action-to-score classification.
pub mod scoring;
/// Two-tap selection state machine.
pub mod selection;
/// Live match session and set lifecycle.
pub mod session;
/// Bench eligibility and slot swaps.
pub mod substitution;
