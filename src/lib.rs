//! Live volleyball match scouting: tap-driven action log with derived score, undo and
//! substitutions, plus an optional journaling runtime.
//!
//! # Examples
//!
//! In-memory usage with [`core::session::ScoutSession`]:
//! ```
//! use volleyscout::{
//!     config::ScoutConfig,
//!     core::{
//!         roster::{Player, Roster},
//!         session::{ScoutSession, TapOutcome},
//!     },
//!     types::{ActionType, GenericEvent, Position, Quality},
//! };
//!
//! let roster = Roster::new(vec![
//!     Player::new("p1", "Silva", 7, Position::Outside),
//!     Player::new("p2", "Costa", 10, Position::Setter),
//! ]).expect("roster");
//! let mut session = ScoutSession::new(roster, Vec::new(), &ScoutConfig::default()).expect("session");
//!
//! // Player first, then action.
//! session.on_player_tap("p1").expect("tap");
//! let outcome = session.on_action_tap(ActionType::Attack, Quality::PERFECT).expect("tap");
//! assert!(matches!(outcome, TapOutcome::Recorded(_)));
//! assert_eq!(session.current_score().as_pair(), (1, 0));
//!
//! session.on_generic_score_tap(GenericEvent::OpponentPoint).expect("tap");
//! assert_eq!(session.current_score().as_pair(), (1, 1));
//!
//! session.on_undo().expect("undo");
//! assert_eq!(session.current_score().as_pair(), (1, 0));
//! ```
//!
//! Runtime usage with SQLite sink:
//! ```no_run
//! use volleyscout::{
//!     config::ScoutConfig,
//!     core::{roster::{Player, Roster}, session::ScoutSession},
//!     persist::{GameInfo, sqlite::SqliteSink},
//!     runtime::handle::{spawn_scout, NextSetMode, RuntimeConfig},
//!     types::{ActionType, Position, Quality},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let roster = Roster::new(vec![Player::new("p1", "Silva", 7, Position::Outside)]).expect("roster");
//! let session = ScoutSession::new(roster, Vec::new(), &ScoutConfig::default()).expect("session");
//! let sink = SqliteSink::open("scout.db").expect("open sqlite");
//! let handle = spawn_scout(session, Some(Box::new(sink)), RuntimeConfig::default());
//!
//! handle.action_tap(ActionType::Serve, Quality::PERFECT).await.expect("tap");
//! handle.player_tap("p1").await.expect("tap");
//! let game = GameInfo {
//!     id: "game-1".to_string(),
//!     name: "Friendly".to_string(),
//!     date: "2026-10-17".to_string(),
//!     team_id: "team-1".to_string(),
//! };
//! handle.save_set(game).await.expect("save");
//! handle.next_set(NextSetMode::RequireSaved).await.expect("next set");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Action drafts and logged records.
pub mod action;
/// Engine configuration.
pub mod config;
/// In-memory scouting engine.
pub mod core;
/// Engine error taxonomy.
pub mod error;
/// Journal op model and persistence wrapper types.
pub mod op;
/// Persistence boundary and SQLite implementation.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive types and enums.
pub mod types;
