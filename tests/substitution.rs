use hashbrown::HashSet;

use volleyscout::{
    config::ScoutConfig,
    core::{
        roster::{Player, Roster},
        selection::SelectionState,
        session::ScoutSession,
        substitution::{eligible_incoming, substitute},
    },
    error::ScoutError,
    op::Op,
    types::{ActionType, Position, Quality},
};

fn team() -> Vec<Player> {
    let positions = [
        Position::Setter,
        Position::Outside,
        Position::Outside,
        Position::Middle,
        Position::Middle,
        Position::Opposite,
        Position::Libero,
        Position::Outside,
        Position::Middle,
        Position::Setter,
    ];
    positions
        .iter()
        .enumerate()
        .map(|(i, pos)| Player::new(format!("p{}", i + 1), format!("Player{}", i + 1), i as u16 + 1, *pos))
        .collect()
}

fn seven() -> Roster {
    Roster::new(team().into_iter().take(7).collect()).unwrap()
}

fn session(cfg: &ScoutConfig) -> ScoutSession {
    ScoutSession::new(seven(), team(), cfg).unwrap()
}

#[test]
fn eligible_is_team_minus_roster() {
    let ids: Vec<String> = eligible_incoming(&seven(), &team())
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["p8", "p9", "p10"]);
}

#[test]
fn swap_keeps_slot_size_and_uniqueness_and_history() {
    let cfg = ScoutConfig {
        roster_size: Some(7),
        ..ScoutConfig::default()
    };
    let mut s = session(&cfg);
    s.on_player_tap("p3").unwrap();
    s.on_action_tap(ActionType::Attack, Quality::PERFECT).unwrap();
    s.on_action_tap(ActionType::Pass, Quality::ERROR).unwrap();
    s.on_player_tap("p3").unwrap();
    let history_before = s.current_log().to_vec();

    let slot = s.on_substitute("p3", "p9").unwrap();
    assert_eq!(slot, 2);

    let roster = s.current_roster();
    assert_eq!(roster.len(), 7);
    assert_eq!(roster.players()[2].id, "p9");
    assert!(!roster.contains("p3"));
    let unique: HashSet<&str> = roster.players().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(unique.len(), 7);

    assert_eq!(s.current_log(), history_before.as_slice());
    assert!(s
        .current_log()
        .iter()
        .all(|r| r.player_id.as_deref() == Some("p3")));
    assert_eq!(s.current_score().as_pair(), (1, 1));

    let eligible: Vec<String> = s.eligible_incoming().into_iter().map(|p| p.id).collect();
    assert_eq!(eligible, vec!["p3", "p8", "p10"]);
}

#[test]
fn unknown_outgoing_or_ineligible_incoming_leaves_roster_unchanged() {
    let mut s = session(&ScoutConfig::default());
    let before = s.current_roster().clone();

    assert_eq!(
        s.on_substitute("p9", "p8"),
        Err(ScoutError::PlayerNotFound("p9".to_string()))
    );
    assert_eq!(
        s.on_substitute("p1", "p2"),
        Err(ScoutError::PlayerNotFound("p2".to_string()))
    );
    assert_eq!(
        s.on_substitute("p1", "stranger"),
        Err(ScoutError::PlayerNotFound("stranger".to_string()))
    );
    assert_eq!(s.current_roster(), &before);
    assert!(s.drain_pending_ops().is_empty());
}

#[test]
fn pure_substitute_does_not_mutate_input() {
    let roster = seven();
    let (next, slot) = substitute(&roster, &team(), "p1", "p10").unwrap();
    assert_eq!(slot, 0);
    assert_eq!(roster.players()[0].id, "p1");
    assert_eq!(next.players()[0].id, "p10");
    assert_eq!(&next.players()[1..], &roster.players()[1..]);
}

#[test]
fn substitution_cancels_selection_by_default() {
    let mut s = session(&ScoutConfig::default());
    s.on_action_tap(ActionType::Serve, Quality::GOOD).unwrap();
    s.on_substitute("p1", "p8").unwrap();
    assert_eq!(s.current_selection_state(), &SelectionState::Idle);
}

#[test]
fn lenient_policy_only_cancels_selection_of_outgoing_player() {
    let cfg = ScoutConfig {
        cancel_selection_on_substitution: false,
        ..ScoutConfig::default()
    };
    let mut s = session(&cfg);

    s.on_player_tap("p2").unwrap();
    s.on_substitute("p1", "p8").unwrap();
    assert_eq!(s.current_selection_state().player_id(), Some("p2"));

    s.on_substitute("p2", "p9").unwrap();
    assert!(s.current_selection_state().is_idle());
}

#[test]
fn substitution_is_journaled_with_incoming_player() {
    let mut s = session(&ScoutConfig::default());
    s.on_substitute("p4", "p8").unwrap();
    let ops = s.drain_pending_ops();
    assert_eq!(ops.len(), 1);
    match &ops[0].op {
        Op::Substitute {
            slot,
            outgoing,
            incoming,
        } => {
            assert_eq!(*slot, 3);
            assert_eq!(outgoing, "p4");
            assert_eq!(incoming.id, "p8");
        }
        other => panic!("unexpected op {other:?}"),
    }
}

#[test]
fn roster_construction_rules() {
    let mut dup = team();
    dup[1].id = "p1".to_string();
    assert_eq!(
        Roster::new(dup),
        Err(ScoutError::DuplicatePlayer("p1".to_string()))
    );
    assert_eq!(Roster::new(Vec::new()), Err(ScoutError::EmptyRoster));

    let cfg = ScoutConfig {
        roster_size: Some(6),
        ..ScoutConfig::default()
    };
    assert!(matches!(
        ScoutSession::new(seven(), team(), &cfg),
        Err(ScoutError::RosterSize {
            expected: 6,
            actual: 7
        })
    ));

    let ordered = Roster::by_position(team().into_iter().take(7).collect()).unwrap();
    let positions: Vec<Position> = ordered.players().iter().map(|p| p.position).collect();
    assert_eq!(
        positions,
        vec![
            Position::Outside,
            Position::Outside,
            Position::Middle,
            Position::Middle,
            Position::Libero,
            Position::Opposite,
            Position::Setter,
        ]
    );
}
