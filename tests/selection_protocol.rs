use volleyscout::{
    action::ActionDraft,
    config::ScoutConfig,
    core::{
        roster::{Player, Roster},
        selection::{SelectionProtocol, SelectionState, Transition},
        session::{ScoutSession, TapOutcome},
    },
    error::ScoutError,
    types::{ActionType, GenericEvent, Position, Quality},
};

fn player(id: &str) -> Player {
    Player::new(id, format!("Surname {id}"), 1, Position::Outside)
}

fn session() -> ScoutSession {
    let roster = Roster::new(vec![player("a"), player("b")]).unwrap();
    ScoutSession::new(roster, Vec::new(), &ScoutConfig::default()).unwrap()
}

#[test]
fn player_then_action_commits_one_draft() {
    let mut proto = SelectionProtocol::new();
    assert_eq!(proto.on_player_tap(&player("a")), Transition::Selected);
    assert_eq!(proto.state().player_id(), Some("a"));

    let t = proto.on_action_tap(ActionType::Attack, Quality::GOOD);
    assert_eq!(
        t,
        Transition::Committed(ActionDraft::skill("a", ActionType::Attack, Quality::GOOD))
    );
    assert!(proto.state().is_idle());
}

#[test]
fn action_then_player_commits_one_draft() {
    let mut proto = SelectionProtocol::new();
    assert_eq!(
        proto.on_action_tap(ActionType::Block, Quality::PERFECT),
        Transition::Selected
    );
    assert_eq!(
        proto.state(),
        &SelectionState::ActionPicked {
            action: ActionType::Block,
            quality: Quality::PERFECT,
        }
    );

    let t = proto.on_player_tap(&player("b"));
    assert_eq!(
        t,
        Transition::Committed(ActionDraft::skill("b", ActionType::Block, Quality::PERFECT))
    );
    assert!(proto.state().is_idle());
}

#[test]
fn both_orders_yield_identical_records_and_scores() {
    for action in ActionType::SKILLS {
        for quality in Quality::ALL {
            let mut player_first = session();
            player_first.on_player_tap("a").unwrap();
            let left = player_first.on_action_tap(action, quality).unwrap();

            let mut action_first = session();
            action_first.on_action_tap(action, quality).unwrap();
            let right = action_first.on_player_tap("a").unwrap();

            assert_eq!(left, right);
            assert!(matches!(left, TapOutcome::Recorded(_)));
            assert_eq!(player_first.current_score(), action_first.current_score());
        }
    }
}

#[test]
fn same_player_twice_cancels_without_emitting() {
    let mut s = session();
    assert!(matches!(s.on_player_tap("a").unwrap(), TapOutcome::Selected(_)));
    assert_eq!(s.on_player_tap("a").unwrap(), TapOutcome::Cancelled);
    assert!(s.current_selection_state().is_idle());
    assert!(s.current_log().is_empty());
    assert!(s.drain_pending_ops().is_empty());
}

#[test]
fn same_action_and_quality_twice_cancels() {
    let mut s = session();
    s.on_action_tap(ActionType::Serve, Quality::POOR).unwrap();
    assert_eq!(
        s.on_action_tap(ActionType::Serve, Quality::POOR).unwrap(),
        TapOutcome::Cancelled
    );
    assert!(s.current_selection_state().is_idle());
    assert!(s.current_log().is_empty());
}

#[test]
fn different_pick_of_same_kind_replaces() {
    let mut proto = SelectionProtocol::new();
    proto.on_player_tap(&player("a"));
    assert_eq!(proto.on_player_tap(&player("b")), Transition::Selected);
    assert_eq!(proto.state().player_id(), Some("b"));

    let mut proto = SelectionProtocol::new();
    proto.on_action_tap(ActionType::Serve, Quality::POOR);
    assert_eq!(
        proto.on_action_tap(ActionType::Serve, Quality::GOOD),
        Transition::Selected
    );
    assert_eq!(
        proto.on_action_tap(ActionType::Pass, Quality::GOOD),
        Transition::Selected
    );
    assert_eq!(
        proto.state(),
        &SelectionState::ActionPicked {
            action: ActionType::Pass,
            quality: Quality::GOOD,
        }
    );
}

#[test]
fn generic_tap_clears_half_selection() {
    let mut s = session();
    s.on_player_tap("a").unwrap();
    s.on_generic_score_tap(GenericEvent::OpponentPoint).unwrap();
    assert!(s.current_selection_state().is_idle());
    assert_eq!(s.current_log().len(), 1);
}

#[test]
fn unknown_player_and_generic_action_tap_are_rejected() {
    let mut s = session();
    s.on_action_tap(ActionType::Dig, Quality::GOOD).unwrap();
    assert_eq!(
        s.on_player_tap("nobody"),
        Err(ScoutError::PlayerNotFound("nobody".to_string()))
    );
    assert!(matches!(
        s.current_selection_state(),
        SelectionState::ActionPicked { .. }
    ));

    assert!(matches!(
        s.on_action_tap(ActionType::OpponentError, Quality::PERFECT),
        Err(ScoutError::InvalidActionRecord(_))
    ));
    assert!(s.current_log().is_empty());
}

#[test]
fn explicit_cancel_reports_whether_anything_was_held() {
    let mut s = session();
    assert!(!s.cancel_selection());
    s.on_player_tap("b").unwrap();
    assert!(s.cancel_selection());
    assert!(s.current_selection_state().is_idle());
}
