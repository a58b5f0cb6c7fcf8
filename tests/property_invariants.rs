use proptest::prelude::*;

use volleyscout::{
    config::ScoutConfig,
    core::{
        roster::{Player, Roster},
        score::Score,
        session::ScoutSession,
    },
    op::StoredOp,
    types::{ActionType, GenericEvent, Position, Quality},
};

#[derive(Debug, Clone)]
enum Input {
    PlayerTap { idx: u8 },
    ActionTap { skill: u8, quality: u8 },
    Generic { opponent_error: bool },
    Undo,
    Substitute { out_idx: u8, in_idx: u8 },
    Cancel,
    NextSet,
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        6 => (0u8..9).prop_map(|idx| Input::PlayerTap { idx }),
        6 => (0u8..6, 0u8..4).prop_map(|(skill, quality)| Input::ActionTap { skill, quality }),
        3 => any::<bool>().prop_map(|opponent_error| Input::Generic { opponent_error }),
        3 => Just(Input::Undo),
        1 => (0u8..9, 0u8..9).prop_map(|(out_idx, in_idx)| Input::Substitute { out_idx, in_idx }),
        1 => Just(Input::Cancel),
        1 => Just(Input::NextSet),
    ]
}

fn team() -> Vec<Player> {
    (0..9)
        .map(|i| Player::new(format!("p{i}"), format!("Player{i}"), i as u16, Position::Outside))
        .collect()
}

fn starting_roster() -> Roster {
    Roster::new(team().into_iter().take(6).collect()).unwrap()
}

fn fresh() -> ScoutSession {
    ScoutSession::new(starting_roster(), team(), &ScoutConfig::default()).unwrap()
}

fn apply(session: &mut ScoutSession, input: &Input) {
    // Rejected inputs are part of the sequence; they must leave state untouched.
    let _ = match *input {
        Input::PlayerTap { idx } => session.on_player_tap(&format!("p{idx}")).map(|_| ()),
        Input::ActionTap { skill, quality } => session
            .on_action_tap(
                ActionType::SKILLS[usize::from(skill)],
                Quality::new(quality).unwrap(),
            )
            .map(|_| ()),
        Input::Generic { opponent_error } => {
            let event = if opponent_error {
                GenericEvent::OpponentError
            } else {
                GenericEvent::OpponentPoint
            };
            session.on_generic_score_tap(event).map(|_| ())
        }
        Input::Undo => session.on_undo().map(|_| ()),
        Input::Substitute { out_idx, in_idx } => session
            .on_substitute(&format!("p{out_idx}"), &format!("p{in_idx}"))
            .map(|_| ()),
        Input::Cancel => {
            session.cancel_selection();
            Ok(())
        }
        Input::NextSet => session.start_next_set().map(|_| ()),
    };
}

proptest! {
    #[test]
    fn score_is_always_fold_of_log(inputs in prop::collection::vec(input_strategy(), 1..200)) {
        let mut session = fresh();
        for input in &inputs {
            let log_before = session.current_log().to_vec();
            apply(&mut session, input);

            prop_assert_eq!(session.current_score(), Score::fold(session.current_log()));

            let log_len = session.current_log().len();
            let grew = log_len == log_before.len() + 1;
            let shrank = log_len + 1 == log_before.len();
            let same = session.current_log() == log_before.as_slice();
            let cleared = matches!(input, Input::NextSet) && log_len == 0;
            prop_assert!(grew || shrank || same || cleared);
            if grew {
                prop_assert_eq!(&session.current_log()[..log_before.len()], log_before.as_slice());
            }
            if shrank {
                prop_assert_eq!(session.current_log(), &log_before[..log_len]);
            }

            let roster = session.current_roster();
            prop_assert_eq!(roster.len(), 6);
            for (i, p) in roster.players().iter().enumerate() {
                prop_assert!(roster.players()[i + 1..].iter().all(|q| q.id != p.id));
            }
        }
    }

    #[test]
    fn undoing_everything_returns_to_zero(inputs in prop::collection::vec(input_strategy(), 1..120)) {
        let mut session = fresh();
        for input in inputs.iter().filter(|i| !matches!(i, Input::NextSet)) {
            apply(&mut session, input);
        }
        while session.on_undo().is_ok() {}
        prop_assert!(session.current_log().is_empty());
        prop_assert_eq!(session.current_score(), Score::default());
    }

    #[test]
    fn replaying_journal_reproduces_session(inputs in prop::collection::vec(input_strategy(), 1..150)) {
        let mut session = fresh();
        let mut journal: Vec<StoredOp> = Vec::new();
        for input in &inputs {
            apply(&mut session, input);
            journal.extend(session.drain_pending_ops());
        }

        let seqs: Vec<u64> = journal.iter().map(|o| o.seq).collect();
        let expected: Vec<u64> = (1..=journal.len() as u64).collect();
        prop_assert_eq!(seqs, expected);

        let replayed = ScoutSession::replay(starting_roster(), team(), &ScoutConfig::default(), journal).unwrap();
        prop_assert_eq!(replayed.current_log(), session.current_log());
        prop_assert_eq!(replayed.current_score(), session.current_score());
        prop_assert_eq!(replayed.current_roster(), session.current_roster());
        prop_assert_eq!(replayed.set_number(), session.set_number());
        prop_assert_eq!(replayed.latest_op_seq(), session.latest_op_seq());
        prop_assert!(replayed.current_selection_state().is_idle());
    }
}
