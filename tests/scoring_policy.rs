use std::io::Write;

use volleyscout::{
    config::{ConfigError, ScoutConfig},
    core::{
        roster::{Player, Roster},
        scoring::{ScoringPolicy, ScoringTable},
        session::ScoutSession,
    },
    types::{ActionType, GenericEvent, Position, Quality, ScoreDelta},
};

#[test]
fn default_table_matches_point_rules() {
    let table = ScoringTable::default();
    for skill in ActionType::SKILLS {
        for quality in Quality::ALL {
            let expected = match (skill, quality) {
                (_, Quality::ERROR) => ScoreDelta::Opponent,
                (ActionType::Attack | ActionType::Block | ActionType::Serve, Quality::PERFECT) => {
                    ScoreDelta::Us
                }
                _ => ScoreDelta::None,
            };
            assert_eq!(
                table.classify(skill, Some(quality)),
                expected,
                "{skill} at {}",
                quality.value()
            );
        }
    }
}

#[test]
fn team_events_ignore_the_table() {
    let empty = ScoringTable::empty().with_rule(
        ActionType::OpponentError,
        Quality::PERFECT,
        ScoreDelta::Opponent,
    );
    assert!(empty.rules().is_empty());
    assert_eq!(empty.classify(ActionType::OpponentError, None), ScoreDelta::Us);
    assert_eq!(
        empty.classify(ActionType::OpponentPoint, None),
        ScoreDelta::Opponent
    );
    assert_eq!(
        empty.classify(ActionType::Attack, Some(Quality::PERFECT)),
        ScoreDelta::None
    );
    assert_eq!(empty.classify(ActionType::Attack, None), ScoreDelta::None);
}

#[test]
fn set_rule_with_none_removes_entry() {
    let mut table = ScoringTable::default();
    let before = table.rules().len();
    table.set_rule(ActionType::Set, Quality::ERROR, ScoreDelta::None);
    assert_eq!(table.rules().len(), before - 1);
    assert_eq!(
        table.classify(ActionType::Set, Some(Quality::ERROR)),
        ScoreDelta::None
    );
}

#[test]
fn config_table_survives_json_roundtrip() {
    let cfg = ScoutConfig::default();
    let text = serde_json::to_string(&cfg).unwrap();
    assert_eq!(ScoutConfig::from_json_str(&text).unwrap(), cfg);
}

#[test]
fn custom_table_from_config_drives_session() {
    let json = r#"{
        "scoring": [
            { "action": "Dig", "quality": 3, "delta": "Us" },
            { "action": "Serve", "quality": 0, "delta": "Opponent" }
        ],
        "cancel_selection_on_substitution": false
    }"#;
    let cfg = ScoutConfig::from_json_str(json).unwrap();
    assert!(!cfg.cancel_selection_on_substitution);
    assert_eq!(cfg.scoring.rules().len(), 2);

    let roster = Roster::new(vec![Player::new("a", "Alves", 4, Position::Libero)]).unwrap();
    let mut s = ScoutSession::new(roster, Vec::new(), &cfg).unwrap();

    s.on_player_tap("a").unwrap();
    s.on_action_tap(ActionType::Dig, Quality::PERFECT).unwrap();
    assert_eq!(s.current_score().as_pair(), (1, 0));

    s.on_player_tap("a").unwrap();
    s.on_action_tap(ActionType::Attack, Quality::PERFECT).unwrap();
    assert_eq!(s.current_score().as_pair(), (1, 0));

    s.on_generic_score_tap(GenericEvent::OpponentPoint).unwrap();
    assert_eq!(s.current_score().as_pair(), (1, 1));
}

#[test]
fn config_errors_are_typed() {
    assert!(matches!(
        ScoutConfig::from_json_str("{ not json"),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        ScoutConfig::from_json_str(r#"{ "roster_size": 0 }"#),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        ScoutConfig::from_json_str(r#"{ "scoring": [{ "action": "Dig", "quality": 9, "delta": "Us" }] }"#),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        ScoutConfig::from_json_path("/definitely/not/here.json"),
        Err(ConfigError::Io(_))
    ));
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "roster_size": 7 }}"#).unwrap();
    let cfg = ScoutConfig::from_json_path(file.path()).unwrap();
    assert_eq!(cfg.roster_size, Some(7));
    assert_eq!(cfg.scoring, ScoringTable::default());
}
