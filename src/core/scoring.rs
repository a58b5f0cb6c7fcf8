use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::types::{ActionType, Quality, ScoreDelta};

/// Maps an action to the side it scores for. Must be total and side-effect free.
pub trait ScoringPolicy: Send + Sync + 'static {
    /// Classifies one action. `quality` is `None` for team-level events.
    fn classify(&self, action: ActionType, quality: Option<Quality>) -> ScoreDelta;
}

/// One `(skill, quality) -> delta` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    /// Skill action.
    pub action: ActionType,
    /// Rating the rule applies to.
    pub quality: Quality,
    /// Resulting score change.
    pub delta: ScoreDelta,
}

/// Table-driven scoring for skill actions.
///
/// Team-level events are not table-driven: an opponent error is always our point and an
/// opponent point is always theirs. Skill pairs missing from the table never score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ScoringRule>", into = "Vec<ScoringRule>")]
pub struct ScoringTable {
    rules: HashMap<(ActionType, Quality), ScoreDelta>,
}

impl ScoringTable {
    /// Table with no skill rules: only team-level events score.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Adds or replaces a rule. Rules for team-level events are ignored.
    pub fn with_rule(mut self, action: ActionType, quality: Quality, delta: ScoreDelta) -> Self {
        self.set_rule(action, quality, delta);
        self
    }

    /// Adds or replaces a rule in place.
    pub fn set_rule(&mut self, action: ActionType, quality: Quality, delta: ScoreDelta) {
        if action.is_generic() {
            return;
        }
        if delta == ScoreDelta::None {
            self.rules.remove(&(action, quality));
        } else {
            self.rules.insert((action, quality), delta);
        }
    }

    /// Rules sorted for stable serialization.
    pub fn rules(&self) -> Vec<ScoringRule> {
        let mut out: Vec<ScoringRule> = self
            .rules
            .iter()
            .map(|(&(action, quality), &delta)| ScoringRule {
                action,
                quality,
                delta,
            })
            .collect();
        out.sort_by_key(|r| (r.action as u8, r.quality));
        out
    }
}

impl Default for ScoringTable {
    /// Perfect attack, block or serve wins the point; any error concedes it.
    fn default() -> Self {
        let mut table = Self::empty();
        for skill in ActionType::SKILLS {
            table.set_rule(skill, Quality::ERROR, ScoreDelta::Opponent);
        }
        for skill in [ActionType::Attack, ActionType::Block, ActionType::Serve] {
            table.set_rule(skill, Quality::PERFECT, ScoreDelta::Us);
        }
        table
    }
}

impl ScoringPolicy for ScoringTable {
    fn classify(&self, action: ActionType, quality: Option<Quality>) -> ScoreDelta {
        match action {
            ActionType::OpponentError => ScoreDelta::Us,
            ActionType::OpponentPoint => ScoreDelta::Opponent,
            skill => quality
                .and_then(|q| self.rules.get(&(skill, q)).copied())
                .unwrap_or(ScoreDelta::None),
        }
    }
}

impl From<Vec<ScoringRule>> for ScoringTable {
    fn from(value: Vec<ScoringRule>) -> Self {
        let mut table = Self::empty();
        for rule in value {
            table.set_rule(rule.action, rule.quality, rule.delta);
        }
        table
    }
}

impl From<ScoringTable> for Vec<ScoringRule> {
    fn from(value: ScoringTable) -> Self {
        value.rules()
    }
}
