use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    action::{ActionDraft, ActionRecord},
    config::ScoutConfig,
    error::{ScoutError, ScoutResult},
    op::{Op, StoredOp},
    types::{ActionType, GenericEvent, OpSeq, Quality, SetNumber},
};

use super::{
    log::ActionLog,
    roster::{Player, Roster},
    score::Score,
    scoring::{ScoringPolicy, ScoringTable},
    selection::{SelectionProtocol, SelectionState, Transition},
    substitution,
};

/// Immutable copy of one set, handed to persistence and aggregators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSnapshot {
    /// One-based set number.
    pub set_number: SetNumber,
    /// Score at snapshot time.
    pub score: Score,
    /// Log at snapshot time, in append order.
    pub actions: Vec<ActionRecord>,
}

/// Whether the session still accepts input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Sets are being recorded.
    InProgress,
    /// `finalize_match` was called; the session is read-only.
    Finalized,
}

/// What a tap did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// A half-selection is now held.
    Selected(SelectionState),
    /// The repeat tap cleared the half-selection.
    Cancelled,
    /// The selection completed and this record was logged.
    Recorded(ActionRecord),
}

/// Live scouting engine for one match: roster, selection, current-set log and score.
///
/// All mutation goes through the `on_*` inputs and the set lifecycle calls. Each successful
/// mutation is also journaled; see [`ScoutSession::drain_pending_ops`].
#[derive(Debug)]
pub struct ScoutSession<P: ScoringPolicy = ScoringTable> {
    policy: P,
    cancel_selection_on_substitution: bool,
    roster: Roster,
    team: Vec<Player>,
    selection: SelectionProtocol,
    log: ActionLog,
    set_number: SetNumber,
    phase: MatchPhase,
    pending_ops: Vec<StoredOp>,
    next_op_seq: OpSeq,
}

impl ScoutSession<ScoringTable> {
    /// Session scored by `config.scoring`. `team` is the full team the bench is drawn from.
    pub fn new(roster: Roster, team: Vec<Player>, config: &ScoutConfig) -> ScoutResult<Self> {
        Self::with_policy(roster, team, config, config.scoring.clone())
    }

    /// Rebuilds a session from a journal, starting at set 1 with `roster`.
    pub fn replay(
        roster: Roster,
        team: Vec<Player>,
        config: &ScoutConfig,
        ops: impl IntoIterator<Item = StoredOp>,
    ) -> ScoutResult<Self> {
        let mut session = Self::new(roster, team, config)?;
        for stored in ops {
            session.apply_replayed_op(stored)?;
        }
        Ok(session)
    }
}

impl<P: ScoringPolicy> ScoutSession<P> {
    /// Session with a custom scoring policy; `config.scoring` is ignored.
    pub fn with_policy(
        roster: Roster,
        team: Vec<Player>,
        config: &ScoutConfig,
        policy: P,
    ) -> ScoutResult<Self> {
        if let Some(expected) = config.roster_size {
            if roster.len() != expected {
                return Err(ScoutError::RosterSize {
                    expected,
                    actual: roster.len(),
                });
            }
        }

        Ok(Self {
            policy,
            cancel_selection_on_substitution: config.cancel_selection_on_substitution,
            roster,
            team,
            selection: SelectionProtocol::new(),
            log: ActionLog::new(),
            set_number: 1,
            phase: MatchPhase::InProgress,
            pending_ops: Vec::new(),
            next_op_seq: 1,
        })
    }

    /// Player tap. The player must be on court.
    pub fn on_player_tap(&mut self, player_id: &str) -> ScoutResult<TapOutcome> {
        self.ensure_in_progress()?;
        let Some(player) = self.roster.get(player_id).cloned() else {
            warn!(player = player_id, "tap on player not in roster");
            return Err(ScoutError::PlayerNotFound(player_id.to_string()));
        };
        let transition = self.selection.on_player_tap(&player);
        self.finish_transition(transition)
    }

    /// Skill button tap. Team-level events go through [`Self::on_generic_score_tap`].
    pub fn on_action_tap(&mut self, action: ActionType, quality: Quality) -> ScoutResult<TapOutcome> {
        self.ensure_in_progress()?;
        if action.is_generic() {
            return Err(ScoutError::InvalidActionRecord(format!(
                "{action} is not a skill action"
            )));
        }
        let transition = self.selection.on_action_tap(action, quality);
        self.finish_transition(transition)
    }

    /// Opponent point / opponent error button. Clears any half-selection.
    pub fn on_generic_score_tap(&mut self, event: GenericEvent) -> ScoutResult<ActionRecord> {
        self.ensure_in_progress()?;
        self.selection.cancel();
        self.record(ActionDraft::generic(event.into()))
    }

    /// Removes the last record and rolls back its score change.
    pub fn on_undo(&mut self) -> ScoutResult<ActionRecord> {
        self.ensure_in_progress()?;
        let set = self.set_number;
        let record = self
            .log
            .undo_last()
            .inspect_err(|_| warn!(set, "undo on empty log"))?;
        debug!(action = %record.action, delta = ?record.delta, "undo");
        self.journal(Op::Undo {
            record: record.clone(),
        });
        Ok(record)
    }

    /// Replaces an on-court player with a bench player, keeping the slot.
    ///
    /// Historical records keep the outgoing id. Returns the slot index.
    pub fn on_substitute(&mut self, outgoing_id: &str, incoming_id: &str) -> ScoutResult<usize> {
        self.ensure_in_progress()?;
        let (roster, slot) =
            substitution::substitute(&self.roster, &self.team, outgoing_id, incoming_id)
                .inspect_err(|err| warn!(%err, "substitution rejected"))?;

        if self.cancel_selection_on_substitution
            || self.selection.state().player_id() == Some(outgoing_id)
        {
            self.selection.cancel();
        }

        let incoming = roster.players()[slot].clone();
        self.roster = roster;
        self.journal(Op::Substitute {
            slot,
            outgoing: outgoing_id.to_string(),
            incoming,
        });
        Ok(slot)
    }

    /// Explicitly clears a half-selection. Returns true if one was held.
    pub fn cancel_selection(&mut self) -> bool {
        self.selection.cancel()
    }

    /// Bench players eligible to come on.
    pub fn eligible_incoming(&self) -> Vec<Player> {
        substitution::eligible_incoming(&self.roster, &self.team)
    }

    /// Current set score.
    pub fn current_score(&self) -> Score {
        self.log.score()
    }

    /// Current set log in append order.
    pub fn current_log(&self) -> &[ActionRecord] {
        self.log.records()
    }

    /// Underlying log, for read-only queries.
    pub fn action_log(&self) -> &ActionLog {
        &self.log
    }

    /// On-court roster.
    pub fn current_roster(&self) -> &Roster {
        &self.roster
    }

    /// Full team the bench is drawn from.
    pub fn team(&self) -> &[Player] {
        &self.team
    }

    /// Half-selection state.
    pub fn current_selection_state(&self) -> &SelectionState {
        self.selection.state()
    }

    /// Set in progress.
    pub fn set_number(&self) -> SetNumber {
        self.set_number
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Scoring policy in use.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Copy of the current set for persistence.
    pub fn set_snapshot(&self) -> SetSnapshot {
        SetSnapshot {
            set_number: self.set_number,
            score: self.log.score(),
            actions: self.log.snapshot(),
        }
    }

    /// Clears log and score and advances the set counter.
    ///
    /// Call only once the returned set has been saved or deliberately discarded.
    pub fn start_next_set(&mut self) -> ScoutResult<SetSnapshot> {
        self.ensure_in_progress()?;
        let finished = self.set_snapshot();
        self.selection.cancel();
        self.log.clear();
        self.set_number += 1;
        info!(
            finished = finished.set_number,
            ours = finished.score.ours,
            opponent = finished.score.opponent,
            "next set"
        );
        self.journal(Op::NextSet {
            set_number: self.set_number,
        });
        Ok(finished)
    }

    /// Closes the match. The last set stays readable; all further input fails.
    pub fn finalize_match(&mut self) -> ScoutResult<SetSnapshot> {
        self.ensure_in_progress()?;
        self.selection.cancel();
        self.phase = MatchPhase::Finalized;
        info!(sets = self.set_number, "match finalized");
        self.journal(Op::Finalize);
        Ok(self.set_snapshot())
    }

    /// Takes journal entries produced since the last drain.
    pub fn drain_pending_ops(&mut self) -> Vec<StoredOp> {
        std::mem::take(&mut self.pending_ops)
    }

    /// Sequence of the most recent journal entry, 0 if none.
    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    /// Applies a journaled op without reclassifying; stored deltas are authoritative.
    pub fn apply_replayed_op(&mut self, stored: StoredOp) -> ScoutResult<()> {
        let seq = stored.seq;
        let mismatch = ScoutError::ReplayMismatch { seq };
        self.ensure_in_progress()?;

        let same_set = stored.set_number == self.set_number;
        match stored.op {
            Op::NextSet { set_number } if set_number == self.set_number + 1 => {
                self.log.clear();
                self.set_number = set_number;
            }
            Op::Record { record } if same_set => {
                record.validate()?;
                self.log.push(record);
            }
            Op::Undo { record } if same_set => {
                if self.log.last() != Some(&record) {
                    return Err(mismatch);
                }
                self.log.undo_last()?;
            }
            Op::Substitute {
                slot,
                outgoing,
                incoming,
            } if same_set => {
                let on_slot = self.roster.players().get(slot).map(|p| p.id.as_str());
                let from_bench = self.team.iter().any(|p| p.id == incoming.id)
                    && !self.roster.contains(&incoming.id);
                if on_slot != Some(outgoing.as_str()) || !from_bench {
                    return Err(mismatch);
                }
                self.roster = self.roster.with_slot_replaced(slot, incoming);
            }
            Op::Finalize if same_set => self.phase = MatchPhase::Finalized,
            _ => return Err(mismatch),
        }

        self.selection.cancel();
        self.next_op_seq = self.next_op_seq.max(seq.saturating_add(1));
        Ok(())
    }

    fn finish_transition(&mut self, transition: Transition) -> ScoutResult<TapOutcome> {
        match transition {
            Transition::Selected => Ok(TapOutcome::Selected(self.selection.state().clone())),
            Transition::Cancelled => Ok(TapOutcome::Cancelled),
            Transition::Committed(draft) => {
                debug_assert!(draft.validate().is_ok(), "selection built a malformed draft");
                self.record(draft).map(TapOutcome::Recorded)
            }
        }
    }

    fn record(&mut self, draft: ActionDraft) -> ScoutResult<ActionRecord> {
        let record = self.log.append(&self.policy, draft)?.clone();
        let score = self.log.score();
        debug!(
            player = ?record.player_id,
            action = %record.action,
            delta = ?record.delta,
            ours = score.ours,
            opponent = score.opponent,
            "action recorded"
        );
        self.journal(Op::Record {
            record: record.clone(),
        });
        Ok(record)
    }

    fn ensure_in_progress(&self) -> ScoutResult<()> {
        match self.phase {
            MatchPhase::InProgress => Ok(()),
            MatchPhase::Finalized => Err(ScoutError::MatchFinalized),
        }
    }

    fn journal(&mut self, op: Op) {
        let seq = self.next_op_seq;
        self.next_op_seq += 1;
        self.pending_ops.push(StoredOp {
            seq,
            ts_ms: now_ms(),
            set_number: self.set_number,
            op,
        });
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
