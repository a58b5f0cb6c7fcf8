use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{Mutex, broadcast, mpsc, oneshot},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    action::ActionRecord,
    core::{
        roster::{Player, Roster},
        score::Score,
        scoring::ScoringPolicy,
        selection::SelectionState,
        session::{ScoutSession, SetSnapshot, TapOutcome},
    },
    error::ScoutError,
    op::{Op, StoredOp},
    persist::{GameInfo, PersistError, ScoutSink},
    types::{ActionType, GenericEvent, OpSeq, Quality, SetNumber},
};

use super::events::ScoutEvent;

/// Errors returned by [`ScoutHandle`] calls.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The engine rejected the input; its state is unchanged.
    #[error(transparent)]
    Scout(#[from] ScoutError),

    /// The sink or its queue failed.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The runtime task is gone.
    #[error("runtime channel closed")]
    ChannelClosed,
}

/// Runtime tuning.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Flush the journal right after every recorded action.
    pub flush_on_record: bool,
    /// Journal batch size that forces a write.
    pub batch_max_ops: usize,
    /// Longest a journal entry may sit in the buffer.
    pub batch_max_latency_ms: u64,
    /// Bound of the persistence worker queue. When full, inputs wait for room.
    pub persist_queue_bound: usize,
    /// Broadcast buffer for [`ScoutEvent`]s.
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flush_on_record: true,
            batch_max_ops: 32,
            batch_max_latency_ms: 75,
            persist_queue_bound: 64,
            event_capacity: 1024,
        }
    }
}

/// Guard applied before leaving the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextSetMode {
    /// Refuse unless the last confirmed save matches the current set exactly.
    RequireSaved,
    /// Drop the current set without saving.
    Discard,
}

/// Cloneable front end to a running session.
pub struct ScoutHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ScoutEvent>,
}

impl Clone for ScoutHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, RuntimeError>>;

enum Command {
    PlayerTap {
        player_id: String,
        resp: Reply<TapOutcome>,
    },
    ActionTap {
        action: ActionType,
        quality: Quality,
        resp: Reply<TapOutcome>,
    },
    GenericScore {
        event: GenericEvent,
        resp: Reply<ActionRecord>,
    },
    Undo {
        resp: Reply<ActionRecord>,
    },
    Substitute {
        outgoing: String,
        incoming: String,
        resp: Reply<usize>,
    },
    CancelSelection {
        resp: oneshot::Sender<bool>,
    },
    Score {
        resp: oneshot::Sender<Score>,
    },
    Log {
        resp: oneshot::Sender<Vec<ActionRecord>>,
    },
    Roster {
        resp: oneshot::Sender<Roster>,
    },
    Selection {
        resp: oneshot::Sender<SelectionState>,
    },
    Eligible {
        resp: oneshot::Sender<Vec<Player>>,
    },
    Snapshot {
        resp: oneshot::Sender<SetSnapshot>,
    },
    SaveSet {
        game: GameInfo,
        resp: Reply<SetNumber>,
    },
    NextSet {
        mode: NextSetMode,
        resp: Reply<SetSnapshot>,
    },
    Finalize {
        mode: NextSetMode,
        resp: Reply<SetSnapshot>,
    },
    Flush {
        resp: Reply<OpSeq>,
    },
    Shutdown {
        resp: Reply<()>,
    },
}

enum PersistMsg {
    Op(StoredOp),
    SaveSet {
        game: GameInfo,
        snapshot: SetSnapshot,
        resp: Reply<SetNumber>,
    },
    Flush {
        resp: oneshot::Sender<Result<OpSeq, PersistError>>,
    },
    Shutdown {
        resp: oneshot::Sender<Result<(), PersistError>>,
    },
}

enum WorkerReport {
    Durable(OpSeq),
    JournalFailed(String),
    SetSaved {
        snapshot: SetSnapshot,
        result: Result<(), PersistError>,
        resp: Reply<SetNumber>,
    },
}

struct LoopState<P: ScoringPolicy> {
    session: ScoutSession<P>,
    saved: Option<SetSnapshot>,
}

/// Moves `session` onto its own task and returns the handle that feeds it.
///
/// With a sink, journal entries are batched to it in the background and `save_set`
/// resolves once the sink confirms; without one, both succeed immediately in memory.
pub fn spawn_scout<P: ScoringPolicy>(
    session: ScoutSession<P>,
    sink: Option<Box<dyn ScoutSink>>,
    config: RuntimeConfig,
) -> ScoutHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<ScoutEvent>(config.event_capacity.max(1));

    let (persist_tx_opt, mut report_rx) = if let Some(sink) = sink {
        let (persist_tx, persist_rx) = mpsc::channel::<PersistMsg>(config.persist_queue_bound);
        let (report_tx, report_rx) = mpsc::unbounded_channel::<WorkerReport>();
        spawn_persistence_worker(sink, persist_rx, report_tx, config.clone());
        (Some(persist_tx), Some(report_rx))
    } else {
        (None, None)
    };

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut state = LoopState {
            session,
            saved: None,
        };

        loop {
            if let Some(rx) = report_rx.as_mut() {
                let mut worker_gone = false;
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break; };
                        if handle_command(cmd, &mut state, &events_tx_loop, persist_tx_opt.as_ref()).await {
                            break;
                        }
                    }
                    report = rx.recv() => {
                        match report {
                            Some(report) => handle_report(report, &mut state, &events_tx_loop),
                            None => worker_gone = true,
                        }
                    }
                }
                if worker_gone {
                    warn!("persistence worker stopped");
                    report_rx = None;
                }
            } else {
                let Some(cmd) = cmd_rx.recv().await else { break; };
                if handle_command(cmd, &mut state, &events_tx_loop, persist_tx_opt.as_ref()).await {
                    break;
                }
            }
        }
        debug!("scout runtime stopped");
    });

    ScoutHandle { cmd_tx, events_tx }
}

impl ScoutHandle {
    /// Subscribes to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ScoutEvent> {
        self.events_tx.subscribe()
    }

    /// Player tap.
    pub async fn player_tap(&self, player_id: impl Into<String>) -> Result<TapOutcome, RuntimeError> {
        let player_id = player_id.into();
        self.call(|resp| Command::PlayerTap { player_id, resp }).await
    }

    /// Skill button tap.
    pub async fn action_tap(&self, action: ActionType, quality: Quality) -> Result<TapOutcome, RuntimeError> {
        self.call(|resp| Command::ActionTap {
            action,
            quality,
            resp,
        })
        .await
    }

    /// Opponent point / opponent error button.
    pub async fn generic_score_tap(&self, event: GenericEvent) -> Result<ActionRecord, RuntimeError> {
        self.call(|resp| Command::GenericScore { event, resp }).await
    }

    /// Undo the last action.
    pub async fn undo(&self) -> Result<ActionRecord, RuntimeError> {
        self.call(|resp| Command::Undo { resp }).await
    }

    /// Swap an on-court player for a bench player; returns the slot.
    pub async fn substitute(
        &self,
        outgoing: impl Into<String>,
        incoming: impl Into<String>,
    ) -> Result<usize, RuntimeError> {
        let (outgoing, incoming) = (outgoing.into(), incoming.into());
        self.call(|resp| Command::Substitute {
            outgoing,
            incoming,
            resp,
        })
        .await
    }

    /// Clears any half-selection.
    pub async fn cancel_selection(&self) -> Result<bool, RuntimeError> {
        self.query(|resp| Command::CancelSelection { resp }).await
    }

    /// Current score.
    pub async fn score(&self) -> Result<Score, RuntimeError> {
        self.query(|resp| Command::Score { resp }).await
    }

    /// Current set log.
    pub async fn log(&self) -> Result<Vec<ActionRecord>, RuntimeError> {
        self.query(|resp| Command::Log { resp }).await
    }

    /// On-court roster.
    pub async fn roster(&self) -> Result<Roster, RuntimeError> {
        self.query(|resp| Command::Roster { resp }).await
    }

    /// Half-selection state.
    pub async fn selection(&self) -> Result<SelectionState, RuntimeError> {
        self.query(|resp| Command::Selection { resp }).await
    }

    /// Bench players eligible to come on.
    pub async fn eligible_incoming(&self) -> Result<Vec<Player>, RuntimeError> {
        self.query(|resp| Command::Eligible { resp }).await
    }

    /// Copy of the current set.
    pub async fn snapshot(&self) -> Result<SetSnapshot, RuntimeError> {
        self.query(|resp| Command::Snapshot { resp }).await
    }

    /// Saves the current set under `game`. Input keeps flowing while the save runs.
    pub async fn save_set(&self, game: GameInfo) -> Result<SetNumber, RuntimeError> {
        self.call(|resp| Command::SaveSet { game, resp }).await
    }

    /// Starts the next set; returns the set that was closed.
    pub async fn next_set(&self, mode: NextSetMode) -> Result<SetSnapshot, RuntimeError> {
        self.call(|resp| Command::NextSet { mode, resp }).await
    }

    /// Closes the match; returns the last set.
    pub async fn finalize(&self, mode: NextSetMode) -> Result<SetSnapshot, RuntimeError> {
        self.call(|resp| Command::Finalize { mode, resp }).await
    }

    /// Writes buffered journal entries; returns the highest durable sequence.
    pub async fn flush(&self) -> Result<OpSeq, RuntimeError> {
        self.call(|resp| Command::Flush { resp }).await
    }

    /// Flushes and stops the runtime.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }

    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    async fn query<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command<P: ScoringPolicy>(
    cmd: Command,
    state: &mut LoopState<P>,
    events_tx: &broadcast::Sender<ScoutEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> bool {
    match cmd {
        Command::PlayerTap { player_id, resp } => {
            let res = match state.session.on_player_tap(&player_id) {
                Ok(outcome) => Ok(publish_tap(state, outcome, events_tx, persist_tx).await),
                Err(err) => Err(err.into()),
            };
            let _ = resp.send(res);
        }
        Command::ActionTap {
            action,
            quality,
            resp,
        } => {
            let res = match state.session.on_action_tap(action, quality) {
                Ok(outcome) => Ok(publish_tap(state, outcome, events_tx, persist_tx).await),
                Err(err) => Err(err.into()),
            };
            let _ = resp.send(res);
        }
        Command::GenericScore { event, resp } => {
            let res = match state.session.on_generic_score_tap(event) {
                Ok(record) => {
                    publish_ops(&mut state.session, events_tx, persist_tx).await;
                    let _ = events_tx.send(ScoutEvent::ActionRecorded {
                        record: record.clone(),
                        score: state.session.current_score(),
                    });
                    Ok(record)
                }
                Err(err) => Err(err.into()),
            };
            let _ = resp.send(res);
        }
        Command::Undo { resp } => {
            let res = match state.session.on_undo() {
                Ok(record) => {
                    publish_ops(&mut state.session, events_tx, persist_tx).await;
                    let _ = events_tx.send(ScoutEvent::UndoApplied {
                        record: record.clone(),
                        score: state.session.current_score(),
                    });
                    Ok(record)
                }
                Err(err) => Err(err.into()),
            };
            let _ = resp.send(res);
        }
        Command::Substitute {
            outgoing,
            incoming,
            resp,
        } => {
            let res = match state.session.on_substitute(&outgoing, &incoming) {
                Ok(slot) => {
                    publish_ops(&mut state.session, events_tx, persist_tx).await;
                    let _ = events_tx.send(ScoutEvent::Substituted {
                        slot,
                        outgoing,
                        incoming: state.session.current_roster().players()[slot].clone(),
                    });
                    Ok(slot)
                }
                Err(err) => Err(err.into()),
            };
            let _ = resp.send(res);
        }
        Command::CancelSelection { resp } => {
            let cancelled = state.session.cancel_selection();
            if cancelled {
                let _ = events_tx.send(ScoutEvent::SelectionChanged {
                    state: SelectionState::Idle,
                });
            }
            let _ = resp.send(cancelled);
        }
        Command::Score { resp } => {
            let _ = resp.send(state.session.current_score());
        }
        Command::Log { resp } => {
            let _ = resp.send(state.session.action_log().snapshot());
        }
        Command::Roster { resp } => {
            let _ = resp.send(state.session.current_roster().clone());
        }
        Command::Selection { resp } => {
            let _ = resp.send(state.session.current_selection_state().clone());
        }
        Command::Eligible { resp } => {
            let _ = resp.send(state.session.eligible_incoming());
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(state.session.set_snapshot());
        }
        Command::SaveSet { game, resp } => {
            let snapshot = state.session.set_snapshot();
            if snapshot.actions.is_empty() {
                let _ = resp.send(Err(ScoutError::EmptySet(snapshot.set_number).into()));
            } else if let Some(tx) = persist_tx {
                if let Err(err) = tx.send(PersistMsg::SaveSet { game, snapshot, resp }).await {
                    if let PersistMsg::SaveSet { resp, .. } = err.0 {
                        let _ = resp.send(Err(RuntimeError::ChannelClosed));
                    }
                }
            } else {
                let set_number = snapshot.set_number;
                state.saved = Some(snapshot);
                let _ = events_tx.send(ScoutEvent::SetSaved { set_number });
                let _ = resp.send(Ok(set_number));
            }
        }
        Command::NextSet { mode, resp } => {
            let res = next_set(state, mode, events_tx, persist_tx).await;
            let _ = resp.send(res);
        }
        Command::Finalize { mode, resp } => {
            let res = finalize(state, mode, events_tx, persist_tx).await;
            let _ = resp.send(res);
        }
        Command::Flush { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (flush_tx, flush_rx) = oneshot::channel();
                if tx.send(PersistMsg::Flush { resp: flush_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    flush_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(state.session.latest_op_seq())
            };
            let _ = resp.send(out);
        }
        Command::Shutdown { resp } => {
            let out = if let Some(tx) = persist_tx {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(PersistMsg::Shutdown { resp: done_tx }).await.is_err() {
                    Err(RuntimeError::ChannelClosed)
                } else {
                    done_rx
                        .await
                        .map_err(|_| RuntimeError::ChannelClosed)
                        .and_then(|r| r.map_err(RuntimeError::from))
                }
            } else {
                Ok(())
            };
            let _ = resp.send(out);
            return true;
        }
    }

    false
}

fn handle_report<P: ScoringPolicy>(
    report: WorkerReport,
    state: &mut LoopState<P>,
    events_tx: &broadcast::Sender<ScoutEvent>,
) {
    match report {
        WorkerReport::Durable(op_seq) => {
            let _ = events_tx.send(ScoutEvent::DurableUpTo { op_seq });
        }
        WorkerReport::JournalFailed(reason) => {
            let _ = events_tx.send(ScoutEvent::JournalFailed { reason });
        }
        WorkerReport::SetSaved {
            snapshot,
            result,
            resp,
        } => {
            let set_number = snapshot.set_number;
            match result {
                Ok(()) => {
                    info!(set = set_number, "set saved");
                    state.saved = Some(snapshot);
                    let _ = events_tx.send(ScoutEvent::SetSaved { set_number });
                    let _ = resp.send(Ok(set_number));
                }
                Err(err) => {
                    warn!(set = set_number, %err, "set save failed");
                    let _ = events_tx.send(ScoutEvent::SaveFailed {
                        set_number,
                        reason: err.to_string(),
                    });
                    let _ = resp.send(Err(err.into()));
                }
            }
        }
    }
}

async fn publish_tap<P: ScoringPolicy>(
    state: &mut LoopState<P>,
    outcome: TapOutcome,
    events_tx: &broadcast::Sender<ScoutEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> TapOutcome {
    let event = match &outcome {
        TapOutcome::Selected(selection) => ScoutEvent::SelectionChanged {
            state: selection.clone(),
        },
        TapOutcome::Cancelled => ScoutEvent::SelectionChanged {
            state: SelectionState::Idle,
        },
        TapOutcome::Recorded(record) => {
            publish_ops(&mut state.session, events_tx, persist_tx).await;
            ScoutEvent::ActionRecorded {
                record: record.clone(),
                score: state.session.current_score(),
            }
        }
    };
    let _ = events_tx.send(event);
    outcome
}

fn ensure_saved<P: ScoringPolicy>(state: &LoopState<P>, mode: NextSetMode) -> Result<(), RuntimeError> {
    if mode == NextSetMode::Discard {
        return Ok(());
    }
    let current = state.session.set_snapshot();
    if current.actions.is_empty() || state.saved.as_ref() == Some(&current) {
        Ok(())
    } else {
        Err(ScoutError::UnsavedSet(current.set_number).into())
    }
}

async fn next_set<P: ScoringPolicy>(
    state: &mut LoopState<P>,
    mode: NextSetMode,
    events_tx: &broadcast::Sender<ScoutEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> Result<SetSnapshot, RuntimeError> {
    ensure_saved(state, mode)?;
    let finished = state.session.start_next_set()?;
    state.saved = None;
    publish_ops(&mut state.session, events_tx, persist_tx).await;
    let _ = events_tx.send(ScoutEvent::SetStarted {
        set_number: state.session.set_number(),
    });
    Ok(finished)
}

async fn finalize<P: ScoringPolicy>(
    state: &mut LoopState<P>,
    mode: NextSetMode,
    events_tx: &broadcast::Sender<ScoutEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) -> Result<SetSnapshot, RuntimeError> {
    ensure_saved(state, mode)?;
    let last = state.session.finalize_match()?;
    publish_ops(&mut state.session, events_tx, persist_tx).await;
    let _ = events_tx.send(ScoutEvent::MatchFinalized);
    Ok(last)
}

/// Hands freshly journaled ops to the worker. Runs after the session has already
/// changed, so it never fails the caller; a full queue applies backpressure instead.
async fn publish_ops<P: ScoringPolicy>(
    session: &mut ScoutSession<P>,
    events_tx: &broadcast::Sender<ScoutEvent>,
    persist_tx: Option<&mpsc::Sender<PersistMsg>>,
) {
    let ops = session.drain_pending_ops();
    let Some(tx) = persist_tx else {
        let _ = events_tx.send(ScoutEvent::DurableUpTo {
            op_seq: session.latest_op_seq(),
        });
        return;
    };

    let mut ops = ops.into_iter();
    while let Some(stored) = ops.next() {
        let seq = stored.seq;
        if tx.send(PersistMsg::Op(stored)).await.is_err() {
            let lost = 1 + ops.len();
            warn!(seq, lost, "persistence worker gone, ops not journaled");
            let _ = events_tx.send(ScoutEvent::JournalFailed {
                reason: format!("persistence worker stopped; {lost} ops from seq {seq} not journaled"),
            });
            return;
        }
    }
}

fn spawn_persistence_worker(
    sink: Box<dyn ScoutSink>,
    mut rx: mpsc::Receiver<PersistMsg>,
    report_tx: mpsc::UnboundedSender<WorkerReport>,
    config: RuntimeConfig,
) {
    let sink = Arc::new(Mutex::new(sink));
    tokio::spawn(async move {
        let mut buf = Vec::<StoredOp>::new();
        let mut deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
        let mut last_durable: OpSeq = 0;

        loop {
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        let _ = flush_buf(&sink, &mut buf, &mut last_durable, &report_tx, true).await;
                        break;
                    };

                    match msg {
                        PersistMsg::Op(stored) => {
                            let is_record = matches!(stored.op, Op::Record { .. });
                            buf.push(stored);

                            if buf.len() >= config.batch_max_ops || (config.flush_on_record && is_record) {
                                let _ = flush_buf(&sink, &mut buf, &mut last_durable, &report_tx, true).await;
                                deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                            }
                        }
                        PersistMsg::SaveSet { game, snapshot, resp } => {
                            let flush_result = flush_buf(&sink, &mut buf, &mut last_durable, &report_tx, false).await;
                            let result = match flush_result {
                                Err(err) => Err(err),
                                Ok(()) => {
                                    let sink_ref = Arc::clone(&sink);
                                    let to_save = snapshot.clone();
                                    match tokio::task::spawn_blocking(move || {
                                        let mut sink = sink_ref.blocking_lock();
                                        sink.save_set(&game, &to_save)
                                    }).await {
                                        Ok(inner) => inner,
                                        Err(e) => Err(PersistError::Message(format!("join error: {e}"))),
                                    }
                                }
                            };
                            let _ = report_tx.send(WorkerReport::SetSaved { snapshot, result, resp });
                            deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                        }
                        PersistMsg::Flush { resp } => {
                            let result = flush_buf(&sink, &mut buf, &mut last_durable, &report_tx, true).await;
                            let _ = resp.send(result.map(|_| last_durable));
                            deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                        }
                        PersistMsg::Shutdown { resp } => {
                            let result = flush_buf(&sink, &mut buf, &mut last_durable, &report_tx, true).await;
                            let _ = resp.send(result);
                            break;
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline), if !buf.is_empty() => {
                    let _ = flush_buf(&sink, &mut buf, &mut last_durable, &report_tx, false).await;
                    deadline = Instant::now() + Duration::from_millis(config.batch_max_latency_ms);
                }
            }
        }
    });
}

async fn flush_buf(
    sink: &Arc<Mutex<Box<dyn ScoutSink>>>,
    buf: &mut Vec<StoredOp>,
    last_durable: &mut OpSeq,
    report_tx: &mpsc::UnboundedSender<WorkerReport>,
    call_flush: bool,
) -> Result<(), PersistError> {
    if buf.is_empty() {
        if call_flush {
            let sink_ref = Arc::clone(sink);
            tokio::task::spawn_blocking(move || {
                let mut sink = sink_ref.blocking_lock();
                sink.flush()
            })
            .await
            .map_err(|e| PersistError::Message(format!("join error: {e}")))??;
        }
        return Ok(());
    }

    // The batch stays in `buf` until the sink accepts it, so a failed append is retried.
    let batch = buf.clone();
    let sink_ref = Arc::clone(sink);
    let (appended, flushed) = tokio::task::spawn_blocking(move || {
        let mut sink = sink_ref.blocking_lock();
        let appended = sink.append_ops(&batch);
        let flushed = match appended {
            Ok(_) if call_flush => sink.flush(),
            _ => Ok(()),
        };
        (appended, flushed)
    })
    .await
    .map_err(|e| journal_failed(report_tx, buf.len(), PersistError::Message(format!("join error: {e}"))))?;

    let seq = appended.map_err(|err| journal_failed(report_tx, buf.len(), err))?;
    buf.clear();
    *last_durable = (*last_durable).max(seq);
    let _ = report_tx.send(WorkerReport::Durable(*last_durable));
    flushed.map_err(|err| journal_failed(report_tx, 0, err))
}

fn journal_failed(
    report_tx: &mpsc::UnboundedSender<WorkerReport>,
    pending: usize,
    err: PersistError,
) -> PersistError {
    warn!(%err, pending, "journal write failed");
    let _ = report_tx.send(WorkerReport::JournalFailed(err.to_string()));
    err
}
