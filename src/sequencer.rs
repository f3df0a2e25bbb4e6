//! Timer-driven stage sequencer for the scripted walkthrough.
//!
//! The `Sequencer` owns the ordered stage list and drives the current step
//! forward over wall-clock time according to each stage's delay. All timer
//! arm/cancel logic lives here:
//! - at most one pending auto-advance timer exists per sequencer
//! - re-arming always cancels the prior timer
//! - a new `start()` invalidates the previous run's whole timer chain
//!
//! A stage flagged `requires_confirmation` suspends auto-advance at the end
//! of its delay until `confirm()` is called; the rest of the interface
//! stays fully responsive while gated.
//!
//! Must be used from within a Tokio runtime.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::stage::{Stage, StageStatus, ViewId};

/// Position of the sequencer within the stage list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCursor {
    /// No task has been submitted yet
    NotStarted,
    /// The stage at this index is active
    Stage(usize),
    /// All stages exhausted; terminal, never auto-advances again
    Complete,
}

impl StepCursor {
    /// Integer form: -1 before start, 0..n-1 while running, n when complete.
    pub fn index(&self, stage_count: usize) -> i32 {
        match self {
            StepCursor::NotStarted => -1,
            StepCursor::Stage(i) => *i as i32,
            StepCursor::Complete => stage_count as i32,
        }
    }
}

/// Immutable view of the sequencer state, delivered to subscribers on every
/// state change.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerSnapshot {
    /// Integer step cursor: -1, 0..n-1, or n (complete)
    pub step_index: i32,
    /// View currently surfaced in the tool pane
    pub active_view: Option<ViewId>,
    /// Whether auto-advance is suspended at a confirmation gate
    pub waiting_for_confirmation: bool,
    /// Whether the walkthrough has finished
    pub complete: bool,
}

/// Handle returned by [`Sequencer::subscribe`], usable to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Subscriber = Arc<dyn Fn(&SequencerSnapshot) + Send + Sync>;

struct State {
    cursor: StepCursor,
    waiting_for_confirmation: bool,
    active_view: Option<ViewId>,
    task: Option<String>,
    /// Bumped on every `start()`; a timer carrying a stale generation is
    /// ignored when it fires
    generation: u64,
    /// The single pending auto-advance timer, if any
    timer: Option<JoinHandle<()>>,
    run_id: Uuid,
    next_subscriber_id: u64,
    subscribers: Vec<(SubscriberId, Subscriber)>,
}

struct Inner {
    stages: Vec<Stage>,
    state: Mutex<State>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

/// The stage sequencer. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Sequencer {
    inner: Arc<Inner>,
}

impl Sequencer {
    /// Create a sequencer over an immutable stage list.
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                stages,
                state: Mutex::new(State {
                    cursor: StepCursor::NotStarted,
                    waiting_for_confirmation: false,
                    active_view: None,
                    task: None,
                    generation: 0,
                    timer: None,
                    run_id: Uuid::nil(),
                    next_subscriber_id: 0,
                    subscribers: Vec::new(),
                }),
            }),
        }
    }

    /// The stage table this sequencer plays.
    pub fn stages(&self) -> &[Stage] {
        &self.inner.stages
    }

    // A subscriber panic is caught before it can poison the lock, so a
    // poisoned mutex only means a panic inside one of our own short
    // critical sections; recover the data rather than cascading.
    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a new run for the given task description.
    ///
    /// A blank/whitespace-only task is rejected silently: no state changes
    /// and the previous run (if any) keeps playing. Otherwise the previous
    /// run's timer chain is fully cancelled, the cursor resets to stage 0,
    /// the confirmation gate is cleared, and stage 0's auto-advance timer
    /// is armed.
    pub fn start(&self, task: &str) {
        let task = task.trim();
        if task.is_empty() {
            tracing::debug!("ignoring blank task submission");
            return;
        }
        if self.inner.stages.is_empty() {
            tracing::warn!("stage table is empty; nothing to play");
            return;
        }

        let snapshot = {
            let mut state = self.state();
            state.generation += 1;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.run_id = Uuid::new_v4();
            state.cursor = StepCursor::Stage(0);
            state.waiting_for_confirmation = false;
            state.active_view = Some(self.inner.stages[0].view);
            state.task = Some(task.to_string());
            tracing::info!(
                run_id = %state.run_id,
                task,
                "walkthrough started"
            );
            let generation = state.generation;
            state.timer = Some(self.arm(generation, self.inner.stages[0].delay()));
            self.snapshot_locked(&state)
        };
        self.notify(&snapshot);
    }

    /// Resume a sequence suspended at a confirmation gate.
    ///
    /// No-op unless `waiting_for_confirmation` is true. Clears the gate,
    /// moves the cursor to the stage following the gated one (the recovery
    /// stage in the built-in table), and re-arms auto-advance.
    pub fn confirm(&self) {
        let snapshot = {
            let mut state = self.state();
            if !state.waiting_for_confirmation {
                tracing::debug!("confirm() while not gated; ignoring");
                return;
            }
            state.waiting_for_confirmation = false;
            let gate = match state.cursor {
                StepCursor::Stage(i) => i,
                // The gate flag is only ever set while a stage is active
                _ => return,
            };
            tracing::info!(run_id = %state.run_id, stage = gate, "gate confirmed");
            self.advance_locked(&mut state, gate + 1);
            self.snapshot_locked(&state)
        };
        self.notify(&snapshot);
    }

    /// Surface a different tool in the viewer pane without touching the
    /// step cursor or any pending timer. Models a human inspecting another
    /// tool mid-sequence.
    pub fn switch_view(&self, view: ViewId) {
        let snapshot = {
            let mut state = self.state();
            tracing::debug!(view = %view, "manual view switch");
            state.active_view = Some(view);
            self.snapshot_locked(&state)
        };
        self.notify(&snapshot);
    }

    /// Register an observer invoked on every state change with the updated
    /// snapshot. A panicking subscriber is isolated and logged; it never
    /// blocks delivery to the others.
    pub fn subscribe<F>(&self, f: F) -> SubscriberId
    where
        F: Fn(&SequencerSnapshot) + Send + Sync + 'static,
    {
        let mut state = self.state();
        state.next_subscriber_id += 1;
        let id = SubscriberId(state.next_subscriber_id);
        state.subscribers.push((id, Arc::new(f)));
        id
    }

    /// Remove a subscriber. Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut state = self.state();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sid, _)| *sid != id);
        state.subscribers.len() != before
    }

    // ---- accessors ----

    /// Integer step cursor: -1 before start, 0..n-1 while running, n when
    /// complete.
    pub fn current_step_index(&self) -> i32 {
        let state = self.state();
        state.cursor.index(self.inner.stages.len())
    }

    pub fn waiting_for_confirmation(&self) -> bool {
        self.state().waiting_for_confirmation
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.state().active_view
    }

    pub fn task(&self) -> Option<String> {
        self.state().task.clone()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state().cursor, StepCursor::Complete)
    }

    /// Current snapshot, as a subscriber would see it.
    pub fn snapshot(&self) -> SequencerSnapshot {
        let state = self.state();
        self.snapshot_locked(&state)
    }

    /// Lifecycle status of the stage at `index` relative to the cursor.
    pub fn stage_status(&self, index: usize) -> StageStatus {
        let state = self.state();
        match state.cursor {
            StepCursor::NotStarted => StageStatus::Pending,
            StepCursor::Complete => StageStatus::Completed,
            StepCursor::Stage(current) => {
                if index < current {
                    StageStatus::Completed
                } else if index == current {
                    StageStatus::InProgress
                } else {
                    StageStatus::Pending
                }
            }
        }
    }

    // ---- internals ----

    /// Arm the auto-advance timer for the active stage. The spawned task
    /// holds only a weak reference: if the host tears the sequencer down
    /// before the timer fires, the pending transition is simply lost.
    fn arm(&self, generation: u64, delay: Duration) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Sequencer { inner }.tick(generation);
            }
        })
    }

    /// Timer callback: gate or advance.
    fn tick(&self, generation: u64) {
        let snapshot = {
            let mut state = self.state();
            if state.generation != generation {
                tracing::debug!(generation, "stale timer fired; ignoring");
                return;
            }
            state.timer = None;
            let current = match state.cursor {
                StepCursor::Stage(i) => i,
                // No timer is ever armed outside an active stage
                _ => return,
            };
            if self.inner.stages[current].requires_confirmation {
                tracing::info!(
                    run_id = %state.run_id,
                    stage = current,
                    "suspended at confirmation gate"
                );
                state.waiting_for_confirmation = true;
            } else {
                self.advance_locked(&mut state, current + 1);
            }
            self.snapshot_locked(&state)
        };
        self.notify(&snapshot);
    }

    /// Move the cursor to `next`, saturating into the terminal state past
    /// the end of the table. In bounds: update the active view and arm the
    /// next stage's timer. Out of bounds: the view stays where it was and
    /// no timer is armed.
    fn advance_locked(&self, state: &mut State, next: usize) {
        if next < self.inner.stages.len() {
            let stage = &self.inner.stages[next];
            state.cursor = StepCursor::Stage(next);
            state.active_view = Some(stage.view);
            tracing::info!(
                run_id = %state.run_id,
                stage = next,
                view = %stage.view,
                "stage activated"
            );
            let generation = state.generation;
            state.timer = Some(self.arm(generation, stage.delay()));
        } else {
            state.cursor = StepCursor::Complete;
            tracing::info!(run_id = %state.run_id, "walkthrough complete");
        }
    }

    fn snapshot_locked(&self, state: &State) -> SequencerSnapshot {
        SequencerSnapshot {
            step_index: state.cursor.index(self.inner.stages.len()),
            active_view: state.active_view,
            waiting_for_confirmation: state.waiting_for_confirmation,
            complete: matches!(state.cursor, StepCursor::Complete),
        }
    }

    /// Deliver a snapshot to every subscriber, outside the state lock so a
    /// subscriber may call back into accessors.
    fn notify(&self, snapshot: &SequencerSnapshot) {
        let subscribers: Vec<Subscriber> = {
            let state = self.state();
            state.subscribers.iter().map(|(_, s)| s.clone()).collect()
        };
        for subscriber in subscribers {
            if catch_unwind(AssertUnwindSafe(|| subscriber(snapshot))).is_err() {
                tracing::warn!("sequencer subscriber panicked; continuing delivery");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::default_stages;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sequencer() -> Sequencer {
        Sequencer::new(default_stages())
    }

    /// Let woken timer tasks run to completion on the paused runtime.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    /// Sleep on the paused clock. Auto-advance walks timer by timer, so
    /// chained arm-on-fire timers land at their real deadlines.
    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        settle().await;
    }

    // =========================================
    // start() semantics
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_not_started_state() {
        let seq = sequencer();
        assert_eq!(seq.current_step_index(), -1);
        assert_eq!(seq.active_view(), None);
        assert!(!seq.waiting_for_confirmation());
        assert!(seq.task().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_task_is_rejected_silently() {
        let seq = sequencer();
        seq.start("   ");
        assert_eq!(seq.current_step_index(), -1);
        assert_eq!(seq.active_view(), None);

        seq.start("");
        assert_eq!(seq.current_step_index(), -1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_trims_and_activates_stage_zero() {
        let seq = sequencer();
        seq.start("  交换机故障排查  ");
        assert_eq!(seq.current_step_index(), 0);
        assert_eq!(seq.active_view(), Some(ViewId::Plan));
        assert_eq!(seq.task().as_deref(), Some("交换机故障排查"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_task_does_not_disturb_running_sequence() {
        let seq = sequencer();
        seq.start("交换机故障排查");
        advance_ms(5000).await;
        assert_eq!(seq.current_step_index(), 1);

        seq.start("   ");
        assert_eq!(seq.current_step_index(), 1);
        // Stage 1's timer still fires on its original schedule
        advance_ms(3000).await;
        assert_eq!(seq.current_step_index(), 2);
    }

    // =========================================
    // Auto-advance progression
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_cumulative_delay_progression() {
        let seq = sequencer();
        seq.start("交换机故障排查");

        // Delays: 5000, 3000, 3000 up to the gate
        advance_ms(4999).await;
        assert_eq!(seq.current_step_index(), 0);
        advance_ms(1).await;
        assert_eq!(seq.current_step_index(), 1);
        assert_eq!(seq.active_view(), Some(ViewId::Topology));

        advance_ms(3000).await;
        assert_eq!(seq.current_step_index(), 2);
        assert_eq!(seq.active_view(), Some(ViewId::Alerts));

        advance_ms(3000).await;
        assert_eq!(seq.current_step_index(), 3);
        assert_eq!(seq.active_view(), Some(ViewId::Analysis));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_state_saturates() {
        let seq = sequencer();
        seq.start("交换机故障排查");

        // Up to the gate at stage 3
        advance_ms(5000 + 3000 + 3000 + 3000).await;
        assert!(seq.waiting_for_confirmation());
        seq.confirm();

        // Recovery (8000) then verification (3000)
        advance_ms(8000).await;
        assert_eq!(seq.current_step_index(), 5);
        advance_ms(3000).await;
        assert_eq!(seq.current_step_index(), 6);
        assert!(seq.is_complete());
        // The view stays at the last stage's view
        assert_eq!(seq.active_view(), Some(ViewId::Verification));

        // Terminal: nothing ever fires again
        advance_ms(60_000).await;
        assert_eq!(seq.current_step_index(), 6);
    }

    // =========================================
    // Confirmation gate
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_gate_suspends_auto_advance() {
        let seq = sequencer();
        seq.start("交换机故障排查");
        advance_ms(5000 + 3000 + 3000).await;
        assert_eq!(seq.current_step_index(), 3);
        assert!(!seq.waiting_for_confirmation());

        advance_ms(3000).await;
        assert!(seq.waiting_for_confirmation());
        assert_eq!(seq.current_step_index(), 3);

        // No further auto-advance while gated
        advance_ms(120_000).await;
        assert_eq!(seq.current_step_index(), 3);
        assert!(seq.waiting_for_confirmation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_resumes_at_recovery() {
        let seq = sequencer();
        seq.start("交换机故障排查");
        advance_ms(5000 + 3000 + 3000 + 3000).await;
        assert!(seq.waiting_for_confirmation());

        seq.confirm();
        assert!(!seq.waiting_for_confirmation());
        assert_eq!(seq.current_step_index(), 4);
        assert_eq!(seq.active_view(), Some(ViewId::Recovery));

        // Auto-advance re-armed with the recovery stage's delay
        advance_ms(8000).await;
        assert_eq!(seq.current_step_index(), 5);
        assert_eq!(seq.active_view(), Some(ViewId::Verification));
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_is_a_noop_when_not_gated() {
        let seq = sequencer();

        seq.confirm();
        assert_eq!(seq.current_step_index(), -1);

        seq.start("交换机故障排查");
        let before = seq.snapshot();
        seq.confirm();
        assert_eq!(seq.snapshot(), before);

        // The pending timer was not disturbed
        advance_ms(5000).await;
        assert_eq!(seq.current_step_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_noop_does_not_notify() {
        let seq = sequencer();
        seq.start("交换机故障排查");

        let notifications = Arc::new(AtomicUsize::new(0));
        let seen = notifications.clone();
        seq.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        seq.confirm();
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    // =========================================
    // Manual view switch
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_switch_view_leaves_cursor_and_timer_alone() {
        let seq = sequencer();
        seq.start("交换机故障排查");
        advance_ms(5000).await;
        assert_eq!(seq.current_step_index(), 1);

        seq.switch_view(ViewId::Alerts);
        assert_eq!(seq.active_view(), Some(ViewId::Alerts));
        assert_eq!(seq.current_step_index(), 1);

        // The stage-1 timer still fires on schedule and re-asserts the
        // stage-implied view
        advance_ms(3000).await;
        assert_eq!(seq.current_step_index(), 2);
        assert_eq!(seq.active_view(), Some(ViewId::Alerts));
    }

    // =========================================
    // Re-entrancy and cancellation
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_timer_chain() {
        let seq = sequencer();
        seq.start("第一次排查");
        advance_ms(2000).await;

        // Restart mid-flight; the first chain's pending transition at
        // t=5000 must never fire
        seq.start("第二次排查");
        assert_eq!(seq.current_step_index(), 0);

        advance_ms(3000).await;
        // 5000ms since the first start: still on stage 0 of the new run
        assert_eq!(seq.current_step_index(), 0);
        advance_ms(2000).await;
        // 5000ms since the second start: exactly one advance
        assert_eq!(seq.current_step_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_while_gated_resets_gate() {
        let seq = sequencer();
        seq.start("交换机故障排查");
        advance_ms(5000 + 3000 + 3000 + 3000).await;
        assert!(seq.waiting_for_confirmation());

        // New task while gated: full cancel-and-reset
        seq.start("服务器宕机排查");
        assert!(!seq.waiting_for_confirmation());
        assert_eq!(seq.current_step_index(), 0);
        assert_eq!(seq.active_view(), Some(ViewId::Plan));

        advance_ms(5000).await;
        assert_eq!(seq.current_step_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_repeated_start_yields_one_timer_chain() {
        let seq = sequencer();
        seq.start("a");
        seq.start("b");
        seq.start("c");
        assert_eq!(seq.current_step_index(), 0);

        advance_ms(5000).await;
        // Exactly one advance despite three starts
        assert_eq!(seq.current_step_index(), 1);
        advance_ms(3000).await;
        assert_eq!(seq.current_step_index(), 2);
    }

    // =========================================
    // Subscribers
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_every_transition() {
        let seq = sequencer();
        let log: Arc<Mutex<Vec<(i32, Option<ViewId>)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        seq.subscribe(move |snap| {
            sink.lock().unwrap().push((snap.step_index, snap.active_view));
        });

        seq.start("交换机故障排查");
        advance_ms(5000).await;
        seq.switch_view(ViewId::Verification);

        let seen = log.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (0, Some(ViewId::Plan)),
                (1, Some(ViewId::Topology)),
                (1, Some(ViewId::Verification)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_subscriber_is_isolated() {
        let seq = sequencer();
        let delivered = Arc::new(AtomicUsize::new(0));

        seq.subscribe(|_| panic!("broken subscriber"));
        let sink = delivered.clone();
        seq.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        seq.start("交换机故障排查");
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
        // The sequencer itself is unharmed
        assert_eq!(seq.current_step_index(), 0);
        advance_ms(5000).await;
        assert_eq!(seq.current_step_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_stops_delivery() {
        let seq = sequencer();
        let delivered = Arc::new(AtomicUsize::new(0));
        let sink = delivered.clone();
        let id = seq.subscribe(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        seq.start("交换机故障排查");
        assert_eq!(delivered.load(Ordering::SeqCst), 1);

        assert!(seq.unsubscribe(id));
        assert!(!seq.unsubscribe(id));
        seq.switch_view(ViewId::Alerts);
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    // =========================================
    // Stage status derivation
    // =========================================

    #[tokio::test(start_paused = true)]
    async fn test_stage_status_tracks_cursor() {
        let seq = sequencer();
        assert_eq!(seq.stage_status(0), StageStatus::Pending);

        seq.start("交换机故障排查");
        assert_eq!(seq.stage_status(0), StageStatus::InProgress);
        assert_eq!(seq.stage_status(1), StageStatus::Pending);

        advance_ms(5000).await;
        assert_eq!(seq.stage_status(0), StageStatus::Completed);
        assert_eq!(seq.stage_status(1), StageStatus::InProgress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stage_table_never_starts() {
        let seq = Sequencer::new(Vec::new());
        seq.start("交换机故障排查");
        assert_eq!(seq.current_step_index(), -1);
        assert!(seq.active_view().is_none());
    }
}
