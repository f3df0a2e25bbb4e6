//! Progressive sub-step reveal within a single stage.
//!
//! A `SubstepRevealer` is created fresh for each stage activation. Once
//! armed it walks every sub-step through pending → in-progress → completed
//! on that sub-step's own delay/duration pair. Arming is one-shot: the
//! parent stage's status is re-evaluated on every render, and without the
//! latch each re-check would re-schedule every timer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;

use crate::stage::{StageStatus, SubstepSpec};

/// A sub-step surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealedSubstep {
    pub title: String,
    pub status: StageStatus,
}

struct RevealerState {
    statuses: Vec<StageStatus>,
    timers_started: bool,
    timers: Vec<JoinHandle<()>>,
}

struct RevealerInner {
    specs: Vec<SubstepSpec>,
    state: Mutex<RevealerState>,
}

impl Drop for RevealerInner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for timer in &state.timers {
            timer.abort();
        }
    }
}

/// Reveals a stage's sub-steps over time. Cheap to clone; all clones share
/// one state. Dropping the last handle cancels any outstanding timers.
#[derive(Clone)]
pub struct SubstepRevealer {
    inner: Arc<RevealerInner>,
}

impl SubstepRevealer {
    pub fn new(specs: Vec<SubstepSpec>) -> Self {
        let statuses = vec![StageStatus::Pending; specs.len()];
        Self {
            inner: Arc::new(RevealerInner {
                specs,
                state: Mutex::new(RevealerState {
                    statuses,
                    timers_started: false,
                    timers: Vec::new(),
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, RevealerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the reveal timers, once.
    ///
    /// A `Pending` parent is a no-op. For an in-progress or completed
    /// parent, each sub-step gets two timers: one at `start_delay_ms`
    /// (pending → in-progress) and one at `start_delay_ms + duration_ms`
    /// (in-progress → completed). Subsequent calls, whatever the parent
    /// status, never re-arm or restart anything.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(&self, parent_status: StageStatus) {
        if parent_status == StageStatus::Pending {
            return;
        }
        let mut state = self.state();
        if state.timers_started {
            return;
        }
        state.timers_started = true;
        tracing::debug!(substeps = self.inner.specs.len(), "sub-step timers armed");

        for (index, spec) in self.inner.specs.iter().enumerate() {
            state.timers.push(Self::schedule(
                Arc::downgrade(&self.inner),
                spec.start_delay(),
                index,
                StageStatus::InProgress,
            ));
            state.timers.push(Self::schedule(
                Arc::downgrade(&self.inner),
                spec.end_delay(),
                index,
                StageStatus::Completed,
            ));
        }
    }

    /// Whether timers have been armed for this stage instance.
    pub fn is_armed(&self) -> bool {
        self.state().timers_started
    }

    /// Only in-progress and completed sub-steps, in declaration order.
    /// Pending sub-steps are not surfaced at all.
    pub fn revealed(&self) -> Vec<RevealedSubstep> {
        let state = self.state();
        self.inner
            .specs
            .iter()
            .zip(&state.statuses)
            .filter(|(_, status)| **status != StageStatus::Pending)
            .map(|(spec, status)| RevealedSubstep {
                title: spec.title.clone(),
                status: *status,
            })
            .collect()
    }

    /// Raw status list, one entry per declared sub-step.
    pub fn statuses(&self) -> Vec<StageStatus> {
        self.state().statuses.clone()
    }

    pub fn all_complete(&self) -> bool {
        self.state()
            .statuses
            .iter()
            .all(|s| *s == StageStatus::Completed)
    }

    fn schedule(
        weak: Weak<RevealerInner>,
        delay: std::time::Duration,
        index: usize,
        status: StageStatus,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                let mut state = inner
                    .state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let current = state.statuses[index];
                // Transitions are monotonic and fire exactly once
                let apply = match status {
                    StageStatus::InProgress => current == StageStatus::Pending,
                    StageStatus::Completed => current != StageStatus::Completed,
                    StageStatus::Pending => false,
                };
                if apply {
                    state.statuses[index] = status;
                    tracing::debug!(substep = index, status = ?status, "sub-step transition");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::default_stages;
    use tokio::time::Duration;

    fn recovery_substeps() -> Vec<SubstepSpec> {
        default_stages()[4].substeps.clone()
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_parent_is_a_noop() {
        let revealer = SubstepRevealer::new(recovery_substeps());
        revealer.activate(StageStatus::Pending);
        assert!(!revealer.is_armed());

        advance_ms(10_000).await;
        assert!(revealer.revealed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_lifecycle() {
        let revealer = SubstepRevealer::new(recovery_substeps());
        revealer.activate(StageStatus::InProgress);
        assert!(revealer.is_armed());

        // First sub-step starts at t=0
        settle().await;
        advance_ms(1).await;
        let revealed = revealer.revealed();
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].title, "生成恢复策略");
        assert_eq!(revealed[0].status, StageStatus::InProgress);

        // At t=2000 the first completes and the second starts
        advance_ms(2000).await;
        let revealed = revealer.revealed();
        assert_eq!(revealed.len(), 2);
        assert_eq!(revealed[0].status, StageStatus::Completed);
        assert_eq!(revealed[1].title, "执行恢复策略");
        assert_eq!(revealed[1].status, StageStatus::InProgress);

        // At t=6000 everything is done
        advance_ms(4000).await;
        assert!(revealer.all_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_substeps_are_never_surfaced() {
        let revealer = SubstepRevealer::new(vec![
            SubstepSpec::new("生成恢复策略", 0, 1000),
            SubstepSpec::new("执行恢复策略", 5000, 1000),
        ]);
        revealer.activate(StageStatus::InProgress);

        advance_ms(1500).await;
        let revealed = revealer.revealed();
        // The second sub-step has not started; it must not appear, not
        // even as a placeholder
        assert_eq!(revealed.len(), 1);
        assert_eq!(revealed[0].status, StageStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activation_is_one_shot() {
        let revealer = SubstepRevealer::new(recovery_substeps());
        revealer.activate(StageStatus::InProgress);

        advance_ms(2500).await;
        let before = revealer.statuses();

        // Parent flips in-progress → completed and back on re-render;
        // timers must not re-arm or restart
        revealer.activate(StageStatus::Completed);
        revealer.activate(StageStatus::InProgress);
        assert_eq!(revealer.statuses(), before);

        advance_ms(3500).await;
        assert!(revealer.all_complete());

        // Still exactly two sub-steps, each transitioned exactly once
        let revealed = revealer.revealed();
        assert_eq!(revealed.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_substeps_interleave() {
        let revealer = SubstepRevealer::new(vec![
            SubstepSpec::new("切换备用链路", 0, 4000),
            SubstepSpec::new("刷新路由表", 1000, 1000),
        ]);
        revealer.activate(StageStatus::InProgress);

        advance_ms(2500).await;
        let revealed = revealer.revealed();
        // The second began and finished while the first is still running;
        // declaration order is preserved regardless
        assert_eq!(revealed[0].status, StageStatus::InProgress);
        assert_eq!(revealed[1].status, StageStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_substep_list() {
        let revealer = SubstepRevealer::new(Vec::new());
        revealer.activate(StageStatus::InProgress);
        assert!(revealer.is_armed());
        assert!(revealer.revealed().is_empty());
        assert!(revealer.all_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_outstanding_timers() {
        let revealer = SubstepRevealer::new(recovery_substeps());
        revealer.activate(StageStatus::InProgress);
        drop(revealer);

        // Nothing to assert beyond "does not panic": the weak upgrade in
        // any already-woken timer fails and the task exits
        advance_ms(10_000).await;
    }
}
