use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};

use crate::core::orchestrator::RefreshOrchestrator;
use crate::domain::model::RefreshSummary;
use crate::domain::ports::Sleeper;
use crate::utils::error::{Result, TrackerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    WarmingUp,
    Running,
    Sleeping,
}

/// Runs the refresh orchestrator on a fixed interval in the background.
///
/// Nothing that happens inside a cycle stops the loop: errors and panics are
/// logged and the next cycle runs after the interval.
pub struct Scheduler {
    orchestrator: Arc<RefreshOrchestrator>,
    sleeper: Arc<dyn Sleeper>,
    warmup: Duration,
    interval: Duration,
    state: Mutex<SchedulerState>,
    cycles: AtomicU64,
}

impl Scheduler {
    pub fn new(
        orchestrator: Arc<RefreshOrchestrator>,
        sleeper: Arc<dyn Sleeper>,
        warmup: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            orchestrator,
            sleeper,
            warmup,
            interval,
            state: Mutex::new(SchedulerState::Idle),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: SchedulerState) {
        match self.state.lock() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }

    pub async fn run_forever(&self) {
        self.run(None).await;
    }

    /// Warm-up followed by `count` cycles, each followed by the interval sleep.
    pub async fn run_cycles(&self, count: u64) {
        self.run(Some(count)).await;
    }

    async fn run(&self, limit: Option<u64>) {
        tracing::info!(
            "Price refresher started; first refresh in {}s, then every {}s",
            self.warmup.as_secs(),
            self.interval.as_secs()
        );
        self.set_state(SchedulerState::WarmingUp);
        self.sleeper.sleep(self.warmup).await;

        let mut ran = 0u64;
        while limit.map_or(true, |n| ran < n) {
            self.set_state(SchedulerState::Running);
            self.run_cycle().await;
            ran += 1;
            self.cycles.fetch_add(1, Ordering::SeqCst);

            self.set_state(SchedulerState::Sleeping);
            self.sleeper.sleep(self.interval).await;
        }

        self.set_state(SchedulerState::Idle);
    }

    async fn run_cycle(&self) {
        tracing::info!("Starting background price update");
        let started = chrono::Utc::now();

        // Own task so a panic inside the cycle is caught at the join
        let orchestrator = Arc::clone(&self.orchestrator);
        let cycle = tokio::spawn(async move { orchestrator.refresh_all().await });

        match cycle_outcome(cycle.await) {
            Ok(summary) => {
                let elapsed = chrono::Utc::now() - started;
                tracing::info!(
                    targets = summary.targets,
                    updated = summary.updated,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    elapsed_ms = elapsed.num_milliseconds(),
                    "Background price update finished"
                );
            }
            Err(e) => tracing::error!("Price updater error: {}", e),
        }
    }

    /// Moves the scheduler onto its own task, running until the process exits.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_forever().await })
    }
}

/// Folds a cycle task that panicked or was cancelled into a `TrackerError::Task`.
fn cycle_outcome(
    joined: std::result::Result<Result<RefreshSummary>, JoinError>,
) -> Result<RefreshSummary> {
    joined.unwrap_or_else(|e| {
        Err(TrackerError::Task {
            message: format!("refresh cycle aborted: {}", e),
        })
    })
}
