//! Poll Scheduler - Fixed-Cadence Refresh Loop
//!
//! Drives a `SnapshotFetcher` on a fixed period and owns the
//! `PollState` that consumers read. Lifecycle:
//! `NotStarted -> Running -> Stopped` (terminal).
//!
//! Cycles are strictly sequential: the next tick is awaited only
//! after the previous fetch has been committed or discarded. The
//! fixed period is the only backoff; there is no retry within a cycle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::config::loader::validate_timing;
use crate::domain::errors::{FetchError, SchedulerError};
use crate::domain::poll_state::PollState;
use crate::domain::snapshot::MarketSnapshot;
use crate::ports::snapshot_fetcher::SnapshotFetcher;

/// Consumer callback invoked once per committed cycle.
pub type UpdateCallback = Box<dyn Fn(&PollState) + Send + Sync + 'static>;

/// Scheduler lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
  NotStarted,
  Running,
  Stopped,
}

/// State shared between the scheduler handle and its cycle task.
struct Shared {
  /// Current state; replaced whole, never patched.
  state_tx: watch::Sender<PollState>,
  /// Lifecycle phase. Held while committing a cycle so that
  /// `stop()` and a late commit cannot interleave.
  phase: Mutex<SchedulerPhase>,
}

impl Shared {
  fn phase(&self) -> MutexGuard<'_, SchedulerPhase> {
    self.phase.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Apply a cycle outcome and notify the consumer.
  ///
  /// Returns `false` if the scheduler was stopped meanwhile; the
  /// outcome is then dropped without touching the state.
  fn commit(
    &self,
    outcome: Result<MarketSnapshot, FetchError>,
    on_update: &(dyn Fn(&PollState) + Send + Sync),
  ) -> bool {
    let phase = self.phase();
    if *phase != SchedulerPhase::Running {
      debug!("Discarding fetch result that completed after stop");
      return false;
    }

    let next = self.state_tx.borrow().advance(outcome);

    match &next.last_error {
      None => debug!(cycle = next.cycle_count, "Poll cycle succeeded"),
      Some(e) => warn!(
        cycle = next.cycle_count,
        error = %e,
        kind = e.kind(),
        consecutive_failures = next.consecutive_failures,
        "Poll cycle failed, keeping last good snapshot"
      ),
    }

    self.state_tx.send_replace(next.clone());
    on_update(&next);
    drop(phase);
    true
  }
}

/// Periodic refresh driver owning the viewer's `PollState`.
///
/// Dropping the scheduler stops it.
pub struct PollScheduler {
  /// Snapshot source driven once per tick.
  fetcher: Arc<dyn SnapshotFetcher>,
  /// Upper bound for a single fetch.
  fetch_timeout: Duration,
  /// State and lifecycle shared with the cycle task.
  shared: Arc<Shared>,
  /// Stop signal for the cycle task.
  shutdown_tx: broadcast::Sender<()>,
  /// Cycle task, present once started.
  handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
  /// Create a scheduler in the `NotStarted` phase with an empty state.
  pub fn new(fetcher: Arc<dyn SnapshotFetcher>, fetch_timeout: Duration) -> Self {
    let (state_tx, _) = watch::channel(PollState::default());
    let (shutdown_tx, _) = broadcast::channel(1);

    Self {
      fetcher,
      fetch_timeout,
      shared: Arc::new(Shared {
        state_tx,
        phase: Mutex::new(SchedulerPhase::NotStarted),
      }),
      shutdown_tx,
      handle: Mutex::new(None),
    }
  }

  /// Start the cycle loop.
  ///
  /// The first cycle runs immediately, then one per `period`.
  /// `on_update` is called synchronously on the cycle task after every
  /// committed cycle, success or failure. It must return quickly and
  /// must not call `stop()` on this scheduler.
  ///
  /// # Errors
  /// Checked in this order:
  /// - `AlreadyRunning` / `Stopped` if not in `NotStarted`
  /// - `Configuration` if `period` is zero or shorter than the fetch timeout
  /// - `NoRuntime` outside a Tokio runtime
  pub fn start<F>(&self, period: Duration, on_update: F) -> Result<(), SchedulerError>
  where
    F: Fn(&PollState) + Send + Sync + 'static,
  {
    let mut phase = self.shared.phase();
    match *phase {
      SchedulerPhase::NotStarted => {}
      SchedulerPhase::Running => return Err(SchedulerError::AlreadyRunning),
      SchedulerPhase::Stopped => return Err(SchedulerError::Stopped),
    }

    validate_timing(period, self.fetch_timeout)?;
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;

    let cycle = CycleTask {
      fetcher: Arc::clone(&self.fetcher),
      shared: Arc::clone(&self.shared),
      period,
      fetch_timeout: self.fetch_timeout,
      on_update: Box::new(on_update),
    };
    let shutdown_rx = self.shutdown_tx.subscribe();
    let handle = runtime.spawn(cycle.run(shutdown_rx));

    *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    *phase = SchedulerPhase::Running;

    info!(
      period_ms = period.as_millis(),
      fetch_timeout_ms = self.fetch_timeout.as_millis(),
      "Poll scheduler started"
    );
    Ok(())
  }

  /// Halt further cycles.
  ///
  /// Idempotent. Once this returns, no state is committed and no
  /// callback fires. An in-flight fetch is left to finish and its
  /// result discarded.
  pub fn stop(&self) {
    let mut phase = self.shared.phase();
    let previous = *phase;
    *phase = SchedulerPhase::Stopped;
    drop(phase);

    if previous == SchedulerPhase::Running {
      let _ = self.shutdown_tx.send(());
      info!(
        cycles = self.shared.state_tx.borrow().cycle_count,
        "Poll scheduler stopped"
      );
    }
  }

  /// Wait for the cycle task to exit. Returns immediately if never started.
  pub async fn wait(&self) {
    let handle = self
      .handle
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();

    if let Some(handle) = handle {
      if let Err(e) = handle.await {
        warn!(error = %e, "Poll cycle task ended abnormally");
      }
    }
  }

  /// Copy of the current state.
  pub fn current(&self) -> PollState {
    self.shared.state_tx.borrow().clone()
  }

  /// Receiver observing every committed state.
  pub fn subscribe(&self) -> watch::Receiver<PollState> {
    self.shared.state_tx.subscribe()
  }

  pub fn phase(&self) -> SchedulerPhase {
    *self.shared.phase()
  }
}

impl Drop for PollScheduler {
  fn drop(&mut self) {
    self.stop();
  }
}

/// The spawned cycle loop.
struct CycleTask {
  fetcher: Arc<dyn SnapshotFetcher>,
  shared: Arc<Shared>,
  period: Duration,
  fetch_timeout: Duration,
  on_update: UpdateCallback,
}

impl CycleTask {
  #[instrument(skip_all, name = "poll_loop", fields(period_ms = self.period.as_millis()))]
  async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(self.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          debug!("Poll loop received shutdown signal");
          break;
        }
        _ = ticker.tick() => {}
      }

      // Not raced against shutdown: an in-flight fetch always completes.
      let outcome = self.fetch_cycle().await;

      if !self.shared.commit(outcome, self.on_update.as_ref()) {
        break;
      }
    }

    debug!("Poll loop exited");
  }

  /// Run one fetch on its own task so that a panicking fetcher or
  /// feature generator becomes a failed cycle instead of ending the loop.
  async fn fetch_cycle(&self) -> Result<MarketSnapshot, FetchError> {
    let fetcher = Arc::clone(&self.fetcher);
    let mut fetch = tokio::spawn(async move { fetcher.fetch_once().await });

    match tokio::time::timeout(self.fetch_timeout, &mut fetch).await {
      Ok(Ok(outcome)) => outcome,
      Ok(Err(e)) => {
        error!(error = %e, "Snapshot fetch task failed");
        Err(FetchError::network(format!("fetch task panicked: {e}")))
      }
      Err(_) => {
        fetch.abort();
        Err(FetchError::timed_out(self.fetch_timeout))
      }
    }
  }
}
