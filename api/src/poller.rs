use crate::client::MatchSource;
use crate::{Match, Snapshot, partition};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Refresh period when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Snapshot replaced with `count` matches.
    Updated { count: usize },
    /// Fetch failed; snapshot untouched.
    Failed,
    /// Another refresh was still in flight; no request was made.
    Skipped,
}

/// Diagnostics about the poller's recent attempts. Never affects the snapshot.
#[derive(Debug, Clone, Default)]
pub struct PollerStatus {
    pub last_outcome: Option<RefreshOutcome>,
    pub last_error: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub successes: u64,
    pub failures: u64,
}

impl PollerStatus {
    pub fn is_failing(&self) -> bool {
        self.last_outcome == Some(RefreshOutcome::Failed)
    }
}

struct Shared<S> {
    source: S,
    snapshot: watch::Sender<Snapshot>,
    status: watch::Sender<PollerStatus>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the refresh future ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: MatchSource> Shared<S> {
    async fn refresh(&self) -> RefreshOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("refresh skipped: previous request still in flight");
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let result = self.source.fetch_matches().await;
        let now = Utc::now();

        match result {
            Ok(matches) => {
                let count = matches.len();
                self.snapshot.send_replace(Snapshot::new(matches, now));
                self.status.send_modify(|status| {
                    status.last_outcome = Some(RefreshOutcome::Updated { count });
                    status.last_error = None;
                    status.last_attempt_at = Some(now);
                    status.last_success_at = Some(now);
                    status.successes += 1;
                });
                debug!("match feed refreshed from {}: {count} matches", self.source.describe());
                RefreshOutcome::Updated { count }
            }
            Err(e) => {
                warn!("match feed refresh failed: {e}");
                let message = e.to_string();
                self.status.send_modify(|status| {
                    status.last_outcome = Some(RefreshOutcome::Failed);
                    status.last_error = Some(message);
                    status.last_attempt_at = Some(now);
                    status.failures += 1;
                });
                RefreshOutcome::Failed
            }
        }
    }
}

struct Schedule {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Keeps the freshest known match list and refreshes it on a fixed schedule.
///
/// The snapshot is only ever replaced whole. Fetch failures are logged and
/// recorded in [`PollerStatus`]; they never reach the caller and never clear
/// the last good snapshot.
pub struct MatchFeedPoller<S> {
    shared: Arc<Shared<S>>,
    schedule: Mutex<Option<Schedule>>,
}

impl<S: MatchSource> MatchFeedPoller<S> {
    pub fn new(source: S) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::default());
        let (status, _) = watch::channel(PollerStatus::default());
        Self {
            shared: Arc::new(Shared {
                source,
                snapshot,
                status,
                in_flight: AtomicBool::new(false),
            }),
            schedule: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    /// Fetch once and swap in the result. A refresh that starts while another
    /// is in flight is skipped rather than racing it.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.shared.refresh().await
    }

    /// Refresh now, then every `period` until [`stop`](Self::stop).
    /// Restarting replaces the previous schedule. Must be called from within
    /// a tokio runtime.
    pub fn start(&self, period: Duration) {
        let period = period.max(MIN_REFRESH_INTERVAL);
        let mut schedule = self.lock_schedule();
        if let Some(previous) = schedule.take() {
            previous.stop.send_replace(true);
        }

        let shared = Arc::clone(&self.shared);
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {
                        shared.refresh().await;
                    }
                }
                if *stopped.borrow() {
                    break;
                }
            }
            debug!("match feed schedule ended");
        });

        info!(
            "polling {} every {}s",
            self.shared.source.describe(),
            period.as_secs_f64()
        );
        *schedule = Some(Schedule { stop, task });
    }

    /// Cancel future scheduled refreshes. A request already in flight is left
    /// to complete. Safe to call repeatedly or without `start`.
    pub fn stop(&self) {
        if let Some(schedule) = self.lock_schedule().take() {
            schedule.stop.send_replace(true);
            info!("stopped polling {}", self.shared.source.describe());
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_schedule()
            .as_ref()
            .is_some_and(|s| !s.task.is_finished())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshot.borrow().clone()
    }

    /// Receiver that observes every successful refresh.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshot.subscribe()
    }

    pub fn status(&self) -> PollerStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PollerStatus> {
        self.shared.status.subscribe()
    }

    pub fn live_view(&self) -> Vec<Match> {
        self.snapshot().live().cloned().collect()
    }

    pub fn upcoming_view(&self) -> Vec<Match> {
        self.snapshot().upcoming().cloned().collect()
    }

    /// Both views taken from the same snapshot.
    pub fn views(&self) -> (Vec<Match>, Vec<Match>) {
        partition(self.snapshot().matches())
    }

    fn lock_schedule(&self) -> MutexGuard<'_, Option<Schedule>> {
        self.schedule.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Drop for MatchFeedPoller<S> {
    fn drop(&mut self) {
        let schedule = self
            .schedule
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(schedule) = schedule {
            schedule.stop.send_replace(true);
        }
    }
}
