//! Named timer registry.
//!
//! Every one-shot timeout and fixed-period interval is stored under a name so
//! it can be inspected or cancelled later. Timeouts drop out of the registry
//! once they have fired; intervals stay until cancelled.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Kind of scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Fires once after a delay
    Timeout,
    /// Fires every period
    Interval,
}

/// Read-only view of a registered timer
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerInfo {
    /// Registry name
    #[schema(example = "16532_establish_ws")]
    pub name: String,
    pub kind: TimerKind,
    /// Delay (timeout) or period (interval) in milliseconds
    #[schema(example = 5000)]
    pub period_ms: u64,
    /// Completed runs so far
    pub runs: u64,
    pub registered_at: DateTime<Utc>,
}

struct Entry {
    id: u64,
    kind: TimerKind,
    period: Duration,
    runs: Arc<AtomicU64>,
    registered_at: DateTime<Utc>,
    task: JoinHandle<()>,
}

impl Entry {
    fn info(&self, name: &str) -> TimerInfo {
        TimerInfo {
            name: name.to_string(),
            kind: self.kind,
            period_ms: millis(self.period),
            runs: self.runs.load(Ordering::SeqCst),
            registered_at: self.registered_at,
        }
    }
}

#[derive(Default)]
struct Inner {
    timers: Mutex<HashMap<String, Entry>>,
    next_id: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove `name` only if it still refers to the timer `id`.
    fn remove_fired(&self, name: &str, id: u64) {
        let mut timers = self.lock();
        if timers.get(name).is_some_and(|entry| entry.id == id) {
            timers.remove(name);
        }
    }
}

/// Process-wide registry of named timers.
///
/// Cheap to clone; clones share the same timers.
#[derive(Clone, Default)]
pub struct SchedulerRegistry {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SchedulerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let timers = self.inner.lock();
        f.debug_struct("SchedulerRegistry")
            .field("timers", &timers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchedulerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once after `delay` and register it under `name`.
    ///
    /// The entry is removed after the task completes, even if it panics.
    pub fn add_timeout<F>(&self, name: impl Into<String>, delay: Duration, task: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn_entry(name.into(), TimerKind::Timeout, delay, |registry, key, id, runs| {
            async move {
                tokio::time::sleep(delay).await;
                if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
                    tracing::error!(panic = panic_message(panic.as_ref()), "Timeout panicked");
                }
                runs.fetch_add(1, Ordering::SeqCst);

                if let Some(inner) = registry.upgrade() {
                    inner.remove_fired(&key, id);
                }
            }
        })
    }

    /// Run `job` every `period`, first run one period from now.
    ///
    /// A run that overshoots the period delays the next one instead of
    /// overlapping it; missed ticks are skipped. A panicking run is logged
    /// and does not stop the interval.
    pub fn add_interval<F, Fut>(&self, name: impl Into<String>, period: Duration, job: F) -> AppResult<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(AppError::scheduler("interval period must be greater than zero"));
        }

        self.spawn_entry(name.into(), TimerKind::Interval, period, |_, _, _, runs| {
            async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    ticker.tick().await;
                    let started = std::panic::catch_unwind(AssertUnwindSafe(|| job()));
                    let outcome = match started {
                        Ok(run) => AssertUnwindSafe(run).catch_unwind().await,
                        Err(panic) => Err(panic),
                    };
                    if let Err(panic) = outcome {
                        tracing::error!(panic = panic_message(panic.as_ref()), "Interval run panicked");
                    }
                    runs.fetch_add(1, Ordering::SeqCst);
                }
            }
        })
    }

    /// Whether a timer is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().contains_key(name)
    }

    /// Look up a timer by name
    pub fn get(&self, name: &str) -> Option<TimerInfo> {
        self.inner.lock().get(name).map(|entry| entry.info(name))
    }

    /// All registered timers, sorted by name
    pub fn timers(&self) -> Vec<TimerInfo> {
        let mut timers: Vec<TimerInfo> = self
            .inner
            .lock()
            .iter()
            .map(|(name, entry)| entry.info(name))
            .collect();
        timers.sort_by(|a, b| a.name.cmp(&b.name));
        timers
    }

    /// Number of registered timers
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancel and unregister a timer. Returns false if `name` is unknown.
    pub fn cancel(&self, name: &str) -> bool {
        let removed = self.inner.lock().remove(name);
        match removed {
            Some(entry) => {
                entry.task.abort();
                tracing::info!(timer = name, kind = ?entry.kind, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every timer. Returns how many were cancelled.
    pub fn shutdown(&self) -> usize {
        let drained: Vec<(String, Entry)> = self.inner.lock().drain().collect();
        for (_, entry) in &drained {
            entry.task.abort();
        }
        tracing::info!(count = drained.len(), "Scheduler shut down");
        drained.len()
    }

    fn spawn_entry<B, Fut>(
        &self,
        name: String,
        kind: TimerKind,
        period: Duration,
        body: B,
    ) -> AppResult<()>
    where
        B: FnOnce(Weak<Inner>, String, u64, Arc<AtomicU64>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|e| {
            AppError::scheduler(format!("cannot arm timer '{}': {}", name, e))
        })?;

        let mut timers = self.inner.lock();
        if timers.contains_key(&name) {
            return Err(AppError::conflict(format!("Timer '{}'", name)));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let runs = Arc::new(AtomicU64::new(0));
        let span = tracing::info_span!("timer", name = %name, kind = ?kind);
        let future = body(Arc::downgrade(&self.inner), name.clone(), id, Arc::clone(&runs));
        let task = runtime.spawn(future.instrument(span));

        tracing::debug!(timer = %name, kind = ?kind, period_ms = millis(period), "Timer registered");

        timers.insert(
            name,
            Entry {
                id,
                kind,
                period,
                runs,
                registered_at: Utc::now(),
                task,
            },
        );
        Ok(())
    }
}

/// Whole milliseconds of `duration`, saturating at `u64::MAX`
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
