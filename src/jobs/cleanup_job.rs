//! Expired user cleanup job.
//!
//! Runs on a fixed interval, independent of user creation. There is no user
//! store yet, so a sweep only logs.

use std::time::Duration;

use crate::config::{Config, JOB_NAME_DELETE_EXPIRED_USERS};
use crate::errors::AppResult;
use crate::scheduler::{millis, SchedulerRegistry};

/// Periodic sweep of expired users
#[derive(Debug, Clone, Copy)]
pub struct ExpiredUserCleanupJob {
    interval: Duration,
}

impl ExpiredUserCleanupJob {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cleanup_interval)
    }

    /// Registry name of the job
    pub fn id(&self) -> &'static str {
        JOB_NAME_DELETE_EXPIRED_USERS
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Register the job on `registry`
    pub fn schedule(&self, registry: &SchedulerRegistry) -> AppResult<()> {
        registry.add_interval(self.id(), self.interval, delete_expired_users)?;

        tracing::info!(
            job = self.id(),
            interval_ms = millis(self.interval),
            "Cleanup job scheduled"
        );
        Ok(())
    }
}

/// One cleanup sweep.
pub async fn delete_expired_users() {
    tracing::info!("Deleting expired users");
}
