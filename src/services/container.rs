//! Service Container - Startup wiring of the bus, the scheduler and services.
//!
//! The event bus and the scheduler registry are created once here and passed
//! explicitly to everything that needs them; nothing reaches for a global.

use std::sync::Arc;

use super::{OnboardingService, UserOnboarding};
use crate::config::Config;
use crate::domain::UserIdGenerator;
use crate::errors::AppResult;
use crate::events::EventBus;
use crate::infra::{LoggingWsGateway, WsGateway};
use crate::jobs::ExpiredUserCleanupJob;
use crate::listeners;
use crate::scheduler::SchedulerRegistry;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get onboarding service
    fn onboarding(&self) -> Arc<dyn OnboardingService>;

    /// Get the timer registry
    fn scheduler(&self) -> SchedulerRegistry;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    events: Arc<EventBus>,
    scheduler: SchedulerRegistry,
    onboarding: Arc<dyn OnboardingService>,
}

impl Services {
    /// Create a container from already-built parts. Nothing is registered.
    pub fn new(
        events: Arc<EventBus>,
        scheduler: SchedulerRegistry,
        onboarding: Arc<dyn OnboardingService>,
    ) -> Self {
        Self {
            events,
            scheduler,
            onboarding,
        }
    }

    /// Build every service from config with the default adapters, register
    /// the listeners and start the cleanup job.
    ///
    /// Must be called from within a tokio runtime.
    pub fn bootstrap(config: &Config) -> AppResult<Self> {
        Self::bootstrap_with(
            config,
            Arc::from(config.user_id_strategy.generator()),
            Arc::new(LoggingWsGateway),
        )
    }

    /// Like [`Services::bootstrap`] with explicit id generator and gateway.
    pub fn bootstrap_with(
        config: &Config,
        ids: Arc<dyn UserIdGenerator>,
        ws_gateway: Arc<dyn WsGateway>,
    ) -> AppResult<Self> {
        let events = Arc::new(EventBus::new());
        let scheduler = SchedulerRegistry::new();

        listeners::register_all(&events, config)?;
        ExpiredUserCleanupJob::from_config(config).schedule(&scheduler)?;

        let onboarding = Arc::new(UserOnboarding::new(
            events.clone(),
            scheduler.clone(),
            ids,
            ws_gateway,
            config,
        ));

        tracing::info!(
            user_id_strategy = ?config.user_id_strategy,
            timers = scheduler.len(),
            "Services initialized"
        );

        Ok(Self::new(events, scheduler, onboarding))
    }

    /// The application event bus
    pub fn events(&self) -> Arc<EventBus> {
        self.events.clone()
    }
}

impl ServiceContainer for Services {
    fn onboarding(&self) -> Arc<dyn OnboardingService> {
        self.onboarding.clone()
    }

    fn scheduler(&self) -> SchedulerRegistry {
        self.scheduler.clone()
    }
}
