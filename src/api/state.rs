//! Application state - Dependency injection container.
//!
//! Provides handlers with the onboarding service and the timer registry.

use std::sync::Arc;

use crate::scheduler::SchedulerRegistry;
use crate::services::{OnboardingService, ServiceContainer};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Onboarding service
    pub onboarding: Arc<dyn OnboardingService>,
    /// Named timers, for inspection and cancellation
    pub scheduler: SchedulerRegistry,
}

impl AppState {
    /// Create application state from a service container.
    pub fn from_services(services: &dyn ServiceContainer) -> Self {
        Self::new(services.onboarding(), services.scheduler())
    }

    /// Create application state with manually injected services.
    pub fn new(onboarding: Arc<dyn OnboardingService>, scheduler: SchedulerRegistry) -> Self {
        Self {
            onboarding,
            scheduler,
        }
    }
}
