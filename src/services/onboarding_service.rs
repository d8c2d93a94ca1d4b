//! Onboarding service - Creates users and triggers their follow-up work.
//!
//! The request path only publishes `created.user` and arms the per-user
//! connection timeout. Everything slow happens after the confirmation has
//! been returned.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ws_timeout_name, Config, USER_CREATED_CONFIRMATION};
use crate::domain::{CreateUserRequest, UserCreatedEvent, UserIdGenerator};
use crate::errors::AppResult;
use crate::events::EventBus;
use crate::infra::WsGateway;
use crate::scheduler::SchedulerRegistry;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Onboarding service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OnboardingService: Send + Sync {
    /// Create a user and return the confirmation message.
    ///
    /// Returns before any listener or timer has completed.
    async fn create_user(&self, request: CreateUserRequest) -> AppResult<String>;
}

/// Concrete implementation of OnboardingService.
pub struct UserOnboarding {
    events: Arc<EventBus>,
    scheduler: SchedulerRegistry,
    ids: Arc<dyn UserIdGenerator>,
    ws_gateway: Arc<dyn WsGateway>,
    ws_connect_delay: Duration,
}

impl UserOnboarding {
    pub fn new(
        events: Arc<EventBus>,
        scheduler: SchedulerRegistry,
        ids: Arc<dyn UserIdGenerator>,
        ws_gateway: Arc<dyn WsGateway>,
        config: &Config,
    ) -> Self {
        Self {
            events,
            scheduler,
            ids,
            ws_gateway,
            ws_connect_delay: config.ws_connect_delay,
        }
    }
}

#[async_trait]
impl OnboardingService for UserOnboarding {
    async fn create_user(&self, request: CreateUserRequest) -> AppResult<String> {
        tracing::info!(email = %request.email, "Creating user");

        let user_id = self.ids.next_id();

        // Arm the timer first: a name clash must not leave a published event behind
        let timer = ws_timeout_name(&user_id);
        let gateway = Arc::clone(&self.ws_gateway);
        let target = user_id.clone();
        self.scheduler
            .add_timeout(timer.as_str(), self.ws_connect_delay, async move {
                establish_ws_connection(gateway.as_ref(), &target).await;
            })?;
        let armed = ArmedTimer::new(&self.scheduler, &timer);

        let event = UserCreatedEvent::new(user_id, request.email);
        self.events.publish(event)?;

        armed.keep();
        Ok(USER_CREATED_CONFIRMATION.to_string())
    }
}

/// Cancels a freshly armed timer on drop unless [`ArmedTimer::keep`] ran,
/// covering both an error return and an unwinding listener.
struct ArmedTimer<'a> {
    scheduler: &'a SchedulerRegistry,
    name: &'a str,
    kept: bool,
}

impl<'a> ArmedTimer<'a> {
    fn new(scheduler: &'a SchedulerRegistry, name: &'a str) -> Self {
        Self {
            scheduler,
            name,
            kept: false,
        }
    }

    fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for ArmedTimer<'_> {
    fn drop(&mut self) {
        if !self.kept && self.scheduler.cancel(self.name) {
            tracing::warn!(timer = self.name, "User creation failed, timer rolled back");
        }
    }
}

/// Timeout body: open the socket connection for a new user.
pub async fn establish_ws_connection(gateway: &dyn WsGateway, user_id: &str) {
    tracing::info!(user_id, "Establishing WS connection");

    if let Err(e) = gateway.establish(user_id).await {
        tracing::error!(user_id, error = %e, "Failed to establish WS connection");
    }
}
