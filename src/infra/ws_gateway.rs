//! WebSocket gateway port.
//!
//! Opening a persistent connection to a freshly created user is the delayed
//! follow-up of onboarding. Only a logging implementation exists for now.

use async_trait::async_trait;

use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outbound port for per-user socket connections.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait WsGateway: Send + Sync {
    /// Open a connection to `user_id`
    async fn establish(&self, user_id: &str) -> AppResult<()>;
}

/// Gateway that only records the connection in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingWsGateway;

#[async_trait]
impl WsGateway for LoggingWsGateway {
    async fn establish(&self, user_id: &str) -> AppResult<()> {
        tracing::info!(user_id, "WS connection established");
        Ok(())
    }
}
