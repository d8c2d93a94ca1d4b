//! Infrastructure layer - External systems integration
//!
//! Outbound ports and their adapters. Socket connections are the only
//! external concern so far.

pub mod ws_gateway;

pub use ws_gateway::{LoggingWsGateway, WsGateway};

#[cfg(any(test, feature = "test-utils"))]
pub use ws_gateway::MockWsGateway;
