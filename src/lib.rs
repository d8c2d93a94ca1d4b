//! Onboarding Service - user creation with decoupled follow-up work
//!
//! Creating a user returns immediately. The side effects run elsewhere:
//! listeners on the `created.user` event (one inline, one in the
//! background), a named per-user timeout that opens the socket connection,
//! and an interval job sweeping expired users.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Requests, events and user id generation
//! - **events**: In-process event bus
//! - **scheduler**: Named timeout/interval registry
//! - **listeners**: Event listeners
//! - **jobs**: Interval jobs
//! - **services**: Application use cases
//! - **infra**: Outbound ports and adapters
//! - **api**: HTTP handlers and routes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Custom port with debug logs
//! cargo run -- -v serve --port 8080
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod infra;
pub mod jobs;
pub mod listeners;
pub mod scheduler;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{CreateUserRequest, UserCreatedEvent};
pub use errors::{AppError, AppResult};
pub use events::EventBus;
pub use scheduler::SchedulerRegistry;
