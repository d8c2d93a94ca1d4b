//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain types, the event bus and the scheduler to
//! fulfil application use cases. They depend on abstractions (traits) for
//! dependency inversion.

pub mod container;
mod onboarding_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use onboarding_service::{establish_ws_connection, OnboardingService, UserOnboarding};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;

#[cfg(any(test, feature = "test-utils"))]
pub use onboarding_service::MockOnboardingService;
