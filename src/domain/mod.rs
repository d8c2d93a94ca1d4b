//! Domain layer - Core onboarding types
//!
//! Requests, events and identifier generation, independent of the HTTP,
//! event bus and timer plumbing around them.

pub mod user;

pub use user::{
    CreateUserRequest, StaticUserId, UserCreatedEvent, UserIdGenerator, UuidUserId,
};

#[cfg(any(test, feature = "test-utils"))]
pub use user::MockUserIdGenerator;
