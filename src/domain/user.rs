//! User onboarding domain types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{UserIdStrategy, EVENT_USER_CREATED, STATIC_USER_ID};
use crate::events::Event;

/// User creation request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com")]
    pub email: String,
}

impl CreateUserRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Published once for every created user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedEvent {
    pub user_id: String,
    pub email: String,
}

impl UserCreatedEvent {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }
}

impl Event for UserCreatedEvent {
    const NAME: &'static str = EVENT_USER_CREATED;
}

/// Source of identifiers for newly created users.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait UserIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Placeholder generator that always returns the same id.
///
/// Two users created within the connection delay collide on their timeout
/// name, so this is only suitable for demos.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticUserId;

impl UserIdGenerator for StaticUserId {
    fn next_id(&self) -> String {
        STATIC_USER_ID.to_string()
    }
}

/// Random UUID v4 per user
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidUserId;

impl UserIdGenerator for UuidUserId {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl UserIdStrategy {
    /// Build the generator matching this strategy
    pub fn generator(self) -> Box<dyn UserIdGenerator> {
        match self {
            UserIdStrategy::Static => Box::new(StaticUserId),
            UserIdStrategy::Uuid => Box::new(UuidUserId),
        }
    }
}
