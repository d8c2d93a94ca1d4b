//! Application-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// =============================================================================
// Onboarding
// =============================================================================

/// Confirmation returned to the client once a user is created
pub const USER_CREATED_CONFIRMATION: &str = "User Created Successfully";

/// Greeting served on the root endpoint
pub const ROOT_GREETING: &str = "Hello World!";

/// Identifier handed out by the static id strategy
pub const STATIC_USER_ID: &str = "16532";

/// Suffix of the per-user connection timeout name (`{user_id}_establish_ws`)
pub const WS_TIMEOUT_SUFFIX: &str = "_establish_ws";

/// Build the timeout name for a user's delayed connection
pub fn ws_timeout_name(user_id: &str) -> String {
    format!("{}{}", user_id, WS_TIMEOUT_SUFFIX)
}

// =============================================================================
// Events
// =============================================================================

/// Event name published after a user is created
pub const EVENT_USER_CREATED: &str = "created.user";

// =============================================================================
// Timers & Background Jobs
// =============================================================================

/// Default delay before the welcome gift is considered sent
pub const DEFAULT_WELCOME_GIFT_DELAY_MS: u64 = 3_000;

/// Default delay before a new user's socket connection is established
pub const DEFAULT_WS_CONNECT_DELAY_MS: u64 = 5_000;

/// Default period of the expired-user cleanup job
pub const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 10_000;

/// Registry name of the expired-user cleanup job
pub const JOB_NAME_DELETE_EXPIRED_USERS: &str = "delete_expired_users";
