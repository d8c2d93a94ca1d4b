//! Event listeners wired onto the application event bus at startup.

pub mod user_created;

pub use user_created::{send_welcome_gift, welcome_new_user};

use crate::config::Config;
use crate::errors::AppResult;
use crate::events::EventBus;

/// Register every application listener
pub fn register_all(bus: &EventBus, config: &Config) -> AppResult<()> {
    user_created::register(bus, config)
}
