//! Listeners reacting to `created.user`.
//!
//! The welcome runs inline with the publisher so it is logged before the
//! client gets its confirmation. The gift is slow and runs in the background.

use std::time::Duration;

use crate::config::Config;
use crate::domain::UserCreatedEvent;
use crate::errors::AppResult;
use crate::events::EventBus;

/// Immediate listener: acknowledge the new user.
pub fn welcome_new_user(event: &UserCreatedEvent) {
    tracing::info!(user_id = %event.user_id, email = %event.email, "Welcoming new user");
}

/// Deferred listener: send the welcome gift, which takes `delay`.
pub async fn send_welcome_gift(event: UserCreatedEvent, delay: Duration) -> AppResult<()> {
    tracing::info!(user_id = %event.user_id, email = %event.email, "Sending welcome gift");

    tokio::time::sleep(delay).await;

    tracing::info!(user_id = %event.user_id, "Welcome gift sent");
    Ok(())
}

/// Subscribe both listeners on `bus`.
pub fn register(bus: &EventBus, config: &Config) -> AppResult<()> {
    bus.on::<UserCreatedEvent, _>("welcome_new_user", welcome_new_user)?;

    let delay = config.welcome_gift_delay;
    bus.on_async::<UserCreatedEvent, _, _>("send_welcome_gift", move |event| {
        send_welcome_gift(event, delay)
    })?;

    Ok(())
}
