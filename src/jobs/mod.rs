//! Background jobs driven by the scheduler registry.

pub mod cleanup_job;

pub use cleanup_job::{delete_expired_users, ExpiredUserCleanupJob};
