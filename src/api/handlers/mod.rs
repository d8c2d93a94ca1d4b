//! HTTP request handlers.

pub mod timer_handler;
pub mod user_handler;

pub use timer_handler::timer_routes;
pub use user_handler::user_routes;
