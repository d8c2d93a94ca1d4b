//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::{timer_handler, user_handler};
use crate::domain::CreateUserRequest;
use crate::scheduler::{TimerInfo, TimerKind};

/// OpenAPI documentation for the onboarding service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Onboarding Service",
        version = "0.1.0",
        description = "User creation with background listeners, named timeouts and interval jobs",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        user_handler::create_user,
        timer_handler::list_timers,
        timer_handler::get_timer,
        timer_handler::cancel_timer,
    ),
    components(
        schemas(
            CreateUserRequest,
            TimerInfo,
            TimerKind,
        )
    ),
    tags(
        (name = "Users", description = "User onboarding"),
        (name = "Timers", description = "Named timeouts and interval jobs")
    )
)]
pub struct ApiDoc;
