//! Integration tests for API endpoints.
//!
//! Requests are driven through the full router with `tower::ServiceExt`,
//! no socket is bound.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use onboarding_service::api::{create_router, AppState};
use onboarding_service::config::{Config, UserIdStrategy, JOB_NAME_DELETE_EXPIRED_USERS};
use onboarding_service::domain::CreateUserRequest;
use onboarding_service::errors::{AppError, AppResult};
use onboarding_service::scheduler::SchedulerRegistry;
use onboarding_service::services::{OnboardingService, ServiceContainer, Services};

// =============================================================================
// Test Helpers
// =============================================================================

/// Onboarding service answering from a fixed script
struct ScriptedOnboarding {
    seen: Mutex<Vec<String>>,
}

impl ScriptedOnboarding {
    fn new() -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OnboardingService for ScriptedOnboarding {
    async fn create_user(&self, request: CreateUserRequest) -> AppResult<String> {
        self.seen.lock().unwrap().push(request.email.clone());
        match request.email.as_str() {
            "taken@example.com" => Err(AppError::conflict("16532_establish_ws")),
            "boom@example.com" => Err(AppError::event_bus("dispatch failed")),
            _ => Ok("User Created Successfully".to_string()),
        }
    }
}

fn scripted_app() -> (Router, Arc<ScriptedOnboarding>) {
    let onboarding = Arc::new(ScriptedOnboarding::new());
    let state = AppState::new(onboarding.clone(), SchedulerRegistry::new());
    (create_router(state), onboarding)
}

fn bootstrapped_app(config: &Config) -> (Router, Services) {
    let services = Services::bootstrap(config).unwrap();
    let router = create_router(AppState::from_services(&services));
    (router, services)
}

fn post_user(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    serde_json::from_str(&text(response).await).unwrap()
}

// =============================================================================
// Root And Health
// =============================================================================

#[tokio::test]
async fn test_root_returns_greeting() {
    let (app, _) = scripted_app();

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "Hello World!");
}

#[tokio::test(start_paused = true)]
async fn test_health_reports_armed_timers() {
    let (app, services) = bootstrapped_app(&Config::default());

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["timers"], 1);

    services.scheduler().shutdown();
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = scripted_app();

    let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert!(body["paths"]["/users"].is_object());
    assert!(body["paths"]["/timers/{name}"].is_object());
}

// =============================================================================
// User Creation
// =============================================================================

#[tokio::test]
async fn test_create_user_returns_created_confirmation() {
    let (app, onboarding) = scripted_app();

    let response = app
        .oneshot(post_user(r#"{"email":"a@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(text(response).await, "User Created Successfully");
    assert_eq!(*onboarding.seen.lock().unwrap(), vec!["a@example.com"]);
}

#[tokio::test]
async fn test_create_user_rejects_invalid_email() {
    let (app, onboarding) = scripted_app();

    let response = app
        .oneshot(post_user(r#"{"email":"not-an-email"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Invalid email format");
    assert!(onboarding.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_user_rejects_malformed_body() {
    let (app, onboarding) = scripted_app();

    let response = app.oneshot(post_user("{")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["error"]["code"], "BAD_REQUEST");
    assert!(onboarding.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_user_conflict_maps_to_409() {
    let (app, _) = scripted_app();

    let response = app
        .oneshot(post_user(r#"{"email":"taken@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json(response).await["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_create_user_hides_internal_failures() {
    let (app, _) = scripted_app();

    let response = app
        .oneshot(post_user(r#"{"email":"boom@example.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(response).await;
    assert_eq!(body["error"]["code"], "EVENT_BUS_ERROR");
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("dispatch failed"));
}

#[tokio::test(start_paused = true)]
async fn test_static_ids_conflict_while_timeout_pending() {
    let config = Config {
        user_id_strategy: UserIdStrategy::Static,
        ..Config::default()
    };
    let (app, services) = bootstrapped_app(&config);

    let first = app
        .clone()
        .oneshot(post_user(r#"{"email":"a@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(post_user(r#"{"email":"b@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // Once the timeout has fired the name is free again
    tokio::time::sleep(Duration::from_secs(6)).await;
    let third = app
        .oneshot(post_user(r#"{"email":"c@example.com"}"#))
        .await
        .unwrap();
    assert_eq!(third.status(), StatusCode::CREATED);

    services.scheduler().shutdown();
}

// =============================================================================
// Timers
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_timers_list_includes_connection_timeout() {
    let config = Config {
        user_id_strategy: UserIdStrategy::Static,
        ..Config::default()
    };
    let (app, services) = bootstrapped_app(&config);

    app.clone()
        .oneshot(post_user(r#"{"email":"a@example.com"}"#))
        .await
        .unwrap();

    let response = app.oneshot(get("/timers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["16532_establish_ws", JOB_NAME_DELETE_EXPIRED_USERS]);
    assert_eq!(body[0]["kind"], "timeout");
    assert_eq!(body[0]["period_ms"], 5000);
    assert_eq!(body[1]["kind"], "interval");

    services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_get_unknown_timer_is_not_found() {
    let (app, services) = bootstrapped_app(&Config::default());

    let response = app.oneshot(get("/timers/missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"]["code"], "NOT_FOUND");

    services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_delete_timer_cancels_it() {
    let (app, services) = bootstrapped_app(&Config::default());
    let uri = format!("/timers/{}", JOB_NAME_DELETE_EXPIRED_USERS);

    let response = app.clone().oneshot(delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!services.scheduler().contains(JOB_NAME_DELETE_EXPIRED_USERS));

    let again = app.oneshot(delete(&uri)).await.unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}
