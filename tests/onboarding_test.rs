//! Onboarding flow tests.
//!
//! Run on a paused tokio clock so delays of several seconds complete
//! instantly and deterministically.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use onboarding_service::config::{Config, EVENT_USER_CREATED, JOB_NAME_DELETE_EXPIRED_USERS};
use onboarding_service::domain::{CreateUserRequest, UserCreatedEvent, UuidUserId};
use onboarding_service::errors::AppResult;
use onboarding_service::infra::WsGateway;
use onboarding_service::scheduler::TimerKind;
use onboarding_service::services::{ServiceContainer, Services};

// =============================================================================
// Test Helpers
// =============================================================================

/// Gateway recording every connection it is asked to open
#[derive(Default)]
struct RecordingGateway {
    connected: Mutex<Vec<String>>,
}

impl RecordingGateway {
    fn connected(&self) -> Vec<String> {
        self.connected.lock().unwrap().clone()
    }
}

#[async_trait]
impl WsGateway for RecordingGateway {
    async fn establish(&self, user_id: &str) -> AppResult<()> {
        self.connected.lock().unwrap().push(user_id.to_string());
        Ok(())
    }
}

type Seen = Arc<Mutex<Vec<UserCreatedEvent>>>;

struct Harness {
    services: Services,
    gateway: Arc<RecordingGateway>,
    inline: Seen,
    background: Seen,
}

/// Bootstrap the services and attach one recording listener of each kind.
fn harness() -> Harness {
    let gateway = Arc::new(RecordingGateway::default());
    let services =
        Services::bootstrap_with(&Config::default(), Arc::new(UuidUserId), gateway.clone())
            .unwrap();

    let inline: Seen = Arc::default();
    let background: Seen = Arc::default();

    let sink = inline.clone();
    services
        .events()
        .on::<UserCreatedEvent, _>("record_inline", move |event| {
            sink.lock().unwrap().push(event.clone());
        })
        .unwrap();

    let sink = background.clone();
    services
        .events()
        .on_async::<UserCreatedEvent, _, _>("record_background", move |event| {
            let sink = sink.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(3)).await;
                sink.lock().unwrap().push(event);
                Ok(())
            }
        })
        .unwrap();

    Harness {
        services,
        gateway,
        inline,
        background,
    }
}

async fn create(harness: &Harness, email: &str) -> String {
    harness
        .services
        .onboarding()
        .create_user(CreateUserRequest::new(email))
        .await
        .unwrap()
}

// =============================================================================
// User Creation
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_create_user_returns_confirmation_without_waiting() {
    let harness = harness();
    let before = Instant::now();

    let reply = create(&harness, "a@example.com").await;

    assert_eq!(reply, "User Created Successfully");
    assert_eq!(Instant::now(), before);
    assert_eq!(harness.inline.lock().unwrap().len(), 1);
    assert!(harness.background.lock().unwrap().is_empty());
    assert!(harness.gateway.connected().is_empty());

    harness.services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_exactly_one_event_published_per_user() {
    let harness = harness();

    create(&harness, "a@example.com").await;

    let events = harness.inline.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].email, "a@example.com");
    assert!(!events[0].user_id.is_empty());

    harness.services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_listeners_receive_the_same_payload_once() {
    let harness = harness();
    assert_eq!(harness.services.events().listener_count(EVENT_USER_CREATED), 4);

    create(&harness, "a@example.com").await;
    tokio::time::sleep(Duration::from_secs(4)).await;

    let inline = harness.inline.lock().unwrap().clone();
    let background = harness.background.lock().unwrap().clone();
    assert_eq!(inline.len(), 1);
    assert_eq!(inline, background);

    harness.services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_background_listener_finishes_after_the_reply() {
    let harness = harness();

    create(&harness, "a@example.com").await;
    assert!(harness.background.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(2_999)).await;
    assert!(harness.background.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(harness.background.lock().unwrap().len(), 1);

    harness.services.scheduler().shutdown();
}

// =============================================================================
// Connection Timeout
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_connection_timeout_is_registered_by_name() {
    let harness = harness();

    create(&harness, "a@example.com").await;
    let user_id = harness.inline.lock().unwrap()[0].user_id.clone();

    let timer = harness
        .services
        .scheduler()
        .get(&format!("{}_establish_ws", user_id))
        .expect("timeout should be registered");

    assert_eq!(timer.kind, TimerKind::Timeout);
    assert_eq!(timer.period_ms, 5_000);
    assert_eq!(timer.runs, 0);

    harness.services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_connection_established_once_not_before_delay() {
    let harness = harness();

    create(&harness, "a@example.com").await;
    let user_id = harness.inline.lock().unwrap()[0].user_id.clone();

    tokio::time::sleep(Duration::from_millis(4_999)).await;
    assert!(harness.gateway.connected().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(harness.gateway.connected(), vec![user_id.clone()]);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(harness.gateway.connected(), vec![user_id.clone()]);
    assert!(!harness
        .services
        .scheduler()
        .contains(&format!("{}_establish_ws", user_id)));

    harness.services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_each_user_gets_its_own_timeout() {
    let harness = harness();

    create(&harness, "a@example.com").await;
    create(&harness, "b@example.com").await;

    tokio::time::sleep(Duration::from_secs(6)).await;

    let mut connected = harness.gateway.connected();
    connected.sort();
    let mut expected: Vec<String> = harness
        .inline
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.user_id.clone())
        .collect();
    expected.sort();

    assert_eq!(connected.len(), 2);
    assert_eq!(connected, expected);

    harness.services.scheduler().shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_timeout_never_connects() {
    let harness = harness();

    create(&harness, "a@example.com").await;
    let user_id = harness.inline.lock().unwrap()[0].user_id.clone();

    assert!(harness
        .services
        .scheduler()
        .cancel(&format!("{}_establish_ws", user_id)));

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(harness.gateway.connected().is_empty());

    harness.services.scheduler().shutdown();
}

// =============================================================================
// Cleanup Job
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_cleanup_job_runs_without_any_user() {
    let harness = harness();
    let scheduler = harness.services.scheduler();

    tokio::time::sleep(Duration::from_millis(9_999)).await;
    assert_eq!(scheduler.get(JOB_NAME_DELETE_EXPIRED_USERS).unwrap().runs, 0);

    tokio::time::sleep(Duration::from_secs(25)).await;
    let job = scheduler.get(JOB_NAME_DELETE_EXPIRED_USERS).unwrap();
    assert_eq!(job.kind, TimerKind::Interval);
    assert_eq!(job.runs, 3);

    scheduler.shutdown();
}
