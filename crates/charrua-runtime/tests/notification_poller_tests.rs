//! Integration tests for the notification poller
//!
//! Time is paused so the 30 second polling period runs instantly.

use charrua_core::models::AuthSession;
use charrua_core::{AppLifecycleState, ClientConfig, HttpMethod};
use charrua_harness::{fixtures, MockTransport, Reply};
use charrua_runtime::{CharruaRuntime, LogoutReason, PushNotification, RuntimeBuilder};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const COUNT: &str = "/notificaciones/no-leidas/count";
const LIST: &str = "/notificaciones";

fn create_polling_runtime(transport: Arc<MockTransport>) -> CharruaRuntime {
    let session: AuthSession = serde_json::from_value(fixtures::session_json()).unwrap();
    transport
        .always(HttpMethod::Get, COUNT, Reply::ok(json!({ "count": 3 })))
        .always(
            HttpMethod::Get,
            LIST,
            Reply::ok(fixtures::page_json(
                vec![fixtures::notificacion_json(1, false)],
                0,
                5,
                1,
            )),
        )
        .always(HttpMethod::Post, "/auth/logout", Reply::no_content());

    RuntimeBuilder::new()
        .with_config(ClientConfig::testing())
        .with_transport(transport)
        .with_session(session)
        .build_and_start()
        .expect("runtime should start")
}

#[tokio::test(start_paused = true)]
async fn test_polls_every_interval_in_foreground() {
    let transport = Arc::new(MockTransport::new());
    let mut runtime = create_polling_runtime(transport.clone());

    // initial refresh, then ticks at 30s, 60s and 90s
    sleep(Duration::from_secs(95)).await;

    assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 4);
    assert_eq!(runtime.notifications().unread_count(), 3);
    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_background_pauses_polling_and_foreground_refreshes() {
    let transport = Arc::new(MockTransport::new());
    let mut runtime = create_polling_runtime(transport.clone());
    sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 1);

    runtime.set_lifecycle(AppLifecycleState::Background);
    sleep(Duration::from_secs(120)).await;
    assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 1);

    runtime.set_lifecycle(AppLifecycleState::Active);
    sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 2);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_push_refreshes_count_and_list() {
    let transport = Arc::new(MockTransport::new());
    let mut runtime = create_polling_runtime(transport.clone());
    sleep(Duration::from_secs(1)).await;

    let delivered = runtime.push_dispatcher().notify(PushNotification {
        title: Some("Tu viaje sale pronto".to_string()),
        body: None,
    });
    assert!(delivered);
    sleep(Duration::from_secs(1)).await;

    assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 2);
    assert_eq!(transport.request_count(HttpMethod::Get, LIST), 1);
    assert_eq!(runtime.notifications().notifications().len(), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_logout_stops_polling_and_clears_inbox() {
    let transport = Arc::new(MockTransport::new());
    let mut runtime = create_polling_runtime(transport.clone());
    sleep(Duration::from_secs(1)).await;
    assert_eq!(runtime.notifications().unread_count(), 3);

    runtime.session().logout(LogoutReason::UserRequested).await;
    sleep(Duration::from_secs(65)).await;

    assert_eq!(transport.request_count(HttpMethod::Get, COUNT), 1);
    assert_eq!(runtime.notifications().unread_count(), 0);
    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_never_overlaps_requests() {
    let transport = Arc::new(MockTransport::new());
    transport.delay(HttpMethod::Get, COUNT, Duration::from_secs(45));
    let mut runtime = create_polling_runtime(transport.clone());

    runtime.push_dispatcher().notify(PushNotification::default());
    sleep(Duration::from_secs(200)).await;

    assert_eq!(transport.max_concurrent(), 1);
    runtime.shutdown().await.unwrap();
}
