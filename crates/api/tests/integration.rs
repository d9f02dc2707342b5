//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to drive the Axum router without binding the API
//! itself, while providers are real in-process HTTP servers on ephemeral ports.
//!
//! ```bash
//! cargo test -p courier-api --test integration -- --nocapture
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use courier_api::routes::create_router;
use courier_api::state::AppState;
use courier_common::config::AppConfig;

// ============================================================
// Helpers
// ============================================================

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Ok,
    Fail,
    Hang,
}

/// A provider HTTP server running on an ephemeral port.
struct MockProvider {
    port: u16,
    hits: Arc<AtomicUsize>,
}

impl MockProvider {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn spawn_provider(behavior: Behavior) -> MockProvider {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    let app = Router::new().route(
        "/api/{kind}/{provider}",
        post(
            move |Path((kind, provider)): Path<(String, String)>, Json(body): Json<Value>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    match behavior {
                        Behavior::Ok => {
                            let message = format!("{kind} sent by {provider}");
                            (StatusCode::OK, Json(json!({"message": message, "echo": body})))
                        }
                        Behavior::Fail => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"error": "provider down"})),
                        ),
                        Behavior::Hang => {
                            tokio::time::sleep(Duration::from_secs(5)).await;
                            (StatusCode::OK, Json(json!({})))
                        }
                    }
                }
            },
        ),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockProvider { port, hits }
}

fn ports(providers: &[&MockProvider]) -> String {
    providers
        .iter()
        .map(|p| p.port.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a test AppConfig with fast backoff and the given rosters.
fn test_config(
    sms: &[&MockProvider],
    email: &[&MockProvider],
    overrides: &[(&str, &str)],
) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("SMS_PROVIDER_PORTS", ports(sms)),
        ("EMAIL_PROVIDER_PORTS", ports(email)),
        ("BACKOFF_BASE_DELAY_MS", "5".to_string()),
        ("BACKOFF_MULTIPLIER", "2".to_string()),
        ("BACKOFF_MAX_ATTEMPTS", "2".to_string()),
        ("BACKOFF_JITTER", "0".to_string()),
        ("PROVIDER_TIMEOUT_MS", "2000".to_string()),
        ("DISPATCH_TIMEOUT_MS", "10000".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

fn build_app(config: AppConfig) -> Router {
    create_router(AppState::from_config(config).unwrap())
}

async fn post_notification(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/notification")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn sms_body() -> String {
    json!({
        "type": "sms",
        "data": {"phone": "01712345678", "text": "Your code is 1234"}
    })
    .to_string()
}

fn email_body() -> String {
    json!({
        "type": "email",
        "data": {"subject": "Hi", "body": "Welcome aboard", "recipients": ["a@example.com"]}
    })
    .to_string()
}

// ============================================================
// Routes
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_app(test_config(&[], &[], &[]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "courier-api");
}

#[tokio::test]
async fn test_sms_relayed_to_provider() {
    let p1 = spawn_provider(Behavior::Ok).await;
    let p2 = spawn_provider(Behavior::Ok).await;
    let app = build_app(test_config(&[&p1, &p2], &[], &[]));

    let (status, json) = post_notification(app, sms_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["result"]["message"], "sms sent by provider1");
    assert_eq!(
        json["result"]["echo"],
        json!({"phone": "01712345678", "text": "Your code is 1234"})
    );
    assert_eq!(p1.hits(), 1);
    assert_eq!(p2.hits(), 0);
}

#[tokio::test]
async fn test_requests_rotate_across_providers() {
    let p1 = spawn_provider(Behavior::Ok).await;
    let p2 = spawn_provider(Behavior::Ok).await;
    let app = build_app(test_config(&[], &[&p1, &p2], &[]));

    let (_, first) = post_notification(app.clone(), email_body()).await;
    let (_, second) = post_notification(app, email_body()).await;

    assert_eq!(first["result"]["message"], "email sent by provider1");
    assert_eq!(second["result"]["message"], "email sent by provider2");
}

#[tokio::test]
async fn test_failover_to_next_provider() {
    let p1 = spawn_provider(Behavior::Fail).await;
    let p2 = spawn_provider(Behavior::Ok).await;
    let p3 = spawn_provider(Behavior::Ok).await;
    let app = build_app(test_config(&[&p1, &p2, &p3], &[], &[]));

    let (status, json) = post_notification(app, sms_body()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["result"]["message"], "sms sent by provider2");
    assert_eq!((p1.hits(), p2.hits(), p3.hits()), (1, 1, 0));
}

#[tokio::test]
async fn test_all_providers_failing_returns_bad_gateway() {
    let p1 = spawn_provider(Behavior::Fail).await;
    let p2 = spawn_provider(Behavior::Fail).await;
    let app = build_app(test_config(&[&p1, &p2], &[], &[]));

    let (status, json) = post_notification(app, sms_body()).await;

    // Two rotations each followed by a pause, then one more failure ends it.
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Failed to send sms after 5 attempts");
    assert_eq!(p1.hits() + p2.hits(), 5);

    let message = json["error"].as_str().unwrap();
    assert!(!message.contains("127.0.0.1"));
    assert!(!message.contains("provider down"));
}

#[tokio::test]
async fn test_empty_roster_returns_unavailable() {
    let p1 = spawn_provider(Behavior::Ok).await;
    let app = build_app(test_config(&[&p1], &[], &[]));

    let (status, json) = post_notification(app, email_body()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "No email providers are available");
    assert_eq!(p1.hits(), 0);
}

#[tokio::test]
async fn test_dispatch_deadline_returns_gateway_timeout() {
    let p1 = spawn_provider(Behavior::Hang).await;
    let app = build_app(test_config(&[&p1], &[], &[("DISPATCH_TIMEOUT_MS", "100")]));

    let (status, json) = post_notification(app, sms_body()).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["success"], false);
}

// ============================================================
// Validation
// ============================================================

#[tokio::test]
async fn test_invalid_phone_rejected_without_sending() {
    let p1 = spawn_provider(Behavior::Ok).await;
    let app = build_app(test_config(&[&p1], &[], &[]));

    let body = json!({"type": "sms", "data": {"phone": "12345", "text": "hi"}}).to_string();
    let (status, json) = post_notification(app, body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("data.phone"));
    assert_eq!(p1.hits(), 0);
}

#[tokio::test]
async fn test_empty_recipients_rejected() {
    let app = build_app(test_config(&[], &[], &[]));

    let body = json!({
        "type": "email",
        "data": {"subject": "Hi", "body": "There", "recipients": []}
    })
    .to_string();
    let (status, _) = post_notification(app, body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_type_rejected() {
    let app = build_app(test_config(&[], &[], &[]));

    let body = json!({"type": "fax", "data": {"number": "1"}}).to_string();
    let (status, json) = post_notification(app, body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let app = build_app(test_config(&[], &[], &[]));

    let (status, json) = post_notification(app, "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}
