//! HTTP integration tests
//!
//! Drives the full router (state, layers, handlers) with `oneshot` requests
//! against an in-memory store and a private notification bus.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use zoo_schedule::server::{router, state::AppState};
use zoo_schedule::{
    CalendarEvent, ChangeNotification, ChangeOp, EventCommands, MemoryEventStore,
    NotificationBus, StreamConfig, ValidationPolicy,
};

const SECRET: &str = "tierpfleger";

struct TestApp {
    app: Router,
    bus: NotificationBus,
    seen: Arc<Mutex<Vec<ChangeNotification>>>,
    _sub: zoo_schedule::Subscription,
}

fn test_app() -> TestApp {
    let bus = NotificationBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let sub = bus.subscribe(move |n| s.lock().unwrap().push(n.clone()));

    let commands = EventCommands::new(
        Arc::new(MemoryEventStore::new()),
        bus.clone(),
        ValidationPolicy::default(),
    );
    let state = AppState::new(commands, StreamConfig::default(), Some(SECRET.to_string()));

    TestApp {
        app: router::build(state),
        bus,
        seen,
        _sub: sub,
    }
}

impl TestApp {
    fn seen(&self) -> Vec<ChangeNotification> {
        self.seen.lock().unwrap().clone()
    }

    async fn send(&self, req: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(req).await.unwrap()
    }

    async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = self.send(req).await;
        let status = resp.status();
        (status, json_body(resp).await)
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = self.send(req).await;
        let status = resp.status();
        (status, json_body(resp).await)
    }
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

fn event_body(title: &str, date: &str) -> serde_json::Value {
    serde_json::json!({ "title": title, "date": date, "type": "Veranstaltung" })
}

// ─── Insert ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_insert_returns_event_and_notifies() {
    let t = test_app();
    let (status, body) = t
        .post_json("/events/insert", event_body("Robbenfütterung", "2025-07-04"))
        .await;

    assert_eq!(status, StatusCode::OK);
    let event: CalendarEvent = serde_json::from_value(body).unwrap();
    assert_eq!(event.title, "Robbenfütterung");
    assert_eq!(event.date.to_string(), "2025-07-04");
    assert_eq!(
        t.seen(),
        vec![ChangeNotification::mutation(ChangeOp::Insert, &event.id)]
    );
}

#[tokio::test]
async fn test_insert_validation_errors_are_400() {
    let t = test_app();
    let cases = [
        (serde_json::json!({}), "title, date, type are required"),
        (event_body("X", "2025-07-04"), "title is too short"),
        (event_body("Zaun", "04.07.2025"), "date must be YYYY-MM-DD"),
        (
            serde_json::json!({ "title": "Zaun", "date": "2025-07-04", "type": "Party" }),
            "type is invalid",
        ),
    ];

    for (payload, message) in cases {
        let (status, body) = t.post_json("/events/insert", payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], message);
    }
    assert!(t.seen().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let t = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/events/insert")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let resp = t.send(req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"], "invalid JSON body");
}

// ─── Update / Delete ─────────────────────────────────────────────

#[tokio::test]
async fn test_update_and_delete_lifecycle() {
    let t = test_app();
    let (_, created) = t
        .post_json("/events/insert", event_body("Nachtführung", "2025-10-31"))
        .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = t
        .post_json(
            "/events/update",
            serde_json::json!({
                "id": id,
                "title": "Nachtführung (Halloween)",
                "date": "2025-10-31",
                "type": "Veranstaltung",
                "description": "mit Kürbissen",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Nachtführung (Halloween)");
    assert_eq!(updated["created_at"], created["created_at"]);

    let (status, body) = t
        .post_json("/events/delete", serde_json::json!({ "id": id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "ok": true }));

    let ops: Vec<_> = t.seen().into_iter().filter_map(|n| n.op).collect();
    assert_eq!(ops, vec![ChangeOp::Insert, ChangeOp::Update, ChangeOp::Delete]);
}

#[tokio::test]
async fn test_missing_ids_are_404_without_notification() {
    let t = test_app();

    let (status, body) = t
        .post_json("/events/delete", serde_json::json!({ "id": "nope" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");

    let (status, _) = t
        .post_json(
            "/events/update",
            serde_json::json!({
                "id": "nope",
                "title": "Irgendwas",
                "date": "2025-01-01",
                "type": "Sonstiges",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = t.post_json("/events/delete", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "id required");

    assert!(t.seen().is_empty());
}

// ─── Range ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_range_query() {
    let t = test_app();
    t.post_json("/events/insert", event_body("Später", "2025-03-20"))
        .await;
    t.post_json("/events/insert", event_body("Früher", "2025-03-02"))
        .await;
    t.post_json("/events/insert", event_body("Draußen", "2025-05-01"))
        .await;

    let (status, body) = t
        .get_json("/events/range?from=2025-03-31&to=2025-03-01")
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Früher", "Später"]);
}

#[tokio::test]
async fn test_range_errors() {
    let t = test_app();

    let (status, body) = t.get_json("/events/range").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "from/to required");

    let (status, body) = t.get_json("/events/range?from=2025-1-1&to=2025-02-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "from/to must be YYYY-MM-DD");

    let (status, body) = t.get_json("/events/range?from=2025-01-01&to=2026-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("range too large"));
}

// ─── Headers ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_responses_disable_caching() {
    let t = test_app();
    let req = Request::builder()
        .uri("/events/range?from=2025-01-01&to=2025-01-31")
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CACHE_CONTROL],
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(resp.headers()[header::PRAGMA], "no-cache");
    assert_eq!(resp.headers()[header::EXPIRES], "0");

    // Error responses carry the same headers
    let req = Request::builder()
        .method(Method::POST)
        .uri("/events/delete")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let resp = t.send(req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers()[header::CACHE_CONTROL],
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(resp.headers()[header::PRAGMA], "no-cache");
}

#[tokio::test]
async fn test_options_preflight() {
    let t = test_app();
    for uri in ["/events/insert", "/events/range", "/events/stream", "/events/webhook"] {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = t.send(req).await;
        assert!(resp.status().is_success(), "{uri}: {}", resp.status());
        assert_eq!(json_body(resp).await, serde_json::Value::Null);
    }
    assert_eq!(t.bus.subscriber_count(), 1);
}

#[tokio::test]
async fn test_cors_preflight_disables_caching() {
    let t = test_app();
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/events/insert")
        .header(header::ORIGIN, "http://calendar.zoo.local")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert!(resp.status().is_success(), "{}", resp.status());
    assert!(resp
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert_eq!(
        resp.headers()[header::CACHE_CONTROL],
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(resp.headers()[header::PRAGMA], "no-cache");
    assert_eq!(resp.headers()[header::EXPIRES], "0");
}

// ─── Webhook ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_webhook_secret_via_header_or_query() {
    let t = test_app();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/events/webhook")
        .header("x-webhook-secret", SECRET)
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!({ "ok": true }));

    let req = Request::builder()
        .method(Method::POST)
        .uri(format!("/events/webhook?secret={SECRET}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(t.send(req).await.status(), StatusCode::OK);

    assert_eq!(
        t.seen(),
        vec![ChangeNotification::changed(), ChangeNotification::changed()]
    );
}

#[tokio::test]
async fn test_webhook_wrong_secret_is_401() {
    let t = test_app();

    for uri in ["/events/webhook", "/events/webhook?secret=falsch"] {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = t.send(req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(resp).await["error"], "unauthorized");
    }
    assert!(t.seen().is_empty());
}

#[tokio::test]
async fn test_webhook_without_configured_secret_is_401() {
    let commands = EventCommands::new(
        Arc::new(MemoryEventStore::new()),
        NotificationBus::new(),
        ValidationPolicy::default(),
    );
    let app = router::build(AppState::new(commands, StreamConfig::default(), None));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/events/webhook?secret=")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ─── Stream ──────────────────────────────────────────────────────

async fn next_chunk(body: &mut (impl futures::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin)) -> String {
    let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("stream produced no frame in time")
        .expect("stream ended")
        .unwrap();
    String::from_utf8(chunk.to_vec()).unwrap()
}

#[tokio::test]
async fn test_stream_sends_retry_then_notifications() {
    let t = test_app();
    let req = Request::builder()
        .uri("/events/stream")
        .body(Body::empty())
        .unwrap();
    let resp = t.send(req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-cache, no-transform");
    assert_eq!(t.bus.subscriber_count(), 2);

    let mut body = resp.into_body().into_data_stream();
    assert_eq!(next_chunk(&mut body).await, "retry: 5000\n\n");

    let (_, created) = t
        .post_json("/events/insert", event_body("Giraffen", "2025-04-12"))
        .await;
    let id = created["id"].as_str().unwrap();

    assert_eq!(
        next_chunk(&mut body).await,
        format!("data: {{\"event\":\"changed\",\"op\":\"insert\",\"id\":\"{id}\"}}\n\n")
    );
}

#[tokio::test(start_paused = true)]
async fn test_stream_keepalive_is_comment_frame() {
    let t = test_app();
    let req = Request::builder()
        .uri("/events/stream")
        .body(Body::empty())
        .unwrap();
    let mut body = t.send(req).await.into_body().into_data_stream();

    assert_eq!(next_chunk(&mut body).await, "retry: 5000\n\n");

    // Paused time auto-advances to the first keep-alive tick
    let chunk = body.next().await.expect("stream ended").unwrap();
    assert_eq!(String::from_utf8(chunk.to_vec()).unwrap(), ": keepalive\n\n");
}

#[tokio::test]
async fn test_stream_disconnect_releases_subscription() {
    let t = test_app();
    let baseline = t.bus.subscriber_count();

    for _ in 0..5 {
        let req = Request::builder()
            .uri("/events/stream")
            .body(Body::empty())
            .unwrap();
        let resp = t.send(req).await;
        assert_eq!(t.bus.subscriber_count(), baseline + 1);

        let mut body = resp.into_body().into_data_stream();
        next_chunk(&mut body).await;
        drop(body);

        assert_eq!(t.bus.subscriber_count(), baseline);
    }

    // Publishing after every client left reaches only the test observer
    assert_eq!(t.bus.publish(&ChangeNotification::changed()), baseline);
}

#[tokio::test]
async fn test_each_stream_receives_every_notification() {
    let t = test_app();
    let mut bodies = Vec::new();
    for _ in 0..3 {
        let req = Request::builder()
            .uri("/events/stream")
            .body(Body::empty())
            .unwrap();
        let mut body = t.send(req).await.into_body().into_data_stream();
        next_chunk(&mut body).await;
        bodies.push(body);
    }

    let req = Request::builder()
        .method(Method::POST)
        .uri("/events/webhook")
        .header("x-webhook-secret", SECRET)
        .body(Body::empty())
        .unwrap();
    assert_eq!(t.send(req).await.status(), StatusCode::OK);

    for body in &mut bodies {
        let frame = next_chunk(body).await;
        assert_eq!(
            zoo_schedule::stream::parse_data_frames(&frame),
            vec![r#"{"event":"changed"}"#]
        );
    }
}

// ─── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_store_and_subscribers() {
    let t = test_app();
    let (status, body) = t.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["subscribers"], 1);
}
