//! API integration tests for the MicDrop backend.
//!
//! Drives the axum router end-to-end against an in-memory database:
//! party lifecycle, queue fairness over the wire, the playback clock and
//! the advance idempotency guarantees.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::{Service, ServiceExt};

use micdrop_backend::api;
use micdrop_backend::infrastructure::app_state::AppState;

/// Helper to create a test application
async fn create_test_app() -> Router {
    // Set test environment
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("JWT_SECRET", "test-secret-key");

    let state = AppState::new().await.expect("Failed to create app state");
    let state = Arc::new(state);

    Router::new()
        .nest("/api", api::routes::create_api_router(state.clone()))
        .with_state(state)
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = ServiceExt::<Request<Body>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a POST request with JSON body
async fn post_json(app: &mut Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Helper to make a POST request with a host token
async fn post_json_auth(
    app: &mut Router,
    path: &str,
    body: Value,
    token: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Helper to make a GET request
async fn get(app: &mut Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Helper to make a DELETE request with optional JSON body and token
async fn delete_json(
    app: &mut Router,
    path: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("DELETE").uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send(app, request).await
}

/// Create a party and return (party_id, host_token)
async fn create_party(app: &mut Router, name: &str) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/api/party",
        json!({"name": name, "hostName": "Sam"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        body["party"]["id"].as_str().unwrap().to_string(),
        body["hostToken"].as_str().unwrap().to_string(),
    )
}

/// Submit a pre-resolved song and return the item id
async fn add_song(
    app: &mut Router,
    party_id: &str,
    singer: &str,
    title: &str,
    duration_seconds: i64,
) -> String {
    let (status, body) = post_json(
        app,
        &format!("/api/queue/{}/items", party_id),
        json!({
            "singerName": singer,
            "song": {"title": title, "durationSeconds": duration_seconds}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["item"]["id"].as_str().unwrap().to_string()
}

fn unplayed_singers(snapshot: &Value) -> Vec<String> {
    snapshot["unplayed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["singerName"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Party lifecycle
// ============================================================================

#[tokio::test]
async fn test_create_party_defaults() {
    let mut app = create_test_app().await;

    let (status, body) = post_json(
        &mut app,
        "/api/party",
        json!({"name": "Friday Night", "hostName": "Sam"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["party"]["status"], "open");
    assert_eq!(body["party"]["settings"]["fairnessEnabled"], true);
    assert_eq!(body["party"]["joinCode"].as_str().unwrap().len(), 8);
    assert!(body["hostToken"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn test_create_party_requires_name() {
    let mut app = create_test_app().await;

    let (status, body) = post_json(
        &mut app,
        "/api/party",
        json!({"name": "", "hostName": "Sam"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_PARTY");
}

#[tokio::test]
async fn test_join_party_returns_snapshot() {
    let mut app = create_test_app().await;
    let (party_id, _token) = create_party(&mut app, "Joiners").await;

    let (status, body) = post_json(
        &mut app,
        &format!("/api/party/{}/join", party_id),
        json!({"name": "Ana"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstJoin"], true);
    assert_eq!(body["snapshot"]["status"], "open");
    assert!(body["snapshot"]["unplayed"].as_array().unwrap().is_empty());

    // Rejoin is an upsert, not a second first-join
    let (_, body) = post_json(
        &mut app,
        &format!("/api/party/{}/join", party_id),
        json!({"name": "Ana"}),
    )
    .await;
    assert_eq!(body["firstJoin"], false);
}

#[tokio::test]
async fn test_resolve_join_code() {
    let mut app = create_test_app().await;

    let (status, body) = post_json(
        &mut app,
        "/api/party",
        json!({"name": "Coded", "hostName": "Sam"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let party_id = body["party"]["id"].as_str().unwrap().to_string();
    let join_code = body["party"]["joinCode"].as_str().unwrap().to_string();

    let (status, body) = get(&mut app, &format!("/api/party/code/{}", join_code)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["party"]["id"], party_id.as_str());

    let (status, body) = get(&mut app, "/api/party/code/WRONG123").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "JOIN_CODE_NOT_FOUND");
}

#[tokio::test]
async fn test_join_unknown_party_is_not_found() {
    let mut app = create_test_app().await;

    let (status, body) = post_json(
        &mut app,
        "/api/party/nope/join",
        json!({"name": "Ana"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTY_NOT_FOUND");
}

#[tokio::test]
async fn test_start_requires_host_token() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Locked").await;

    let (status, _) = post_json(&mut app, &format!("/api/party/{}/start", party_id), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);

    // Starting an already-started party is a silent no-op
    let (status, body) =
        post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
}

#[tokio::test]
async fn test_host_token_is_party_scoped() {
    let mut app = create_test_app().await;
    let (party_a, _token_a) = create_party(&mut app, "A").await;
    let (_party_b, token_b) = create_party(&mut app, "B").await;

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/party/{}/start", party_a), json!({}), &token_b)
            .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_PARTY_HOST");
}

#[tokio::test]
async fn test_close_party_is_terminal() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Ending").await;

    let (status, body) =
        post_json_auth(&mut app, &format!("/api/party/{}/close", party_id), json!({}), &token)
            .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);

    // No further mutation is accepted
    let (status, body) = post_json(
        &mut app,
        &format!("/api/queue/{}/items", party_id),
        json!({"singerName": "Ana", "song": {"title": "Too late", "durationSeconds": 180}}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PARTY_CLOSED");

    let (status, body) = post_json(
        &mut app,
        &format!("/api/party/{}/join", party_id),
        json!({"name": "Late"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PARTY_CLOSED");

    let (_, body) =
        post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token)
            .await;
    assert_eq!(body["applied"], false);
}

// ============================================================================
// Queue ordering over the wire
// ============================================================================

#[tokio::test]
async fn test_fairness_round_robin_over_the_wire() {
    let mut app = create_test_app().await;
    let (party_id, _token) = create_party(&mut app, "Fairness").await;

    add_song(&mut app, &party_id, "Ana", "first", 200).await;
    add_song(&mut app, &party_id, "Ben", "second", 200).await;
    add_song(&mut app, &party_id, "Cara", "third", 200).await;
    add_song(&mut app, &party_id, "Ana", "fourth", 200).await;

    let (status, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        unplayed_singers(&body["snapshot"]),
        vec!["Ana", "Ben", "Cara", "Ana"]
    );
}

#[tokio::test]
async fn test_fifo_mode_orders_by_submission() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "FIFO").await;

    add_song(&mut app, &party_id, "Ana", "one", 200).await;
    add_song(&mut app, &party_id, "Ana", "two", 200).await;
    add_song(&mut app, &party_id, "Ben", "three", 200).await;

    // Fairness interleaves Ana and Ben
    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Ana", "Ben", "Ana"]);

    // FIFO restores raw submission order
    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/party/{}/settings/fairness", party_id),
        json!({"enabled": false}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Ana", "Ana", "Ben"]);
}

#[tokio::test]
async fn test_priority_jumps_the_queue() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Priority").await;

    add_song(&mut app, &party_id, "Ana", "one", 200).await;
    add_song(&mut app, &party_id, "Ben", "two", 200).await;
    let cara_item = add_song(&mut app, &party_id, "Cara", "birthday song", 200).await;

    let (status, _) = post_json_auth(
        &mut app,
        &format!("/api/queue/{}/items/{}/priority", party_id, cara_item),
        json!({"isPriority": true}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(body["snapshot"]["unplayed"][0]["id"], cara_item.as_str());
}

#[tokio::test]
async fn test_remove_item_is_singer_scoped() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Removals").await;

    let ana_item = add_song(&mut app, &party_id, "Ana", "mine", 200).await;
    let ben_item = add_song(&mut app, &party_id, "Ben", "his", 200).await;

    // Ben cannot delete Ana's item
    let (status, body) = delete_json(
        &mut app,
        &format!("/api/queue/{}/items/{}", party_id, ana_item),
        Some(json!({"singerName": "Ben"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_ITEM_OWNER");

    // Ana can delete her own
    let (status, _) = delete_json(
        &mut app,
        &format!("/api/queue/{}/items/{}", party_id, ana_item),
        Some(json!({"singerName": "Ana"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The host can delete anyone's
    let (status, _) = delete_json(
        &mut app,
        &format!("/api/queue/{}/items/{}", party_id, ben_item),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert!(body["snapshot"]["unplayed"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_order_reorder_flow() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Manual").await;

    let a = add_song(&mut app, &party_id, "Ana", "one", 200).await;
    let b = add_song(&mut app, &party_id, "Ben", "two", 200).await;
    let c = add_song(&mut app, &party_id, "Cara", "three", 200).await;

    // Reorder without manual mode active is a no-op
    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/queue/{}/reorder", party_id),
        json!({"order": [c.as_str(), b.as_str(), a.as_str()]}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);

    let (status, _) = post_json_auth(
        &mut app,
        &format!("/api/party/{}/settings/manualOrder", party_id),
        json!({"enabled": true}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = post_json_auth(
        &mut app,
        &format!("/api/queue/{}/reorder", party_id),
        json!({"order": [c.as_str(), b.as_str(), a.as_str()]}),
        &token,
    )
    .await;
    assert_eq!(body["applied"], true);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Cara", "Ben", "Ana"]);

    // Back to automatic: the manual permutation is discarded
    let (_, _) = post_json_auth(
        &mut app,
        &format!("/api/party/{}/settings/manualOrder", party_id),
        json!({"enabled": false}),
        &token,
    )
    .await;
    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Ana", "Ben", "Cara"]);
}

#[tokio::test]
async fn test_reorder_rejects_unknown_items() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "BadOrder").await;

    add_song(&mut app, &party_id, "Ana", "one", 200).await;
    post_json_auth(
        &mut app,
        &format!("/api/party/{}/settings/manualOrder", party_id),
        json!({"enabled": true}),
        &token,
    )
    .await;

    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/queue/{}/reorder", party_id),
        json!({"order": ["not-an-item"]}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ORDER");
}

#[tokio::test]
async fn test_malformed_duration_falls_back_to_bounded_random() {
    let mut app = create_test_app().await;
    let (party_id, _token) = create_party(&mut app, "Fallback").await;

    let (status, body) = post_json(
        &mut app,
        &format!("/api/queue/{}/items", party_id),
        json!({
            "singerName": "Ana",
            "song": {"title": "mystery tune", "duration": "banana"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let duration = body["item"]["durationSeconds"].as_i64().unwrap();
    assert!((180..=240).contains(&duration), "got {}", duration);
}

#[tokio::test]
async fn test_iso8601_duration_is_parsed() {
    let mut app = create_test_app().await;
    let (party_id, _token) = create_party(&mut app, "Parsed").await;

    let (_, body) = post_json(
        &mut app,
        &format!("/api/queue/{}/items", party_id),
        json!({
            "singerName": "Ana",
            "song": {"title": "timed tune", "duration": "PT3M45S"}
        }),
    )
    .await;

    assert_eq!(body["item"]["durationSeconds"], 225);
}

// ============================================================================
// Playback clock
// ============================================================================

#[tokio::test]
async fn test_play_pause_scrub_flow() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Clock").await;

    add_song(&mut app, &party_id, "Ana", "opener", 200).await;
    post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token).await;

    // Scrub 45s into a 200s item
    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/playback/{}/play", party_id),
        json!({"seekSeconds": 45}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert_eq!(body["remainingSeconds"], 155);
    assert!(body["startedAt"].as_i64().unwrap() > 0);

    // Pause within the same second conserves the remaining time
    let (_, body) = post_json_auth(
        &mut app,
        &format!("/api/playback/{}/pause", party_id),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(body["applied"], true);
    assert_eq!(body["remainingSeconds"], 155);

    // Resume without a seek picks up where pause left off
    let (_, body) = post_json_auth(
        &mut app,
        &format!("/api/playback/{}/play", party_id),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(body["remainingSeconds"], 155);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(body["snapshot"]["clock"]["state"], "playing");
}

#[tokio::test]
async fn test_play_before_start_is_silently_ignored() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "NotYet").await;

    add_song(&mut app, &party_id, "Ana", "waiting", 200).await;

    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/playback/{}/play", party_id),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
}

#[tokio::test]
async fn test_pause_without_playing_is_silently_ignored() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Idle").await;

    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/playback/{}/pause", party_id),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
}

#[tokio::test]
async fn test_intermission_clears_the_clock() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Break").await;

    add_song(&mut app, &party_id, "Ana", "opener", 200).await;
    post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token).await;
    post_json_auth(&mut app, &format!("/api/playback/{}/play", party_id), json!({}), &token).await;

    let (status, body) = post_json_auth(
        &mut app,
        &format!("/api/party/{}/intermission", party_id),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(body["snapshot"]["status"], "open");
    assert_eq!(body["snapshot"]["clock"]["state"], "idle");
    assert!(body["snapshot"]["clock"]["startedAt"].is_null());
}

// ============================================================================
// Advance
// ============================================================================

#[tokio::test]
async fn test_advance_marks_played_and_loads_next_head() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Advance").await;

    let first = add_song(&mut app, &party_id, "Ana", "one", 200).await;
    add_song(&mut app, &party_id, "Ben", "two", 180).await;
    post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token).await;

    let (status, body) = post_json(
        &mut app,
        &format!("/api/playback/{}/advance", party_id),
        json!({"itemId": first.as_str()}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], true);
    assert_eq!(body["advanced"]["id"], first.as_str());

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(body["snapshot"]["played"].as_array().unwrap().len(), 1);
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Ben"]);
    // The next head is loaded paused with its full duration
    assert_eq!(body["snapshot"]["clock"]["state"], "paused");
    assert_eq!(body["snapshot"]["clock"]["remainingSeconds"], 180);
}

#[tokio::test]
async fn test_duplicate_advance_for_same_item_is_noop() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Race").await;

    let first = add_song(&mut app, &party_id, "Ana", "one", 200).await;
    add_song(&mut app, &party_id, "Ben", "two", 200).await;
    post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token).await;

    // Two surfaces race to skip the same item; the second resolves as a no-op
    let (_, body) = post_json(
        &mut app,
        &format!("/api/playback/{}/advance", party_id),
        json!({"itemId": first.as_str()}),
    )
    .await;
    assert_eq!(body["applied"], true);

    let (status, body) = post_json(
        &mut app,
        &format!("/api/playback/{}/advance", party_id),
        json!({"itemId": first.as_str()}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);

    // Exactly one item was consumed
    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(body["snapshot"]["played"].as_array().unwrap().len(), 1);
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Ben"]);
}

#[tokio::test]
async fn test_advance_while_open_is_noop() {
    let mut app = create_test_app().await;
    let (party_id, _token) = create_party(&mut app, "Early").await;

    let item = add_song(&mut app, &party_id, "Ana", "one", 200).await;

    let (status, body) = post_json(
        &mut app,
        &format!("/api/playback/{}/advance", party_id),
        json!({"itemId": item}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert!(body["snapshot"]["played"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_advance_rotates_turns_in_fairness_mode() {
    let mut app = create_test_app().await;
    let (party_id, token) = create_party(&mut app, "Turns").await;

    add_song(&mut app, &party_id, "Ana", "a1", 200).await;
    add_song(&mut app, &party_id, "Ben", "b1", 200).await;
    add_song(&mut app, &party_id, "Ana", "a2", 200).await;
    add_song(&mut app, &party_id, "Ben", "b2", 200).await;
    post_json_auth(&mut app, &format!("/api/party/{}/start", party_id), json!({}), &token).await;

    // Ana's first song plays; afterwards Ben must be up, never Ana again
    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    let head = body["snapshot"]["unplayed"][0]["id"].as_str().unwrap().to_string();

    let (_, body) = post_json(
        &mut app,
        &format!("/api/playback/{}/advance", party_id),
        json!({"itemId": head}),
    )
    .await;
    assert_eq!(body["applied"], true);

    let (_, body) = get(&mut app, &format!("/api/party/{}", party_id)).await;
    assert_eq!(unplayed_singers(&body["snapshot"]), vec!["Ben", "Ana", "Ben"]);
}

#[tokio::test]
async fn test_advance_on_unknown_party_is_inert() {
    let mut app = create_test_app().await;

    let (status, body) = post_json(&mut app, "/api/playback/nope/advance", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], false);
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_players_lists_active_participants() {
    let mut app = create_test_app().await;
    let (party_id, _token) = create_party(&mut app, "Crowd").await;

    post_json(
        &mut app,
        &format!("/api/party/{}/join", party_id),
        json!({"name": "Ana", "avatar": "cat"}),
    )
    .await;

    let (status, body) = get(&mut app, &format!("/api/players/{}", party_id)).await;
    assert_eq!(status, StatusCode::OK);
    // Host (from creation) + Ana
    assert_eq!(body["count"], 2);

    let roles: Vec<&str> = body["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["role"].as_str().unwrap())
        .collect();
    assert!(roles.contains(&"host"));
    assert!(roles.contains(&"guest"));
}

#[tokio::test]
async fn test_heartbeat_is_fire_and_forget() {
    let mut app = create_test_app().await;

    // Heartbeat for a party that never existed still acks
    let (status, body) = post_json(
        &mut app,
        "/api/party/ghost/heartbeat",
        json!({"name": "Ana"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app().await;

    let (status, body) = get(&mut app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
