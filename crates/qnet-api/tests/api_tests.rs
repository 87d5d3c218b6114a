//! Integration tests for the network API.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};

use qnet_api::{AppState, ServerConfig, create_router};
use qnet_sim::{LinkProfile, NetworkSimulator};

// ============================================================================
// Test helpers
// ============================================================================

fn quiet_state() -> Arc<AppState> {
    let sim = NetworkSimulator::new()
        .with_seed(42)
        .with_default_link(LinkProfile::ideal());
    Arc::new(AppState::new().with_simulator(sim))
}

fn hostile_state() -> Arc<AppState> {
    let hostile = LinkProfile {
        noise: 1.0,
        ..LinkProfile::default()
    };
    let sim = NetworkSimulator::new().with_seed(42).with_default_link(hostile);
    Arc::new(AppState::new().with_simulator(sim))
}

fn test_server(state: Arc<AppState>) -> TestServer {
    let router = create_router(state);
    TestServer::new(router).expect("test server")
}

async fn register(server: &TestServer, id: u32) {
    let response = server
        .post("/api/register")
        .json(&json!({ "node_id": id }))
        .await;
    response.assert_status(StatusCode::CREATED);
}

// ============================================================================
// Health endpoint
// ============================================================================

#[tokio::test]
async fn test_health_returns_ok() {
    let server = test_server(quiet_state());
    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

// ============================================================================
// Node registration
// ============================================================================

#[tokio::test]
async fn test_register_creates_a_node() {
    let server = test_server(quiet_state());
    let response = server
        .post("/api/register")
        .json(&json!({ "node_id": 7, "position": [1.5, -2.0] }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["node_id"], 7);
    assert_eq!(body["position"][0], 1.5);
    assert_eq!(body["position"][1], -2.0);
    assert_eq!(body["peers"].as_array().unwrap().len(), 0);
    assert_eq!(body["key_count"], 0);
    assert_eq!(body["purity"].as_f64().unwrap(), 1.0);
}

#[tokio::test]
async fn test_register_defaults_position_to_origin() {
    let server = test_server(quiet_state());
    let response = server
        .post("/api/register")
        .json(&json!({ "node_id": 1 }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["position"][0], 0.0);
    assert_eq!(body["position"][1], 0.0);
}

#[tokio::test]
async fn test_register_duplicate_returns_409() {
    let server = test_server(quiet_state());
    register(&server, 1).await;

    let response = server
        .post("/api/register")
        .json(&json!({ "node_id": 1 }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["error"], "node_exists");
}

#[tokio::test]
async fn test_register_missing_id_is_client_error() {
    let server = test_server(quiet_state());
    let response = server.post("/api/register").json(&json!({})).await;
    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_register_respects_capacity() {
    let config = ServerConfig {
        max_nodes: 1,
        ..ServerConfig::default()
    };
    let server = test_server(Arc::new(AppState::with_config(config)));

    register(&server, 1).await;
    let response = server
        .post("/api/register")
        .json(&json!({ "node_id": 2 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_nodes_sorted_by_id() {
    let server = test_server(quiet_state());
    register(&server, 5).await;
    register(&server, 2).await;
    register(&server, 9).await;

    let response = server.get("/api/nodes").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let nodes = body.as_array().unwrap();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0]["node_id"], 2);
    assert_eq!(nodes[1]["node_id"], 5);
    assert_eq!(nodes[2]["node_id"], 9);
}

// ============================================================================
// Entanglement
// ============================================================================

#[tokio::test]
async fn test_entangle_links_two_nodes() {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;

    let response = server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["bell"], "phi_plus");
    assert!(body["pair_id"].as_u64().is_some());
    assert!((body["fidelity"].as_f64().unwrap() - 1.0).abs() < 1e-9);

    let status: Value = server.get("/api/node_status/1").await.json();
    assert_eq!(status["peers"].as_array().unwrap(), &vec![json!(2)]);
}

#[tokio::test]
async fn test_entangle_unknown_node_returns_404() {
    let server = test_server(quiet_state());
    register(&server, 1).await;

    let response = server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 99 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_entangle_node_with_itself_returns_400() {
    let server = test_server(quiet_state());
    register(&server, 1).await;

    let response = server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 1 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Key exchange
// ============================================================================

#[tokio::test]
async fn test_exchange_keys_over_quiet_link() {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;
    server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/exchange_keys")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    // Server default key size applies when the request omits key_bytes.
    assert_eq!(body["key_bytes"], 16);
    assert_eq!(body["qber"].as_f64().unwrap(), 0.0);
    assert!(body["sifted"].as_u64().unwrap() >= body["checked"].as_u64().unwrap());

    let status: Value = server.get("/api/node_status/2").await.json();
    assert_eq!(status["key_count"], 1);
}

#[tokio::test]
async fn test_exchange_keys_honors_requested_length() {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;
    server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/exchange_keys")
        .json(&json!({ "node1": 1, "node2": 2, "key_bytes": 32 }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["key_bytes"], 32);
}

#[tokio::test]
async fn test_exchange_keys_without_entanglement_returns_400() {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;

    let response = server
        .post("/api/exchange_keys")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exchange_keys_aborts_on_hostile_link() {
    let server = test_server(hostile_state());
    register(&server, 1).await;
    register(&server, 2).await;
    server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await
        .assert_status_ok();

    let response = server
        .post("/api/exchange_keys")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["error"], "qber_too_high");

    // An aborted exchange leaves no key behind.
    let status: Value = server.get("/api/node_status/1").await.json();
    assert_eq!(status["key_count"], 0);
}

#[tokio::test]
async fn test_exchange_keys_rejects_zero_length() {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;

    let response = server
        .post("/api/exchange_keys")
        .json(&json!({ "node1": 1, "node2": 2, "key_bytes": 0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Messaging
// ============================================================================

async fn keyed_server() -> TestServer {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;
    server
        .post("/api/entangle")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await
        .assert_status_ok();
    server
        .post("/api/exchange_keys")
        .json(&json!({ "node1": 1, "node2": 2 }))
        .await
        .assert_status_ok();
    server
}

#[tokio::test]
async fn test_send_and_receive_message_round_trip() {
    let server = keyed_server().await;

    let send_resp = server
        .post("/api/send_message")
        .json(&json!({ "sender_id": 1, "receiver_id": 2, "message": "hello quantum" }))
        .await;
    send_resp.assert_status_ok();

    let packet: Value = send_resp.json();
    assert_eq!(packet["kind"], "encrypted_data");
    assert_eq!(packet["sender"], 1);
    assert_eq!(packet["receiver"], 2);
    assert!(!packet["payload"].as_array().unwrap().is_empty());

    let recv_resp = server
        .post("/api/receive_message")
        .json(&json!({ "receiver_id": 2, "packet": packet }))
        .await;
    recv_resp.assert_status_ok();

    let body: Value = recv_resp.json();
    assert_eq!(body["message"], "hello quantum");
    assert_eq!(body["sender"], 1);
}

#[tokio::test]
async fn test_send_message_without_key_returns_400() {
    let server = test_server(quiet_state());
    register(&server, 1).await;
    register(&server, 2).await;

    let response = server
        .post("/api/send_message")
        .json(&json!({ "sender_id": 1, "receiver_id": 2, "message": "psst" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_receive_message_wrong_receiver_returns_400() {
    let server = keyed_server().await;

    let packet: Value = server
        .post("/api/send_message")
        .json(&json!({ "sender_id": 1, "receiver_id": 2, "message": "for two" }))
        .await
        .json();

    let response = server
        .post("/api/receive_message")
        .json(&json!({ "receiver_id": 1, "packet": packet }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Node status
// ============================================================================

#[tokio::test]
async fn test_node_status_unknown_node_returns_404() {
    let server = test_server(quiet_state());
    let response = server.get("/api/node_status/99").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Error response format
// ============================================================================

#[tokio::test]
async fn test_error_response_format() {
    let server = test_server(quiet_state());
    let response = server.get("/api/node_status/99").await;

    let body: Value = response.json();
    // All errors should have "error" and "message" fields
    assert!(body["error"].as_str().is_some());
    assert!(body["message"].as_str().is_some());
}
