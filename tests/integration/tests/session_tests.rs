//! Session lifecycle tests
//!
//! End-to-end flows over the scripted transport: handshake, heartbeat
//! liveness, reconnect classification, and shutdown.
//!
//! Run with: cargo test -p integration-tests --test session_tests

use integration_tests::{bring_ready, fixtures::*, TestHarness};
use parley_core::Snowflake;
use parley_gateway::protocol::{GatewayFrame, OpCode};
use parley_gateway::{GatewayError, SessionState};
use serde_json::json;

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_identify_handshake_reaches_ready() {
    let harness = TestHarness::start(1);
    let server = harness.server(0);

    server.send(GatewayFrame::hello(50_000));

    let identify = server.expect_op(OpCode::Identify).await;
    let body = identify.d.expect("Identify carries a body");
    assert_eq!(body["token"], "test-token");

    server.dispatch("READY", 1, ready_payload("sess-1", vec![guild_payload(10, "Home")]));
    harness.listener.wait_for("Ready", 1).await;

    assert_eq!(harness.handle.state(), SessionState::Ready);
    assert_eq!(harness.handle.session_id().as_deref(), Some("sess-1"));
    assert_eq!(harness.handle.last_sequence(), Some(1));

    // Snapshot hydration is silent: the guild is cached, but only Ready fired
    assert!(harness.store.guild(Snowflake::new(10)).is_some());
    assert_eq!(harness.listener.kinds(), vec!["Ready"]);

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_non_hello_first_frame_is_a_protocol_error() {
    let harness = TestHarness::start(1);
    harness.server(0).send(GatewayFrame::heartbeat_ack());

    // One scripted connection, so the reconnect loop runs out quickly
    let err = harness.join().await.unwrap_err();
    assert!(matches!(err, GatewayError::ReconnectExhausted { .. }));
}

// ============================================================================
// Heartbeat
// ============================================================================

#[tokio::test]
async fn test_heartbeat_carries_sequence_and_keeps_session_alive() {
    let harness = TestHarness::start(1);
    let server = harness.server(0);

    server.send(GatewayFrame::hello(30));
    server.expect_op(OpCode::Identify).await;
    server.dispatch("READY", 1, ready_payload("sess-1", vec![]));
    harness.listener.wait_for("Ready", 1).await;

    let beat = server.expect_heartbeat().await;
    assert_eq!(beat.d, Some(json!(1)));
    server.send(GatewayFrame::heartbeat_ack());

    // An acknowledged beat keeps the connection going
    server.expect_heartbeat().await;
    assert_eq!(harness.handle.state(), SessionState::Ready);

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_missed_ack_forces_resume() {
    let harness = TestHarness::start(2);

    {
        let server = harness.server(0);
        server.send(GatewayFrame::hello(30));
        server.expect_op(OpCode::Identify).await;
        server.dispatch("READY", 1, ready_payload("sess-1", vec![]));
        harness.listener.wait_for("Ready", 1).await;
        // Swallow the heartbeat without acking: the connection is a zombie
        server.expect_heartbeat().await;
    }

    let server = harness.server(1);
    server.send(GatewayFrame::hello(50_000));
    let resume = server.expect_op(OpCode::Resume).await;
    let body = resume.d.expect("Resume carries a body");
    assert_eq!(body["session_id"], "sess-1");
    assert_eq!(body["seq"], 1);
    assert_eq!(body["token"], "test-token");

    server.dispatch("RESUMED", 2, json!({}));
    harness.listener.wait_for("Resumed", 1).await;
    assert_eq!(harness.handle.state(), SessionState::Ready);

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_server_requested_heartbeat_is_answered_immediately() {
    let harness = TestHarness::start(1);
    let server = harness.server(0);
    bring_ready(server, &harness.listener, "sess-1", vec![]).await;

    server.send(GatewayFrame {
        op: OpCode::Heartbeat,
        t: None,
        s: None,
        d: None,
    });

    let beat = server.expect_heartbeat().await;
    assert_eq!(beat.d, Some(json!(1)));

    harness.finish().await.unwrap();
}

// ============================================================================
// Reconnect classification
// ============================================================================

#[tokio::test]
async fn test_server_reconnect_op_resumes() {
    let harness = TestHarness::start(2);
    bring_ready(harness.server(0), &harness.listener, "sess-1", vec![]).await;

    harness.server(0).send(GatewayFrame::reconnect());

    let server = harness.server(1);
    server.send(GatewayFrame::hello(50_000));
    server.expect_op(OpCode::Resume).await;
    server.dispatch("RESUMED", 2, json!({}));
    harness.listener.wait_for("Resumed", 1).await;

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_auth_failure_close_code_is_fatal() {
    let harness = TestHarness::start(2);
    let server = harness.server(0);

    server.send(GatewayFrame::hello(50_000));
    server.expect_op(OpCode::Identify).await;
    server.close_with_code(4004);

    let handle = harness.handle.clone();
    let err = harness.join().await.unwrap_err();
    assert!(matches!(err, GatewayError::Auth(_)));
    assert_eq!(handle.state(), SessionState::Offline);
}

#[tokio::test]
async fn test_reconnect_budget_is_bounded() {
    // No scripted connections: every connect attempt fails
    let harness = TestHarness::start(0);

    let err = harness.join().await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::ReconnectExhausted { attempts: 5 }
    ));
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let harness = TestHarness::start(1);
    bring_ready(harness.server(0), &harness.listener, "sess-1", vec![]).await;

    let handle = harness.handle.clone();
    handle.disconnect();
    handle.disconnect();

    harness.join().await.unwrap();
    assert_eq!(handle.state(), SessionState::Offline);

    // Still safe after the session is gone
    handle.disconnect();
}
