//! Resume and invalidation tests
//!
//! Ordering and replay semantics across connection drops: replayed
//! dispatches must not re-apply, and invalidated sessions must flush
//! before re-identifying.
//!
//! Run with: cargo test -p integration-tests --test resume_tests

use integration_tests::{bring_ready, fixtures::*, TestHarness};
use parley_core::{Event, GuildChange, Snowflake};
use parley_gateway::protocol::{GatewayFrame, OpCode};
use serde_json::json;

#[tokio::test]
async fn test_resume_replay_applies_only_unseen_dispatches() -> anyhow::Result<()> {
    let harness = TestHarness::start(2);
    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "n0")],
    )
    .await;

    // Live updates up to seq 12
    for seq in 10..=12 {
        harness
            .server(0)
            .dispatch("GUILD_UPDATE", seq, guild_rename(10, &format!("n{seq}")));
    }
    harness.listener.wait_for("GuildUpdate", 3).await;
    assert_eq!(harness.handle.last_sequence(), Some(12));

    // Drop with a resumable close code
    harness.server(0).close_with_code(4000);

    let server = harness.server(1);
    server.send(GatewayFrame::hello(50_000));
    let resume = server.expect_op(OpCode::Resume).await;
    assert_eq!(resume.d.as_ref().unwrap()["seq"], 12);

    // The server replays a window wider than what was missed
    for seq in 10..=15 {
        server.dispatch("GUILD_UPDATE", seq, guild_rename(10, &format!("n{seq}")));
    }
    server.dispatch("RESUMED", 16, json!({}));
    harness.listener.wait_for("Resumed", 1).await;

    // 10..=12 were already applied; only 13..=15 take effect again
    assert_eq!(harness.listener.count_of("GuildUpdate"), 6);
    let guild = harness.store.guild(Snowflake::new(10)).unwrap();
    assert_eq!(guild.name, "n15");
    assert_eq!(harness.handle.last_sequence(), Some(16));

    // Every rename produced exactly one event, old and new values intact
    let renames: Vec<(String, String)> = harness
        .listener
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::GuildUpdate {
                change: GuildChange::Name { old, new },
                ..
            } => Some((old, new)),
            _ => None,
        })
        .collect();
    assert_eq!(renames.first().unwrap().0, "n0");
    assert_eq!(renames.last().unwrap().1, "n15");

    harness.finish().await?;
    Ok(())
}

#[tokio::test]
async fn test_replayed_dispatch_is_idempotent_for_the_store() -> anyhow::Result<()> {
    let harness = TestHarness::start(1);
    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Home")],
    )
    .await;
    let server = harness.server(0);

    server.dispatch("GUILD_UPDATE", 5, guild_rename(10, "Renamed"));
    harness.listener.wait_for("GuildUpdate", 1).await;

    // The same sequence again: skipped before it touches anything
    server.dispatch("GUILD_UPDATE", 5, guild_rename(10, "Stale"));
    // A later dispatch proves the stale one was discarded, not queued
    server.dispatch("GUILD_UPDATE", 6, guild_rename(10, "Final"));
    harness.listener.wait_for("GuildUpdate", 2).await;

    assert_eq!(harness.listener.count_of("GuildUpdate"), 2);
    let guild = harness.store.guild(Snowflake::new(10)).unwrap();
    assert_eq!(guild.name, "Final");

    harness.finish().await?;
    Ok(())
}

#[tokio::test]
async fn test_non_resumable_invalid_session_flushes_and_reidentifies() {
    let harness = TestHarness::start(2);
    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Home")],
    )
    .await;
    assert!(!harness.store.is_empty());

    harness.server(0).send(GatewayFrame::invalid_session(false));

    let server = harness.server(1);
    server.send(GatewayFrame::hello(50_000));
    // A fresh Identify, not a Resume
    server.expect_op(OpCode::Identify).await;

    // Stale state is gone before the new snapshot arrives
    assert!(harness.store.is_empty());
    assert!(harness.handle.session_id().is_none());

    server.dispatch("READY", 1, ready_payload("sess-2", vec![guild_payload(11, "Fresh")]));
    harness.listener.wait_for("Ready", 2).await;

    assert_eq!(harness.handle.session_id().as_deref(), Some("sess-2"));
    assert!(harness.store.guild(Snowflake::new(10)).is_none());
    assert!(harness.store.guild(Snowflake::new(11)).is_some());

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_resumable_invalid_session_keeps_state() {
    let harness = TestHarness::start(2);
    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Home")],
    )
    .await;

    harness.server(0).send(GatewayFrame::invalid_session(true));

    let server = harness.server(1);
    server.send(GatewayFrame::hello(50_000));
    let resume = server.expect_op(OpCode::Resume).await;
    assert_eq!(resume.d.as_ref().unwrap()["session_id"], "sess-1");

    // The cache survived the drop
    assert!(harness.store.guild(Snowflake::new(10)).is_some());

    server.dispatch("RESUMED", 2, json!({}));
    harness.listener.wait_for("Resumed", 1).await;

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_session_timeout_close_code_invalidates_resume() {
    let harness = TestHarness::start(2);
    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Home")],
    )
    .await;

    // 4009: the server-side session is gone, resume cannot work
    harness.server(0).close_with_code(4009);

    let server = harness.server(1);
    server.send(GatewayFrame::hello(50_000));
    server.expect_op(OpCode::Identify).await;
    assert!(harness.store.is_empty());

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_guild_delete_cascades_children_first() {
    let harness = TestHarness::start(1);
    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Home")],
    )
    .await;

    harness.server(0).dispatch("GUILD_DELETE", 2, json!({"id": "10"}));
    harness.listener.wait_for("GuildDelete", 1).await;

    assert_eq!(
        harness.listener.kinds(),
        vec![
            "Ready",
            "ChannelDelete",
            "RoleDelete",
            "MemberLeave",
            "GuildDelete"
        ]
    );

    // Nothing guild-scoped survives; users are global and stay cached
    assert!(harness.store.guild(Snowflake::new(10)).is_none());
    assert!(harness.store.guild_channels(Snowflake::new(10)).is_empty());
    assert!(harness.store.guild_roles(Snowflake::new(10)).is_empty());
    assert!(harness.store.guild_members(Snowflake::new(10)).is_empty());
    assert!(harness.store.user(Snowflake::new(1)).is_some());

    harness.finish().await.unwrap();
}
