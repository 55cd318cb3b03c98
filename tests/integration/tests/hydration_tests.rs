//! REST hydration tests
//!
//! Unavailable guilds and truncated member lists are completed over REST;
//! everything merges into the store silently, off the dispatch path.
//!
//! Run with: cargo test -p integration-tests --test hydration_tests

use integration_tests::{bring_ready, fixtures::*, wait_until, TestHarness};
use parley_core::Snowflake;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_unavailable_ready_guild_is_hydrated_via_rest() {
    let harness = TestHarness::start(1);
    harness.rest.stub("/guilds/11", guild_payload(11, "Hydrated"));

    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Available"), unavailable_stub(11)],
    )
    .await;

    // Available guild lands immediately, the stub only after the fetch
    assert!(harness.store.guild(Snowflake::new(10)).is_some());
    let store = harness.store.clone();
    wait_until("the stub guild is hydrated", move || {
        store.guild(Snowflake::new(11)).is_some()
    })
    .await;

    assert_eq!(harness.rest.calls(), vec!["/guilds/11".to_string()]);
    assert!(harness
        .store
        .channel(Snowflake::new(110))
        .is_some());

    // Hydration stays silent: only Ready was announced
    assert_eq!(harness.listener.kinds(), vec!["Ready"]);

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_large_guild_member_list_is_completed_via_rest() {
    let harness = TestHarness::start(1);
    harness.rest.stub(
        "/guilds/10/members?limit=1000",
        json!([member_json(2, "bob"), member_json(3, "carol")]),
    );

    let mut guild = guild_payload(10, "Big");
    guild["large"] = json!(true);
    guild["member_count"] = json!(3);

    bring_ready(harness.server(0), &harness.listener, "sess-1", vec![guild]).await;

    let store = harness.store.clone();
    wait_until("the member list is complete", move || {
        store.guild_members(Snowflake::new(10)).len() == 3
    })
    .await;

    // Users rode in with the member payloads
    assert!(harness.store.user(Snowflake::new(2)).is_some());
    assert!(harness.store.user(Snowflake::new(3)).is_some());
    assert_eq!(harness.listener.kinds(), vec!["Ready"]);

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_guild_create_dispatch_can_require_member_hydration() {
    let harness = TestHarness::start(1);
    harness.rest.stub(
        "/guilds/20/members?limit=1000",
        json!([member_json(1, "alice"), member_json(2, "bob")]),
    );

    bring_ready(harness.server(0), &harness.listener, "sess-1", vec![]).await;

    let mut guild = guild_payload(20, "Joined");
    guild["large"] = json!(true);
    harness.server(0).dispatch("GUILD_CREATE", 2, guild);
    harness.listener.wait_for("GuildCreate", 1).await;

    let store = harness.store.clone();
    wait_until("dispatch-triggered hydration lands", move || {
        store.member(Snowflake::new(20), Snowflake::new(2)).is_some()
    })
    .await;

    assert_eq!(harness.listener.count_of("GuildCreate"), 1);

    harness.finish().await.unwrap();
}

#[tokio::test]
async fn test_failed_hydration_does_not_break_the_session() {
    // No stub for guild 11: the fetch fails with NotFound
    let harness = TestHarness::start(1);

    bring_ready(
        harness.server(0),
        &harness.listener,
        "sess-1",
        vec![guild_payload(10, "Available"), unavailable_stub(11)],
    )
    .await;

    tokio::time::sleep(Duration::from_millis(50)).await;

    // The failed guild is simply absent; the session and the rest of the
    // snapshot are unaffected
    assert!(harness.store.guild(Snowflake::new(11)).is_none());
    assert!(harness.store.guild(Snowflake::new(10)).is_some());

    harness.server(0).dispatch("GUILD_UPDATE", 2, guild_rename(10, "Still live"));
    harness.listener.wait_for("GuildUpdate", 1).await;

    harness.finish().await.unwrap();
}
