//! Gateway session end-to-end tests
//!
//! Each test starts a fake gateway on a local port and drives a real session
//! through the HTTP request client and the WebSocket transport.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use courier_core::Snowflake;
use courier_gateway::{Activity, ConnectionState, GatewayError, Invalidation, PresenceStatus};
use integration_tests::{
    eventually, wait_for_state, wait_until, FakeGateway, BOT_USER_ID, SESSION_ID, TOKEN,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// Long enough that no heartbeat fires during a test
const QUIET_INTERVAL: u64 = 45_000;

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_ready_populates_current_user() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    let user = client
        .current_user()
        .await
        .unwrap()
        .expect("READY should set the current user");
    assert_eq!(user.username, "fake-bot");
    assert_eq!(user.id, Snowflake::from(BOT_USER_ID));

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.session_id.as_deref(), Some(SESSION_ID));
    assert_eq!(snapshot.last_sequence, Some(1));
    assert!(!snapshot.resuming);
}

#[tokio::test]
async fn test_identify_uses_configured_identity() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (_client, _task) = gateway.connect().await.expect("Failed to connect");

    let identify = gateway.frames_with_op(2);
    assert_eq!(identify.len(), 1);
    assert_eq!(identify[0]["d"]["token"], TOKEN);
    assert_eq!(identify[0]["d"]["intents"], 33409);
    assert_eq!(identify[0]["d"]["properties"]["browser"], "courier");

    assert_eq!(gateway.queries(), vec!["v=10&encoding=json".to_string()]);
    assert_eq!(gateway.authorizations(), vec![format!("Bot {TOKEN}")]);
}

// ============================================================================
// Heartbeat Tests
// ============================================================================

#[tokio::test]
async fn test_acknowledged_heartbeats_keep_connection() {
    let gateway = FakeGateway::start(50).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    wait_until(|| gateway.frames_with_op(1).len() >= 3)
        .await
        .expect("Heartbeats were not sent");

    let heartbeats = gateway.frames_with_op(1);
    assert_eq!(heartbeats.last().unwrap()["d"], 1);
    assert_eq!(gateway.connections(), 1);
    assert_eq!(client.connection_state().await.unwrap(), ConnectionState::Active);
}

#[tokio::test]
async fn test_missed_ack_resumes_session() {
    let gateway = FakeGateway::start(100).await.expect("Failed to start gateway");
    gateway.disable_acks();
    let (_client, _task) = gateway.connect().await.expect("Failed to connect");

    wait_until(|| !gateway.frames_with_op(6).is_empty())
        .await
        .expect("Session did not resume");

    let resume = &gateway.frames_with_op(6)[0];
    assert_eq!(resume["d"]["token"], TOKEN);
    assert_eq!(resume["d"]["session_id"], SESSION_ID);
    assert_eq!(resume["d"]["seq"], 1);

    assert!(gateway.connections() >= 2);
    assert_eq!(gateway.frames_with_op(2).len(), 1);
}

#[tokio::test]
async fn test_manual_reconnect_resumes() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    client.reconnect().unwrap();

    wait_until(|| !gateway.frames_with_op(6).is_empty())
        .await
        .expect("Session did not resume");
    let probe = &client;
    eventually(|| async move {
        probe.snapshot().await.is_ok_and(|snapshot| {
            snapshot.state == ConnectionState::Active && !snapshot.resuming
        })
    })
    .await
    .expect("RESUMED was not applied");

    assert_eq!(gateway.connections(), 2);
    assert_eq!(gateway.frames_with_op(2).len(), 1);
    assert_eq!(client.snapshot().await.unwrap().last_sequence, Some(2));
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_ping_command_replies_pong() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (session, client) = gateway.session().unwrap();

    let replies = client.clone();
    client
        .register_command("ping", move |payload: Value, _rest: String| {
            let replies = replies.clone();
            let channel_id: Snowflake =
                serde_json::from_value(payload["channel_id"].clone()).unwrap();
            tokio::spawn(async move {
                replies.create_message(channel_id, "pong").await.ok();
            });
        })
        .unwrap();

    let _task = session.spawn().await.unwrap();
    wait_for_state(&client, ConnectionState::Active).await.unwrap();

    gateway.dispatch(
        "MESSAGE_CREATE",
        json!({
            "id": "500",
            "channel_id": "77",
            "author": { "id": "9", "username": "someone" },
            "content": "!ping",
        }),
    );

    wait_until(|| !gateway.messages().is_empty())
        .await
        .expect("No reply was posted");
    assert_eq!(
        gateway.messages(),
        vec![("77".to_string(), json!({ "content": "pong" }))]
    );
}

#[tokio::test]
async fn test_command_receives_remainder() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (session, client) = gateway.session().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .register_command("echo", move |_payload: Value, rest: String| {
            tx.send(rest).ok();
        })
        .unwrap();

    let _task = session.spawn().await.unwrap();
    wait_for_state(&client, ConnectionState::Active).await.unwrap();

    for content in ["hello", "!unknown thing", "!ECHO  two words"] {
        gateway.dispatch(
            "MESSAGE_CREATE",
            json!({ "id": "1", "channel_id": "2", "content": content }),
        );
    }

    let rest = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Command was not invoked")
        .unwrap();
    assert_eq!(rest, " two words");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_event_callback_and_guild_cache() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (session, client) = gateway.session().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .on_event("guild_create", move |payload: Value| {
            tx.send(payload["name"].clone()).ok();
        })
        .unwrap();

    let _task = session.spawn().await.unwrap();
    wait_for_state(&client, ConnectionState::Active).await.unwrap();

    let sequence = gateway.dispatch("GUILD_CREATE", json!({ "id": "41", "name": "Test Guild" }));

    let name = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Event callback was not invoked")
        .unwrap();
    assert_eq!(name, "Test Guild");

    let guild = client
        .guild(Snowflake::from(41))
        .await
        .unwrap()
        .expect("GUILD_CREATE should be cached");
    assert_eq!(guild.name, "Test Guild");
    assert_eq!(client.guild_count().await.unwrap(), 1);
    assert_eq!(client.snapshot().await.unwrap().last_sequence, Some(sequence));
}

// ============================================================================
// Action Tests
// ============================================================================

#[tokio::test]
async fn test_status_update_reaches_gateway() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    client
        .status_update(PresenceStatus::Idle, Some(Activity::playing("chess")), None, true)
        .unwrap();

    wait_until(|| !gateway.frames_with_op(3).is_empty())
        .await
        .expect("Status update was not sent");
    let update = &gateway.frames_with_op(3)[0]["d"];
    assert_eq!(update["status"], "idle");
    assert_eq!(update["afk"], true);
    assert_eq!(update["since"], Value::Null);
    assert_eq!(update["activity"]["name"], "chess");
    assert_eq!(update["activity"]["type"], 0);
}

#[tokio::test]
async fn test_voice_join_only_for_voice_channels() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    gateway.add_channel(5, 2, Some(41));
    gateway.add_channel(6, 0, Some(41));
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    client.join_voice_channel(Snowflake::from(6), false, false).await.unwrap();
    client.join_voice_channel(Snowflake::from(999), false, false).await.unwrap();
    client.join_voice_channel(Snowflake::from(5), true, false).await.unwrap();
    client.leave_voice_channel(Snowflake::from(41)).unwrap();

    wait_until(|| gateway.frames_with_op(4).len() >= 2)
        .await
        .expect("Voice state updates were not sent");

    let updates = gateway.frames_with_op(4);
    assert_eq!(updates.len(), 2);
    assert_eq!(
        updates[0]["d"],
        json!({ "guild_id": "41", "channel_id": "5", "self_mute": true, "self_deaf": false })
    );
    assert_eq!(updates[1]["d"]["guild_id"], "41");
    assert_eq!(updates[1]["d"]["channel_id"], Value::Null);
}

#[tokio::test]
async fn test_request_guild_members() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    client.request_guild_members(Snowflake::from(41), "", 0).unwrap();

    wait_until(|| !gateway.frames_with_op(8).is_empty())
        .await
        .expect("Member request was not sent");
    assert_eq!(
        gateway.frames_with_op(8)[0]["d"],
        json!({ "guild_id": "41", "query": "", "limit": 0 })
    );
}

// ============================================================================
// Disconnect Tests
// ============================================================================

#[tokio::test]
async fn test_non_resumable_invalid_session_clears_session() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    assert!(gateway.send(json!({ "op": 9, "d": false })));

    wait_for_state(&client, ConnectionState::Disconnected)
        .await
        .expect("Connection was not closed");
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.last_invalidation, Some(Invalidation::NotResumable));
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.last_sequence, None);
    assert_eq!(gateway.connections(), 1);
}

#[tokio::test]
async fn test_host_close_does_not_reconnect() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, _task) = gateway.connect().await.expect("Failed to connect");

    gateway.close(4004, "Authentication failed");

    wait_for_state(&client, ConnectionState::Disconnected)
        .await
        .expect("Connection end was not observed");
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(gateway.connections(), 1);
    assert_eq!(client.connection_state().await.unwrap(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_shutdown_closes_client() {
    let gateway = FakeGateway::start(QUIET_INTERVAL).await.expect("Failed to start gateway");
    let (client, task) = gateway.connect().await.expect("Failed to connect");

    client.shutdown().unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("Session task did not stop")
        .unwrap();

    assert!(matches!(client.current_user().await, Err(GatewayError::SessionClosed)));
    assert!(matches!(client.reconnect(), Err(GatewayError::SessionClosed)));
}
