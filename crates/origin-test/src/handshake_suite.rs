//! Version handshake and connection lifecycle

use std::time::Duration;

use bytes::Bytes;
use tokio::time::timeout;

use origin_client::ClientMirror;
use origin_core::{OriginError, ProtocolVersion};
use origin_wire::{ClientMessage, ServerMessage};

use crate::{
    id, onboarding_registry, participant, test_config, test_coordinator, SimulatedClient,
    RECV_DEADLINE,
};

#[tokio::test]
async fn test_patch_difference_admitted() {
    let server = ProtocolVersion::new(1, 2, 3);
    let (coordinator, _log) = test_coordinator(onboarding_registry(), test_config(server));
    let (mut client, _handle) = SimulatedClient::connect(
        &coordinator,
        participant(1),
        ClientMirror::new(ProtocolVersion::new(1, 2, 9)),
    )
    .await;

    let seen = client.recv_sync().await.unwrap();
    assert_eq!(
        seen[..2],
        [
            ServerMessage::OriginsInstalled,
            ServerMessage::VersionHandshake { version: server },
        ]
    );
    assert!(client.mirror.disconnect_reason().is_none());
}

#[tokio::test]
async fn test_minor_mismatch_terminates_with_both_versions() {
    let server = ProtocolVersion::new(1, 2, 0);
    let (coordinator, log) = test_coordinator(onboarding_registry(), test_config(server));
    let (mut client, handle) = SimulatedClient::connect(
        &coordinator,
        participant(2),
        ClientMirror::new(ProtocolVersion::new(1, 3, 0)),
    )
    .await;

    client
        .recv_until(|m| matches!(m, ServerMessage::Disconnect { .. }))
        .await
        .unwrap();
    let reason = client.mirror.disconnect_reason().cloned().unwrap();
    assert_eq!(reason.key, "origins.gui.version_mismatch");
    assert_eq!(reason.args, vec!["1.2.0".to_string(), "1.3.0".to_string()]);

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(OriginError::Disconnected(r)) if r == reason));
    assert!(log.is_empty());
    // nothing was admitted, so nothing was stored
    assert!(coordinator.store().load(participant(2).id).is_none());
}

#[tokio::test]
async fn test_client_without_companion_is_refused() {
    let server = ProtocolVersion::new(1, 2, 0);
    let (coordinator, _log) = test_coordinator(onboarding_registry(), test_config(server));
    let (mut client, handle) = SimulatedClient::connect(
        &coordinator,
        participant(3),
        ClientMirror::without_handshake(server),
    )
    .await;

    let seen = client
        .recv_until(|m| matches!(m, ServerMessage::Disconnect { .. }))
        .await
        .unwrap();
    assert_eq!(seen[0], ServerMessage::OriginsInstalled);
    let reason = client.mirror.disconnect_reason().unwrap();
    assert_eq!(
        reason.key,
        "This server requires you to install the Origins mod (v 1.2.0) to play."
    );
    assert!(matches!(handle.await.unwrap(), Err(OriginError::Disconnected(_))));
}

#[tokio::test]
async fn test_disabled_check_skips_handshake() {
    let server = ProtocolVersion::new(1, 2, 0);
    let config = test_config(server).with_version_check(false);
    let (coordinator, _log) = test_coordinator(onboarding_registry(), config);
    let (mut client, _handle) = SimulatedClient::connect(
        &coordinator,
        participant(4),
        ClientMirror::without_handshake(ProtocolVersion::new(9, 9, 9)),
    )
    .await;

    let seen = client.recv_sync().await.unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], ServerMessage::OriginsInstalled);
}

#[tokio::test]
async fn test_disabled_check_admits_silent_client() {
    let server = ProtocolVersion::new(1, 2, 0);
    let config = test_config(server)
        .with_version_check(false)
        .with_handshake_timeout(Duration::from_millis(50));
    let (coordinator, _log) = test_coordinator(onboarding_registry(), config);

    // no Hello is ever sent
    let (mut link, handle) = coordinator.connect(participant(40));
    let mut seen = Vec::new();
    loop {
        let message = timeout(RECV_DEADLINE, link.recv()).await.unwrap().unwrap();
        let done = matches!(message, ServerMessage::OpenSelectionUi { .. });
        seen.push(message);
        if done {
            break;
        }
    }

    assert_eq!(seen[0], ServerMessage::OriginsInstalled);
    assert!(matches!(seen[1], ServerMessage::FullStateSync { .. }));
    assert!(!seen
        .iter()
        .any(|m| matches!(m, ServerMessage::Disconnect { .. })));

    // well past the handshake timeout, still connected
    assert!(timeout(Duration::from_millis(150), link.recv()).await.is_err());
    assert!(!handle.is_finished());

    drop(link);
    assert!(handle.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_unanswered_handshake_times_out() {
    let server = ProtocolVersion::new(1, 2, 0);
    let config = test_config(server).with_handshake_timeout(Duration::from_millis(50));
    let (coordinator, _log) = test_coordinator(onboarding_registry(), config);
    let (client, handle) =
        SimulatedClient::connect(&coordinator, participant(5), ClientMirror::new(server)).await;
    let mut client = client.silent();

    let seen = client
        .recv_until(|m| matches!(m, ServerMessage::Disconnect { .. }))
        .await
        .unwrap();
    assert_eq!(seen.len(), 3);
    assert!(matches!(handle.await.unwrap(), Err(OriginError::HandshakeTimeout)));
}

#[tokio::test]
async fn test_stalled_handshake_does_not_block_others() {
    let server = ProtocolVersion::new(1, 2, 0);
    let config = test_config(server).with_handshake_timeout(Duration::from_secs(5));
    let (coordinator, _log) = test_coordinator(onboarding_registry(), config);

    let (stalled, stalled_handle) =
        SimulatedClient::connect(&coordinator, participant(6), ClientMirror::new(server)).await;
    let mut stalled = stalled.silent();
    stalled.recv().await.unwrap();
    stalled.recv().await.unwrap();

    let (mut other, _handle) =
        SimulatedClient::connect(&coordinator, participant(7), ClientMirror::new(server)).await;
    other.recv_sync().await.unwrap();
    assert!(!stalled_handle.is_finished());

    stalled.disconnect();
    assert!(matches!(
        stalled_handle.await.unwrap(),
        Err(OriginError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn test_malformed_frames_are_dropped() {
    let server = ProtocolVersion::new(1, 2, 0);
    let (coordinator, _log) = test_coordinator(onboarding_registry(), test_config(server));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(8), ClientMirror::new(server)).await;
    client
        .recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. }))
        .await
        .unwrap();

    client.send_raw(Bytes::from_static(&[0xFF, 0x00, 0x01])).await.unwrap();
    client.send_raw(Bytes::new()).await.unwrap();
    client.choose("origin", "human").await.unwrap();

    let seen = client.recv_sync().await.unwrap();
    assert_eq!(
        seen[0],
        ServerMessage::ConfirmAssignment {
            layer: id("origin"),
            origin: id("human"),
        }
    );
}

#[tokio::test]
async fn test_handshake_messages_after_admission_ignored() {
    let server = ProtocolVersion::new(1, 2, 0);
    let (coordinator, _log) = test_coordinator(onboarding_registry(), test_config(server));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(9), ClientMirror::new(server)).await;
    client
        .recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. }))
        .await
        .unwrap();

    client
        .send(&ClientMessage::HandshakeReply { version: ProtocolVersion::new(0, 0, 1) })
        .await
        .unwrap();
    assert!(client.is_quiet(Duration::from_millis(100)).await);
    assert!(client.mirror.disconnect_reason().is_none());
}
