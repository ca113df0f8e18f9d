//! Onboarding scenarios, end to end through the connection driver

use std::time::Duration;

use origin_client::{ClientMirror, SelectionCursor};
use origin_core::{Identifier, ProtocolVersion};
use origin_runtime::{ChoiceRequest, ParticipantSession, SelectionEngine, SelectionEvent};
use origin_state::AssignmentState;
use origin_wire::ServerMessage;

use crate::{
    id, onboarding_registry, participant, single_option_registry, test_config, test_coordinator,
    LogCapture, SimulatedClient,
};

const VERSION: ProtocolVersion = ProtocolVersion::new(1, 2, 3);

fn open_requests(messages: &[ServerMessage]) -> Vec<bool> {
    messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::OpenSelectionUi { is_reassignment } => Some(*is_reassignment),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fresh_participant_two_layers() {
    let (coordinator, log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(1), ClientMirror::new(VERSION)).await;

    let mut seen = client.recv_sync().await.unwrap();
    seen.push(client.recv().await.unwrap());

    // layer A resolved by the sweep, layer B needs the UI
    assert_eq!(client.mirror.origin(&id("class")), id("warrior"));
    assert!(client.mirror.origin(&id("origin")).is_empty_origin());
    assert_eq!(open_requests(&seen), vec![false]);
    assert!(log.is_empty());

    let registry = onboarding_registry();
    let pending = client.mirror.pending_layers(registry.as_ref(), &participant(1));
    assert_eq!(pending, vec![id("origin")]);
}

#[tokio::test]
async fn test_single_option_layer_needs_no_round_trip() {
    let (coordinator, log) = test_coordinator(single_option_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(2), ClientMirror::new(VERSION)).await;

    let seen = client.recv_sync().await.unwrap();
    assert_eq!(client.mirror.origin(&id("class")), id("warrior"));
    assert!(!client.mirror.is_selecting());
    assert!(open_requests(&seen).is_empty());
    assert!(client.is_quiet(Duration::from_millis(100)).await);

    // auto-assignment alone completes onboarding
    assert_eq!(
        log.events(),
        vec![SelectionEvent::OnboardingComplete {
            participant: participant(2).id,
            had_origin_before: false,
        }]
    );
}

#[tokio::test]
async fn test_choice_via_cursor_completes_onboarding() {
    let (coordinator, log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(3), ClientMirror::new(VERSION)).await;
    client.recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. })).await.unwrap();
    assert_eq!(client.mirror.take_selection_request(), Some(false));

    let registry = onboarding_registry();
    let mut cursor = SelectionCursor::new(registry.as_ref(), &participant(3), &id("origin")).unwrap();
    cursor.next();
    let request = cursor.select().unwrap();
    client.send(&request).await.unwrap();

    let seen = client.recv_sync().await.unwrap();
    assert_eq!(
        seen[0],
        ServerMessage::ConfirmAssignment {
            layer: id("origin"),
            origin: id("elf"),
        }
    );
    assert_eq!(client.mirror.origin(&id("origin")), id("elf"));
    assert!(!client.mirror.is_selecting());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_non_member_choice_confirmed_as_empty() {
    let (coordinator, log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(4), ClientMirror::new(VERSION)).await;
    client.recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. })).await.unwrap();

    client.choose("origin", "stranger").await.unwrap();
    let seen = client.recv_sync().await.unwrap();

    assert_eq!(
        seen[0],
        ServerMessage::ConfirmAssignment {
            layer: id("origin"),
            origin: Identifier::empty(),
        }
    );
    assert!(client.mirror.origin(&id("origin")).is_empty_origin());
    assert!(log.is_empty());
}

#[test]
fn test_non_member_choice_logs_warning() {
    let capture = LogCapture::new();
    let engine = SelectionEngine::with_seed(onboarding_registry(), 10);
    let mut session = ParticipantSession::new(participant(10), engine);

    tracing::subscriber::with_default(capture.subscriber(), || {
        session.join();
        session.drain_outgoing();
        session.choose(&id("origin"), ChoiceRequest::Explicit(id("stranger")));
    });

    assert_eq!(
        session.drain_outgoing()[0],
        ServerMessage::ConfirmAssignment {
            layer: id("origin"),
            origin: Identifier::empty(),
        }
    );
    let warnings = capture.lines_matching("rejected origin choice");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("WARN"));
    assert!(warnings[0].contains("stranger"));
    assert!(!capture.contains("origin chosen"));
}

#[tokio::test]
async fn test_rechoice_after_completion_is_confirmed_unchanged() {
    let (coordinator, log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(5), ClientMirror::new(VERSION)).await;
    client.recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. })).await.unwrap();

    client.choose("origin", "human").await.unwrap();
    client.recv_sync().await.unwrap();
    client.choose("origin", "dwarf").await.unwrap();
    let seen = client.recv_sync().await.unwrap();

    assert_eq!(
        seen[0],
        ServerMessage::ConfirmAssignment {
            layer: id("origin"),
            origin: id("human"),
        }
    );
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_unknown_layer_confirmed_as_empty() {
    let (coordinator, _log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(6), ClientMirror::new(VERSION)).await;
    client.recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. })).await.unwrap();

    client.choose("deleted_layer", "human").await.unwrap();
    let seen = client.recv_sync().await.unwrap();
    assert_eq!(
        seen[0],
        ServerMessage::ConfirmAssignment {
            layer: id("deleted_layer"),
            origin: Identifier::empty(),
        }
    );
    let ServerMessage::FullStateSync { record } = &seen[1] else {
        panic!("expected sync, got {seen:?}");
    };
    assert!(record.origin_for(&id("deleted_layer")).is_none());
}

#[tokio::test]
async fn test_random_choice_over_the_wire() {
    let (coordinator, _log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(7), ClientMirror::new(VERSION)).await;
    client.recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. })).await.unwrap();

    client.choose_random("origin").await.unwrap();
    let seen = client.recv_sync().await.unwrap();
    let ServerMessage::ConfirmAssignment { origin, .. } = &seen[0] else {
        panic!("expected confirmation, got {seen:?}");
    };
    assert!([id("human"), id("elf"), id("dwarf")].contains(origin));
}

#[tokio::test]
async fn test_reconnect_restores_without_selection() {
    let (coordinator, log) = test_coordinator(onboarding_registry(), test_config(VERSION));
    let (mut client, handle) =
        SimulatedClient::connect(&coordinator, participant(8), ClientMirror::new(VERSION)).await;
    client.recv_until(|m| matches!(m, ServerMessage::OpenSelectionUi { .. })).await.unwrap();
    client.choose("origin", "dwarf").await.unwrap();
    client.recv_sync().await.unwrap();
    client.disconnect();
    handle.await.unwrap().unwrap();

    let (mut client, _handle) =
        SimulatedClient::connect(&coordinator, participant(8), ClientMirror::new(VERSION)).await;
    let seen = client.recv_sync().await.unwrap();
    assert_eq!(client.mirror.origin(&id("origin")), id("dwarf"));
    assert!(open_requests(&seen).is_empty());
    assert!(client.is_quiet(Duration::from_millis(100)).await);
    assert_eq!(log.len(), 1);
}

#[test]
fn test_engine_scenario_two_layers() {
    let registry = onboarding_registry();
    let p = participant(9);
    let mut engine = SelectionEngine::with_seed(registry.clone(), 9);
    let mut state = AssignmentState::new();

    let sweep = engine.sweep(&mut state, &p, true);
    assert_eq!(state.origin(&id("class")), id("warrior"));
    assert_eq!(sweep.pending, vec![id("origin")]);
    assert!(!state.has_all_origins(registry.as_ref(), &p));

    let outcome = engine.apply_choice(&mut state, &p, &id("origin"), ChoiceRequest::Explicit(id("golem")));
    assert_eq!(outcome.origin, id("golem"));
    assert!(outcome.event.is_some());
}
