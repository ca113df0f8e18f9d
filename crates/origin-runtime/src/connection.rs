//! Connection driver
//!
//! One task per connection. The handshake wait is bounded by the configured
//! timeout and blocks only this connection.

use tokio::time::timeout;
use tracing::Instrument;

use origin_core::{OriginError, OriginResult, Participant};
use origin_wire::ClientMessage;

use crate::{Coordinator, EventHub, GateAction, HandshakeGate, ParticipantSession, ServerLink};

/// Serve one connection until the client goes away or is disconnected.
///
/// Returns `Ok(())` when the client closed its end after admission. A record
/// is persisted only for admitted participants.
pub async fn serve_connection(
    coordinator: Coordinator,
    participant: Participant,
    mut link: ServerLink,
) -> OriginResult<()> {
    let span = tracing::info_span!("connection", participant = %participant.id);
    async move {
        let config = coordinator.config();
        let mut gate = HandshakeGate::new(config.version, config.perform_version_check);

        match timeout(config.handshake_timeout(), admit(&mut gate, &mut link)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                for action in gate.on_timeout() {
                    if let GateAction::Send(message) = action {
                        // best effort; the client may already be gone
                        let _ = link.send(&message).await;
                    }
                }
                return Err(OriginError::HandshakeTimeout);
            }
        }

        tracing::info!(name = %participant.name, "participant admitted");
        let mut session = coordinator.open_session(participant);
        session.join();
        let mut result = flush(&mut session, &link, coordinator.events()).await;

        while result.is_ok() {
            let Some(frame) = link.recv().await else {
                break;
            };
            match ClientMessage::decode(&frame) {
                Ok(message) => session.handle(message),
                Err(e) => {
                    tracing::warn!(error = %e, len = frame.len(), "dropping malformed frame");
                    continue;
                }
            }
            result = flush(&mut session, &link, coordinator.events()).await;
        }

        coordinator.close_session(&session);
        tracing::info!(
            choices = session.stats().choices,
            rejected = session.stats().rejected,
            "connection closed"
        );
        result
    }
    .instrument(span)
    .await
}

/// Run the gate until it admits or closes the connection
async fn admit(gate: &mut HandshakeGate, link: &mut ServerLink) -> OriginResult<()> {
    if perform(gate.open(), link).await? {
        return Ok(());
    }
    loop {
        let frame = link.recv().await.ok_or(OriginError::ConnectionClosed)?;
        let message = match ClientMessage::decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed frame during handshake");
                continue;
            }
        };

        if perform(gate.handle(&message), link).await? {
            return Ok(());
        }
    }
}

/// Carry out gate actions in order; `true` once the participant is admitted
async fn perform(actions: Vec<GateAction>, link: &ServerLink) -> OriginResult<bool> {
    for action in actions {
        match action {
            GateAction::Send(reply) => link.send(&reply).await?,
            GateAction::Admit => return Ok(true),
            GateAction::Close(reason) => return Err(OriginError::Disconnected(reason)),
        }
    }
    Ok(false)
}

/// Publish queued events, then send queued messages in order
async fn flush(
    session: &mut ParticipantSession,
    link: &ServerLink,
    events: &EventHub,
) -> OriginResult<()> {
    while let Some(event) = session.pop_event() {
        events.publish(&event);
    }
    while let Some(message) = session.pop_outgoing() {
        link.send(&message).await?;
    }
    Ok(())
}
