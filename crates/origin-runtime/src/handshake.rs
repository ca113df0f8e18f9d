//! Handshake gate
//!
//! Runs once per connection before the participant is admitted:
//!
//! ```text
//! AwaitingCapabilities --Hello--> AwaitingHandshake --reply--> Completed
//!          |                              |
//!          +--> Completed (open, check off)
//!          |                              +--> Disconnected (mismatch, timeout)
//!          +--> Disconnected (no handshake channel)
//! ```
//!
//! With the version check off the gate is skipped: [`HandshakeGate::open`]
//! admits before any client frame is read, and a later `Hello` is an
//! ordinary post-admission message.
//!
//! The gate is a pure state machine; the connection driver performs the
//! actions it returns.

use origin_core::{DisconnectReason, Identifier, ProtocolVersion};
use origin_wire::{ClientMessage, ServerMessage};

/// Gate state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for the client's `Hello`
    AwaitingCapabilities,
    /// Version sent, waiting for the client's triple
    AwaitingHandshake,
    /// Admitted
    Completed,
    /// Terminal; the connection is being closed
    Disconnected,
}

/// Action the connection driver must take, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateAction {
    Send(ServerMessage),
    /// Admit the participant into the session
    Admit,
    /// Close the connection
    Close(DisconnectReason),
}

/// Version handshake gate for one connection
#[derive(Debug)]
pub struct HandshakeGate {
    local: ProtocolVersion,
    version_check: bool,
    state: GateState,
}

impl HandshakeGate {
    pub fn new(local: ProtocolVersion, version_check: bool) -> Self {
        HandshakeGate {
            local,
            version_check,
            state: GateState::AwaitingCapabilities,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == GateState::Completed
    }

    /// Actions due before the first client frame is read. Admits at once
    /// when the version check is off; otherwise the gate waits for `Hello`.
    pub fn open(&mut self) -> Vec<GateAction> {
        if self.version_check || self.state != GateState::AwaitingCapabilities {
            return Vec::new();
        }
        tracing::debug!("version check disabled, admitting");
        self.state = GateState::Completed;
        vec![GateAction::Send(ServerMessage::OriginsInstalled), GateAction::Admit]
    }

    /// Feed one client message. Messages that do not fit the current state
    /// are logged and produce no action.
    pub fn handle(&mut self, message: &ClientMessage) -> Vec<GateAction> {
        match (self.state, message) {
            (GateState::AwaitingCapabilities, ClientMessage::Hello { capabilities }) => {
                self.on_hello(capabilities)
            }
            (GateState::AwaitingHandshake, ClientMessage::HandshakeReply { version }) => {
                self.on_reply(version)
            }
            (state, message) => {
                tracing::warn!(?state, kind = ?message.kind(), "unexpected message during handshake");
                Vec::new()
            }
        }
    }

    fn on_hello(&mut self, capabilities: &[Identifier]) -> Vec<GateAction> {
        let mut actions = vec![GateAction::Send(ServerMessage::OriginsInstalled)];

        if !self.version_check {
            self.state = GateState::Completed;
            actions.push(GateAction::Admit);
        } else if !capabilities.contains(&Identifier::handshake_channel()) {
            tracing::warn!(version = %self.local, "client cannot take part in the version handshake");
            actions.extend(self.disconnect(DisconnectReason::missing_companion(&self.local)));
        } else {
            tracing::debug!(version = %self.local, "sending version handshake");
            self.state = GateState::AwaitingHandshake;
            actions.push(GateAction::Send(ServerMessage::VersionHandshake {
                version: self.local,
            }));
        }

        actions
    }

    /// Compare ignoring the patch component
    fn on_reply(&mut self, remote: &ProtocolVersion) -> Vec<GateAction> {
        if self.local.is_compatible_with(remote) {
            tracing::debug!(local = %self.local, remote = %remote, "version handshake completed");
            self.state = GateState::Completed;
            vec![GateAction::Admit]
        } else {
            tracing::warn!(local = %self.local, remote = %remote, "version mismatch");
            self.disconnect(DisconnectReason::version_mismatch(&self.local, remote))
        }
    }

    /// The client did not finish the handshake in time. No retry.
    pub fn on_timeout(&mut self) -> Vec<GateAction> {
        if matches!(self.state, GateState::Completed | GateState::Disconnected) {
            return Vec::new();
        }
        tracing::warn!(state = ?self.state, "handshake timed out");
        self.disconnect(DisconnectReason::literal(
            "Timed out while waiting for the Origins version handshake.",
        ))
    }

    fn disconnect(&mut self, reason: DisconnectReason) -> Vec<GateAction> {
        self.state = GateState::Disconnected;
        vec![
            GateAction::Send(ServerMessage::Disconnect {
                reason: reason.clone(),
            }),
            GateAction::Close(reason),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> ClientMessage {
        ClientMessage::Hello {
            capabilities: vec![Identifier::handshake_channel()],
        }
    }

    fn reply(major: u32, minor: u32, patch: u32) -> ClientMessage {
        ClientMessage::HandshakeReply {
            version: ProtocolVersion::new(major, minor, patch),
        }
    }

    #[test]
    fn test_patch_ignored() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 3), true);
        let actions = gate.handle(&hello());
        assert_eq!(
            actions,
            vec![
                GateAction::Send(ServerMessage::OriginsInstalled),
                GateAction::Send(ServerMessage::VersionHandshake {
                    version: ProtocolVersion::new(1, 2, 3)
                }),
            ]
        );
        assert_eq!(gate.state(), GateState::AwaitingHandshake);

        assert_eq!(gate.handle(&reply(1, 2, 9)), vec![GateAction::Admit]);
        assert!(gate.is_completed());
    }

    #[test]
    fn test_minor_mismatch_disconnects_with_both_versions() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 0), true);
        gate.handle(&hello());
        let actions = gate.handle(&reply(1, 3, 0));

        assert_eq!(gate.state(), GateState::Disconnected);
        let GateAction::Close(reason) = &actions[1] else {
            panic!("expected close, got {actions:?}");
        };
        assert!(reason.is_version_mismatch());
        assert_eq!(reason.args, vec!["1.2.0".to_string(), "1.3.0".to_string()]);
    }

    #[test]
    fn test_missing_channel_disconnects() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 0), true);
        let actions = gate.handle(&ClientMessage::Hello {
            capabilities: Vec::new(),
        });

        assert_eq!(actions[0], GateAction::Send(ServerMessage::OriginsInstalled));
        assert!(matches!(
            &actions[2],
            GateAction::Close(reason) if reason.key.contains("(v 1.2.0)")
        ));
        assert_eq!(gate.state(), GateState::Disconnected);
    }

    #[test]
    fn test_disabled_check_admits_on_open() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 0), false);
        assert_eq!(
            gate.open(),
            vec![GateAction::Send(ServerMessage::OriginsInstalled), GateAction::Admit]
        );
        assert!(gate.is_completed());

        // nothing left to do once admitted
        assert!(gate.open().is_empty());
        assert!(gate
            .handle(&ClientMessage::Hello {
                capabilities: Vec::new()
            })
            .is_empty());
        assert!(gate.on_timeout().is_empty());
    }

    #[test]
    fn test_enabled_check_waits_for_hello() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 0), true);
        assert!(gate.open().is_empty());
        assert_eq!(gate.state(), GateState::AwaitingCapabilities);
    }

    #[test]
    fn test_out_of_order_messages_ignored() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 0), true);
        assert!(gate.handle(&reply(1, 2, 0)).is_empty());
        assert!(gate
            .handle(&ClientMessage::RequestRandomChoice {
                layer: Identifier::origins("origin")
            })
            .is_empty());
        assert_eq!(gate.state(), GateState::AwaitingCapabilities);
    }

    #[test]
    fn test_timeout_is_terminal() {
        let mut gate = HandshakeGate::new(ProtocolVersion::new(1, 2, 0), true);
        gate.handle(&hello());
        assert_eq!(gate.on_timeout().len(), 2);
        assert_eq!(gate.state(), GateState::Disconnected);
        assert!(gate.on_timeout().is_empty());
        assert!(gate.handle(&reply(1, 2, 0)).is_empty());
    }
}
