//! Client-side mirror of the authoritative assignment state

use origin_core::{
    AssignmentRecord, DisconnectReason, Identifier, Participant, ProtocolVersion, Registry,
};
use origin_state::AssignmentState;
use origin_wire::{ClientMessage, ServerMessage};

/// What the display client knows. Only coordinator messages change it.
#[derive(Debug)]
pub struct ClientMirror {
    version: ProtocolVersion,
    capabilities: Vec<Identifier>,
    installed: bool,
    state: AssignmentState,
    /// `Some(is_reassignment)` while a selection UI request is unhandled
    selection_request: Option<bool>,
    disconnect: Option<DisconnectReason>,
}

impl ClientMirror {
    /// Client with the companion install: announces the handshake channel
    pub fn new(version: ProtocolVersion) -> Self {
        ClientMirror {
            version,
            capabilities: vec![Identifier::handshake_channel()],
            installed: false,
            state: AssignmentState::new(),
            selection_request: None,
            disconnect: None,
        }
    }

    /// Client without the companion install
    pub fn without_handshake(version: ProtocolVersion) -> Self {
        ClientMirror {
            capabilities: Vec::new(),
            ..ClientMirror::new(version)
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Opening message of a connection
    pub fn hello(&self) -> ClientMessage {
        ClientMessage::Hello {
            capabilities: self.capabilities.clone(),
        }
    }

    /// Apply one coordinator message; returns the reply, if one is due
    pub fn apply(&mut self, message: ServerMessage) -> Option<ClientMessage> {
        match message {
            ServerMessage::VersionHandshake { version } => {
                tracing::debug!(server = %version, client = %self.version, "answering version handshake");
                return Some(ClientMessage::HandshakeReply {
                    version: self.version,
                });
            }
            ServerMessage::OriginsInstalled => self.installed = true,
            ServerMessage::ConfirmAssignment { layer, origin } => {
                self.state.set_origin(layer, origin);
            }
            ServerMessage::FullStateSync { record } => {
                self.state = AssignmentState::from_record(&record);
            }
            ServerMessage::OpenSelectionUi { is_reassignment } => {
                self.selection_request = Some(is_reassignment);
            }
            ServerMessage::Disconnect { reason } => {
                tracing::warn!(%reason, "disconnected by coordinator");
                self.disconnect = Some(reason);
            }
        }
        None
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn origin(&self, layer: &Identifier) -> Identifier {
        self.state.origin(layer)
    }

    pub fn snapshot(&self) -> AssignmentRecord {
        self.state.to_record()
    }

    /// Last synced `selectingInProgress`
    pub fn is_selecting(&self) -> bool {
        self.state.is_selecting()
    }

    /// Take the pending selection UI request; `Some(is_reassignment)`
    pub fn take_selection_request(&mut self) -> Option<bool> {
        self.selection_request.take()
    }

    pub fn disconnect_reason(&self) -> Option<&DisconnectReason> {
        self.disconnect.as_ref()
    }

    /// Enabled layers, in order, that still need an interactive choice from
    /// this participant. Layers without options are skipped.
    pub fn pending_layers(&self, registry: &dyn Registry, participant: &Participant) -> Vec<Identifier> {
        registry
            .enabled_layers()
            .into_iter()
            .filter(|layer| !self.state.has_origin(&layer.id))
            .filter(|layer| layer.option_count(registry, participant) > 0)
            .map(|layer| layer.id.clone())
            .collect()
    }
}
