//! Logical messages
//!
//! Field order within each message is part of the wire contract.
//!
//! | kind | direction | message              | fields                                 |
//! |------|-----------|----------------------|----------------------------------------|
//! | 0x01 | c → s     | Hello                | u8 count, identifiers                  |
//! | 0x02 | c → s     | HandshakeReply       | version                                |
//! | 0x03 | c → s     | RequestChoice        | layer, origin                          |
//! | 0x04 | c → s     | RequestRandomChoice  | layer                                  |
//! | 0x81 | s → c     | VersionHandshake     | version                                |
//! | 0x82 | s → c     | OriginsInstalled     | (empty)                                |
//! | 0x83 | s → c     | ConfirmAssignment    | layer, origin                          |
//! | 0x84 | s → c     | FullStateSync        | record                                 |
//! | 0x85 | s → c     | OpenSelectionUi      | bool is_reassignment                   |
//! | 0x86 | s → c     | Disconnect           | key, u8 count, args                    |

use bytes::Bytes;

use origin_core::{
    AssignmentRecord, DisconnectReason, Identifier, OriginError, OriginResult, ProtocolVersion,
};

use crate::{Frame, WireReader, WireWriter};

/// Message kind identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Hello = 0x01,
    HandshakeReply = 0x02,
    RequestChoice = 0x03,
    RequestRandomChoice = 0x04,

    VersionHandshake = 0x81,
    OriginsInstalled = 0x82,
    ConfirmAssignment = 0x83,
    FullStateSync = 0x84,
    OpenSelectionUi = 0x85,
    Disconnect = 0x86,
}

impl MessageKind {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(MessageKind::Hello),
            0x02 => Some(MessageKind::HandshakeReply),
            0x03 => Some(MessageKind::RequestChoice),
            0x04 => Some(MessageKind::RequestRandomChoice),
            0x81 => Some(MessageKind::VersionHandshake),
            0x82 => Some(MessageKind::OriginsInstalled),
            0x83 => Some(MessageKind::ConfirmAssignment),
            0x84 => Some(MessageKind::FullStateSync),
            0x85 => Some(MessageKind::OpenSelectionUi),
            0x86 => Some(MessageKind::Disconnect),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Addressed to the coordinator (high bit clear)?
    #[inline]
    pub fn is_server_bound(self) -> bool {
        (self as u8) & 0x80 == 0
    }
}

/// Client to coordinator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientMessage {
    /// Channels the client understands, sent once on connect
    Hello { capabilities: Vec<Identifier> },
    HandshakeReply { version: ProtocolVersion },
    RequestChoice { layer: Identifier, origin: Identifier },
    RequestRandomChoice { layer: Identifier },
}

impl ClientMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            ClientMessage::Hello { .. } => MessageKind::Hello,
            ClientMessage::HandshakeReply { .. } => MessageKind::HandshakeReply,
            ClientMessage::RequestChoice { .. } => MessageKind::RequestChoice,
            ClientMessage::RequestRandomChoice { .. } => MessageKind::RequestRandomChoice,
        }
    }

    pub fn encode(&self) -> OriginResult<Bytes> {
        let mut w = WireWriter::new();
        match self {
            ClientMessage::Hello { capabilities } => {
                let count = u8::try_from(capabilities.len()).map_err(|_| {
                    OriginError::InvalidWireFormat(format!(
                        "too many capabilities: {}",
                        capabilities.len()
                    ))
                })?;
                w.put_u8(count);
                for capability in capabilities {
                    w.put_identifier(capability)?;
                }
            }
            ClientMessage::HandshakeReply { version } => {
                w.put_version(version);
            }
            ClientMessage::RequestChoice { layer, origin } => {
                w.put_identifier(layer)?;
                w.put_identifier(origin)?;
            }
            ClientMessage::RequestRandomChoice { layer } => {
                w.put_identifier(layer)?;
            }
        }
        Frame::new(self.kind(), w.finish()).serialize()
    }

    pub fn decode(buf: &[u8]) -> OriginResult<Self> {
        let frame = Frame::parse(buf)?;
        let mut r = WireReader::new(&frame.payload);

        let message = match frame.kind {
            MessageKind::Hello => {
                let count = r.get_u8()?;
                let mut capabilities = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    capabilities.push(r.get_identifier()?);
                }
                ClientMessage::Hello { capabilities }
            }
            MessageKind::HandshakeReply => ClientMessage::HandshakeReply {
                version: r.get_version()?,
            },
            MessageKind::RequestChoice => ClientMessage::RequestChoice {
                layer: r.get_identifier()?,
                origin: r.get_identifier()?,
            },
            MessageKind::RequestRandomChoice => ClientMessage::RequestRandomChoice {
                layer: r.get_identifier()?,
            },
            other => {
                return Err(OriginError::InvalidWireFormat(format!(
                    "{other:?} is not a client message"
                )))
            }
        };

        r.finish()?;
        Ok(message)
    }
}

/// Coordinator to client
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerMessage {
    VersionHandshake { version: ProtocolVersion },
    OriginsInstalled,
    ConfirmAssignment { layer: Identifier, origin: Identifier },
    FullStateSync { record: AssignmentRecord },
    OpenSelectionUi { is_reassignment: bool },
    Disconnect { reason: DisconnectReason },
}

impl ServerMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            ServerMessage::VersionHandshake { .. } => MessageKind::VersionHandshake,
            ServerMessage::OriginsInstalled => MessageKind::OriginsInstalled,
            ServerMessage::ConfirmAssignment { .. } => MessageKind::ConfirmAssignment,
            ServerMessage::FullStateSync { .. } => MessageKind::FullStateSync,
            ServerMessage::OpenSelectionUi { .. } => MessageKind::OpenSelectionUi,
            ServerMessage::Disconnect { .. } => MessageKind::Disconnect,
        }
    }

    pub fn encode(&self) -> OriginResult<Bytes> {
        let mut w = WireWriter::new();
        match self {
            ServerMessage::VersionHandshake { version } => {
                w.put_version(version);
            }
            ServerMessage::OriginsInstalled => {}
            ServerMessage::ConfirmAssignment { layer, origin } => {
                w.put_identifier(layer)?;
                w.put_identifier(origin)?;
            }
            ServerMessage::FullStateSync { record } => {
                w.put_record(record)?;
            }
            ServerMessage::OpenSelectionUi { is_reassignment } => {
                w.put_bool(*is_reassignment);
            }
            ServerMessage::Disconnect { reason } => {
                let count = u8::try_from(reason.args.len()).map_err(|_| {
                    OriginError::InvalidWireFormat(format!(
                        "too many disconnect arguments: {}",
                        reason.args.len()
                    ))
                })?;
                w.put_str(&reason.key)?;
                w.put_u8(count);
                for arg in &reason.args {
                    w.put_str(arg)?;
                }
            }
        }
        Frame::new(self.kind(), w.finish()).serialize()
    }

    pub fn decode(buf: &[u8]) -> OriginResult<Self> {
        let frame = Frame::parse(buf)?;
        let mut r = WireReader::new(&frame.payload);

        let message = match frame.kind {
            MessageKind::VersionHandshake => ServerMessage::VersionHandshake {
                version: r.get_version()?,
            },
            MessageKind::OriginsInstalled => ServerMessage::OriginsInstalled,
            MessageKind::ConfirmAssignment => ServerMessage::ConfirmAssignment {
                layer: r.get_identifier()?,
                origin: r.get_identifier()?,
            },
            MessageKind::FullStateSync => ServerMessage::FullStateSync {
                record: r.get_record()?,
            },
            MessageKind::OpenSelectionUi => ServerMessage::OpenSelectionUi {
                is_reassignment: r.get_bool()?,
            },
            MessageKind::Disconnect => {
                let key = r.get_str()?;
                let count = r.get_u8()?;
                let mut args = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    args.push(r.get_str()?);
                }
                ServerMessage::Disconnect {
                    reason: DisconnectReason::new(key, args),
                }
            }
            other => {
                return Err(OriginError::InvalidWireFormat(format!(
                    "{other:?} is not a server message"
                )))
            }
        };

        r.finish()?;
        Ok(message)
    }
}
