//! Error types for origin assignment

use std::fmt;

use thiserror::Error;

use crate::{Identifier, ProtocolVersion};

/// Core errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OriginError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unknown message kind: {0:#04x}")]
    UnknownMessageKind(u8),

    #[error("Unsupported wire version: {0}")]
    UnsupportedWireVersion(u8),

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),

    // Registry errors
    #[error("Layer not found: {0}")]
    LayerNotFound(Identifier),

    #[error("Origin not found: {0}")]
    OriginNotFound(Identifier),

    #[error("Duplicate definition: {0}")]
    DuplicateDefinition(Identifier),

    #[error("Invalid definitions: {0}")]
    InvalidDefinitions(String),

    // Session errors
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Handshake timed out")]
    HandshakeTimeout,

    #[error("Disconnected: {0}")]
    Disconnected(DisconnectReason),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for origin operations
pub type OriginResult<T> = Result<T, OriginError>;

/// Why a choice request was not honored as asked.
///
/// These never escape the selection engine as errors: the caller logs them
/// and the authoritative assignment is confirmed back to the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChoiceRejection {
    #[error("layer {layer} is already assigned and all layers are complete")]
    AlreadyAssigned { layer: Identifier },

    #[error("unknown layer {0}")]
    UnknownLayer(Identifier),

    #[error("unknown origin {0}")]
    UnknownOrigin(Identifier),

    #[error("origin {origin} is not choosable from layer {layer}")]
    NotChoosable { layer: Identifier, origin: Identifier },

    #[error("random choice is not allowed for layer {0}")]
    RandomNotAllowed(Identifier),
}

/// Reason attached to a terminated connection.
///
/// `key` is a translation key resolved by the client; `args` are its
/// positional arguments. A key without a translation is shown literally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisconnectReason {
    pub key: String,
    pub args: Vec<String>,
}

/// Translation key for a major/minor version mismatch
pub const VERSION_MISMATCH_KEY: &str = "origins.gui.version_mismatch";

impl DisconnectReason {
    pub fn new(key: impl Into<String>, args: Vec<String>) -> Self {
        DisconnectReason {
            key: key.into(),
            args,
        }
    }

    /// Literal message with no translation
    pub fn literal(message: impl Into<String>) -> Self {
        DisconnectReason::new(message, Vec::new())
    }

    pub fn version_mismatch(local: &ProtocolVersion, remote: &ProtocolVersion) -> Self {
        DisconnectReason::new(
            VERSION_MISMATCH_KEY,
            vec![local.to_string(), remote.to_string()],
        )
    }

    pub fn missing_companion(local: &ProtocolVersion) -> Self {
        DisconnectReason::literal(format!(
            "This server requires you to install the Origins mod (v {local}) to play."
        ))
    }

    pub fn is_version_mismatch(&self) -> bool {
        self.key == VERSION_MISMATCH_KEY
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{} [{}]", self.key, self.args.join(", "))
        }
    }
}
