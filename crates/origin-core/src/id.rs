//! Identity types for origin assignment
//!
//! Layers, origins and protocol channels are named by namespaced identifiers
//! (`namespace:path`). Participants are named by a 64-bit handle assigned by
//! the host when the connection is accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OriginError, OriginResult};

/// Namespace used when an identifier is written without one
pub const DEFAULT_NAMESPACE: &str = "origins";

/// Maximum encoded length of an identifier (namespace + ':' + path)
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Namespaced identifier - `namespace:path`
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Build an identifier from its two halves, validating both
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> OriginResult<Self> {
        let namespace = namespace.into();
        let path = path.into();

        if namespace.is_empty() || !namespace.chars().all(is_namespace_char) {
            return Err(OriginError::InvalidIdentifier(format!("{namespace}:{path}")));
        }
        if path.is_empty() || !path.chars().all(is_path_char) {
            return Err(OriginError::InvalidIdentifier(format!("{namespace}:{path}")));
        }
        if namespace.len() + 1 + path.len() > MAX_IDENTIFIER_LEN {
            return Err(OriginError::InvalidIdentifier(format!("{namespace}:{path}")));
        }

        Ok(Identifier { namespace, path })
    }

    /// Identifier in the default namespace
    pub fn origins(path: &str) -> Self {
        Identifier {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: path.to_string(),
        }
    }

    /// Parse `namespace:path` or a bare `path` (default namespace)
    pub fn parse(input: &str) -> OriginResult<Self> {
        match input.split_once(':') {
            Some((namespace, path)) => Identifier::new(namespace, path),
            None => Identifier::new(DEFAULT_NAMESPACE, input),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The reserved "unassigned" origin
    pub fn empty() -> Self {
        Identifier::origins(EMPTY_ORIGIN_PATH)
    }

    /// Channel a client must announce to take part in the version handshake
    pub fn handshake_channel() -> Self {
        Identifier::origins(HANDSHAKE_CHANNEL_PATH)
    }

    #[inline]
    pub fn is_empty_origin(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE && self.path == EMPTY_ORIGIN_PATH
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

/// Path of the EMPTY sentinel origin
pub const EMPTY_ORIGIN_PATH: &str = "empty";

/// Path of the synthetic random-choice origin shown by clients
pub const RANDOM_ORIGIN_PATH: &str = "random";

/// Path of the version handshake channel
pub const HANDSHAKE_CHANNEL_PATH: &str = "handshake/version";

impl TryFrom<String> for Identifier {
    type Error = OriginError;

    fn try_from(value: String) -> OriginResult<Self> {
        Identifier::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> String {
        id.to_string()
    }
}

impl std::str::FromStr for Identifier {
    type Err = OriginError;

    fn from_str(s: &str) -> OriginResult<Self> {
        Identifier::parse(s)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}:{})", self.namespace, self.path)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Participant handle - unique per connected player
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl ParticipantId {
    pub const ZERO: ParticipantId = ParticipantId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        ParticipantId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        ParticipantId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Participant({:016x})", self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
