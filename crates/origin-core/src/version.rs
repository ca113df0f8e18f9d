//! Semantic version triple exchanged by the version handshake

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OriginError, OriginResult};

/// Semantic version triple (major, minor, patch)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        ProtocolVersion {
            major,
            minor,
            patch,
        }
    }

    /// Version of this crate, used as the coordinator's default
    pub fn current() -> Self {
        // Cargo guarantees the package version is a valid semver string
        ProtocolVersion::parse(env!("CARGO_PKG_VERSION")).unwrap_or_default()
    }

    /// Parse `major.minor.patch`; a pre-release or build suffix is ignored
    pub fn parse(input: &str) -> OriginResult<Self> {
        let core = input
            .split(|c: char| c == '-' || c == '+')
            .next()
            .unwrap_or_default();

        let mut parts = core.split('.');
        let mut next = || -> OriginResult<u32> {
            parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(|| OriginError::InvalidVersion(input.to_string()))
        };

        let version = ProtocolVersion::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(OriginError::InvalidVersion(input.to_string()));
        }
        Ok(version)
    }

    #[inline]
    pub fn to_triple(self) -> [u32; 3] {
        [self.major, self.minor, self.patch]
    }

    #[inline]
    pub fn from_triple(triple: [u32; 3]) -> Self {
        ProtocolVersion::new(triple[0], triple[1], triple[2])
    }

    /// Two versions are compatible when major and minor agree; patch is ignored
    #[inline]
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

impl TryFrom<String> for ProtocolVersion {
    type Error = OriginError;

    fn try_from(value: String) -> OriginResult<Self> {
        ProtocolVersion::parse(&value)
    }
}

impl From<ProtocolVersion> for String {
    fn from(v: ProtocolVersion) -> String {
        v.to_string()
    }
}

impl fmt::Debug for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
