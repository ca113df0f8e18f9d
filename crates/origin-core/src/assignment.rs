//! Assignment records
//!
//! The record is the one layout shared by persistence and the full-state
//! sync: ordered `(layer, origin)` pairs plus the two participant flags.

use serde::{Deserialize, Serialize};

use crate::{Identifier, OriginError, OriginResult};

fn empty_origin() -> Identifier {
    Identifier::empty()
}

/// One origin held for one layer
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub layer: Identifier,
    #[serde(default = "empty_origin")]
    pub origin: Identifier,
}

impl Assignment {
    pub fn new(layer: Identifier, origin: Identifier) -> Self {
        Assignment { layer, origin }
    }

    pub fn empty(layer: Identifier) -> Self {
        Assignment::new(layer, Identifier::empty())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origin.is_empty_origin()
    }
}

/// Snapshot of a participant's assignments
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// First-assignment order
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub selecting: bool,
    #[serde(default)]
    pub had_origin_before: bool,
}

impl AssignmentRecord {
    pub fn origin_for(&self, layer: &Identifier) -> Option<&Identifier> {
        self.assignments
            .iter()
            .find(|a| &a.layer == layer)
            .map(|a| &a.origin)
    }

    pub fn to_json(&self) -> OriginResult<String> {
        serde_json::to_string(self).map_err(|e| OriginError::InvalidWireFormat(e.to_string()))
    }

    pub fn from_json(json: &str) -> OriginResult<Self> {
        serde_json::from_str(json).map_err(|e| OriginError::InvalidWireFormat(e.to_string()))
    }
}
