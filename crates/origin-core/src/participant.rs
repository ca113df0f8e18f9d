//! Participant model
//!
//! The host's entity model is external; the selection core only needs a
//! stable handle, a display name for logs, and the attributes that layer
//! membership requirements are evaluated against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

/// A participant holding origin assignments
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeSet<String>,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Participant {
            id,
            name: name.into(),
            attributes: BTreeSet::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into());
        self
    }

    #[inline]
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }
}
