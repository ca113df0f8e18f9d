//! Origin definitions
//!
//! An origin is a selectable value within a layer. Ordinary origins go
//! through layer membership; special origins (the EMPTY sentinel, the
//! client-side random placeholder, origins granted out of band) bypass it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Identifier, RANDOM_ORIGIN_PATH};

/// Membership variant of an origin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginKind {
    /// Eligible only through layer membership
    #[default]
    Normal,
    /// Bypasses layer membership
    Special,
}

/// Impact classification, ordinal used for display ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Impact {
    #[default]
    None = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Impact {
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Display metadata, opaque to the selection core
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginDisplay {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Immutable origin definition owned by the registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginDefinition {
    pub id: Identifier,
    #[serde(default)]
    pub kind: OriginKind,
    #[serde(default = "default_true")]
    pub choosable: bool,
    #[serde(default)]
    pub impact: Impact,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub display: OriginDisplay,
}

impl OriginDefinition {
    pub fn new(id: Identifier) -> Self {
        OriginDefinition {
            id,
            kind: OriginKind::Normal,
            choosable: true,
            impact: Impact::None,
            order: 0,
            display: OriginDisplay::default(),
        }
    }

    /// Special origin: never choosable, bypasses membership
    pub fn special(id: Identifier, impact: Impact, order: i32) -> Self {
        OriginDefinition {
            id,
            kind: OriginKind::Special,
            choosable: false,
            impact,
            order,
            display: OriginDisplay::default(),
        }
    }

    /// The EMPTY sentinel, meaning "unassigned"
    pub fn empty() -> Self {
        let mut origin = OriginDefinition::special(Identifier::empty(), Impact::None, i32::MAX);
        origin.display.name = "Empty".to_string();
        origin
    }

    /// Placeholder clients show for "pick one at random"
    pub fn random_placeholder() -> Self {
        let mut origin =
            OriginDefinition::special(Identifier::origins(RANDOM_ORIGIN_PATH), Impact::None, -1);
        origin.display.name = "Random".to_string();
        origin
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display.name = name.into();
        self
    }

    pub fn unchoosable(mut self) -> Self {
        self.choosable = false;
        self
    }

    #[inline]
    pub fn is_special(&self) -> bool {
        self.kind == OriginKind::Special
    }

    #[inline]
    pub fn is_choosable(&self) -> bool {
        self.choosable
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty_origin()
    }

    /// Display ordering: impact ascending, then explicit order ascending
    pub fn display_cmp(&self, other: &OriginDefinition) -> Ordering {
        self.impact
            .cmp(&other.impact)
            .then_with(|| self.order.cmp(&other.order))
    }
}
