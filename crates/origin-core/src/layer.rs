//! Layer definitions
//!
//! A layer is an independent axis of classification. Its membership is a
//! list of entries, each a group of origin ids behind an optional
//! requirement on the participant, so which origins a layer offers depends
//! on who is asking.

use serde::{Deserialize, Serialize};

use crate::{Identifier, OriginDefinition, Participant, Registry};

/// Requirement evaluated against a participant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    HasAttribute { attribute: String },
    LacksAttribute { attribute: String },
    All { requirements: Vec<Requirement> },
    Any { requirements: Vec<Requirement> },
}

impl Requirement {
    pub fn is_met(&self, participant: &Participant) -> bool {
        match self {
            Requirement::HasAttribute { attribute } => participant.has_attribute(attribute),
            Requirement::LacksAttribute { attribute } => !participant.has_attribute(attribute),
            Requirement::All { requirements } => requirements.iter().all(|r| r.is_met(participant)),
            Requirement::Any { requirements } => requirements.iter().any(|r| r.is_met(participant)),
        }
    }
}

/// Group of member origins behind an optional requirement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntry {
    #[serde(default)]
    pub requirement: Option<Requirement>,
    pub origins: Vec<Identifier>,
}

impl LayerEntry {
    pub fn unconditional(origins: Vec<Identifier>) -> Self {
        LayerEntry {
            requirement: None,
            origins,
        }
    }

    pub fn requiring(requirement: Requirement, origins: Vec<Identifier>) -> Self {
        LayerEntry {
            requirement: Some(requirement),
            origins,
        }
    }

    #[inline]
    pub fn applies_to(&self, participant: &Participant) -> bool {
        self.requirement
            .as_ref()
            .map_or(true, |r| r.is_met(participant))
    }
}

/// When the sweep may resolve a layer without asking the participant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoChoose {
    /// Always interactive
    Never,
    /// Resolved automatically when exactly one option is offered
    #[default]
    SingleOption,
    /// Non-interactive: first candidate in display order, else a random pick
    Always,
}

fn default_true() -> bool {
    true
}

/// Immutable layer definition owned by the registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDefinition {
    pub id: Identifier,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Ordering priority, ascending
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entries: Vec<LayerEntry>,
    #[serde(default)]
    pub random_allowed: bool,
    #[serde(default)]
    pub allow_random_unchoosable: bool,
    #[serde(default)]
    pub exclude_random: Vec<Identifier>,
    #[serde(default)]
    pub auto_choose: AutoChoose,
    #[serde(default)]
    pub default_origin: Option<Identifier>,
}

impl LayerDefinition {
    pub fn new(id: Identifier) -> Self {
        LayerDefinition {
            id,
            enabled: true,
            order: 0,
            name: String::new(),
            entries: Vec::new(),
            random_allowed: false,
            allow_random_unchoosable: false,
            exclude_random: Vec::new(),
            auto_choose: AutoChoose::SingleOption,
            default_origin: None,
        }
    }

    pub fn with_entry(mut self, entry: LayerEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_origins(self, origins: Vec<Identifier>) -> Self {
        self.with_entry(LayerEntry::unconditional(origins))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_random(mut self, allowed: bool) -> Self {
        self.random_allowed = allowed;
        self
    }

    pub fn with_auto_choose(mut self, policy: AutoChoose) -> Self {
        self.auto_choose = policy;
        self
    }

    pub fn with_default_origin(mut self, origin: Identifier) -> Self {
        self.default_origin = Some(origin);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn is_random_allowed(&self) -> bool {
        self.random_allowed
    }

    /// Member ids offered to this participant, first occurrence order
    pub fn members(&self, participant: &Participant) -> Vec<&Identifier> {
        let mut members: Vec<&Identifier> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.applies_to(participant)) {
            for id in &entry.origins {
                if !members.contains(&id) {
                    members.push(id);
                }
            }
        }
        members
    }

    pub fn has_members_for(&self, participant: &Participant) -> bool {
        self.entries
            .iter()
            .any(|e| !e.origins.is_empty() && e.applies_to(participant))
    }

    /// Declared member for this participant
    pub fn contains(&self, origin: &OriginDefinition, participant: &Participant) -> bool {
        self.entries
            .iter()
            .any(|e| e.applies_to(participant) && e.origins.contains(&origin.id))
    }

    /// Declared member under any requirement
    pub fn declares(&self, origin: &OriginDefinition) -> bool {
        self.entries.iter().any(|e| e.origins.contains(&origin.id))
    }

    /// Choosable members resolved through the registry; unknown ids are skipped
    pub fn choosable_members<'r>(
        &self,
        registry: &'r dyn Registry,
        participant: &Participant,
    ) -> Vec<&'r OriginDefinition> {
        self.members(participant)
            .into_iter()
            .filter_map(|id| registry.origin(id))
            .filter(|origin| origin.is_choosable())
            .collect()
    }

    /// Pool a random choice draws from
    pub fn random_origins(
        &self,
        registry: &dyn Registry,
        participant: &Participant,
    ) -> Vec<Identifier> {
        self.members(participant)
            .into_iter()
            .filter(|id| !self.exclude_random.contains(id))
            .filter_map(|id| registry.origin(id))
            .filter(|origin| !origin.is_special())
            .filter(|origin| origin.is_choosable() || self.allow_random_unchoosable)
            .map(|origin| origin.id.clone())
            .collect()
    }

    /// Number of interactive options; 0 means no choice is needed
    pub fn option_count(&self, registry: &dyn Registry, participant: &Participant) -> usize {
        let choosable = self.choosable_members(registry, participant).len();
        let random = self.random_allowed && !self.random_origins(registry, participant).is_empty();
        choosable + usize::from(random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParticipantId, StaticRegistry};

    fn id(path: &str) -> Identifier {
        Identifier::origins(path)
    }

    fn registry() -> StaticRegistry {
        StaticRegistry::builder()
            .origin(OriginDefinition::new(id("human")))
            .origin(OriginDefinition::new(id("elytrian")))
            .origin(OriginDefinition::new(id("merling")).unchoosable())
            .origin(OriginDefinition::special(id("granted"), Default::default(), 0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_requirement_gates_membership() {
        let layer = LayerDefinition::new(id("origin"))
            .with_origins(vec![id("human")])
            .with_entry(LayerEntry::requiring(
                Requirement::HasAttribute {
                    attribute: "winged".into(),
                },
                vec![id("elytrian")],
            ));

        let plain = Participant::new(ParticipantId::new(1), "plain");
        let winged = Participant::new(ParticipantId::new(2), "winged").with_attribute("winged");

        assert_eq!(layer.members(&plain), vec![&id("human")]);
        assert_eq!(layer.members(&winged), vec![&id("human"), &id("elytrian")]);

        let elytrian = OriginDefinition::new(id("elytrian"));
        assert!(!layer.contains(&elytrian, &plain));
        assert!(layer.contains(&elytrian, &winged));
        assert!(layer.declares(&elytrian));
    }

    #[test]
    fn test_option_count_includes_random_entry() {
        let registry = registry();
        let p = Participant::new(ParticipantId::new(1), "p");

        let layer = LayerDefinition::new(id("origin"))
            .with_origins(vec![id("human"), id("elytrian"), id("merling")]);
        assert_eq!(layer.option_count(&registry, &p), 2);

        let layer = layer.with_random(true);
        assert_eq!(layer.option_count(&registry, &p), 3);
    }

    #[test]
    fn test_random_pool_rules() {
        let registry = registry();
        let p = Participant::new(ParticipantId::new(1), "p");

        let mut layer = LayerDefinition::new(id("origin"))
            .with_origins(vec![id("human"), id("elytrian"), id("merling"), id("granted")])
            .with_random(true);
        layer.exclude_random.push(id("elytrian"));

        assert_eq!(layer.random_origins(&registry, &p), vec![id("human")]);

        layer.allow_random_unchoosable = true;
        assert_eq!(
            layer.random_origins(&registry, &p),
            vec![id("human"), id("merling")]
        );
    }

    #[test]
    fn test_unknown_members_are_skipped() {
        let registry = registry();
        let p = Participant::new(ParticipantId::new(1), "p");
        let layer = LayerDefinition::new(id("origin")).with_origins(vec![id("deleted"), id("human")]);

        let choosable: Vec<_> = layer
            .choosable_members(&registry, &p)
            .into_iter()
            .map(|o| o.id.clone())
            .collect();
        assert_eq!(choosable, vec![id("human")]);
    }
}
