//! Fixture registries and participants

use std::sync::Arc;

use origin_core::{
    AutoChoose, Identifier, Impact, LayerDefinition, OriginDefinition, Participant, ParticipantId,
    Registry, StaticRegistry,
};

/// Identifier in the default namespace
pub fn id(path: &str) -> Identifier {
    Identifier::origins(path)
}

pub fn participant(n: u64) -> Participant {
    Participant::new(ParticipantId::new(n), format!("player{n}"))
}

/// Two enabled layers:
/// - `class` (order 0): one candidate, `warrior`
/// - `origin` (order 1): `human`, `elf`, `dwarf`, plus the unchoosable
///   member `golem`; random allowed
///
/// `stranger` is unchoosable and belongs to no layer.
pub fn onboarding_registry() -> Arc<dyn Registry> {
    Arc::new(
        StaticRegistry::builder()
            .origin(OriginDefinition::new(id("warrior")))
            .origin(OriginDefinition::new(id("human")))
            .origin(OriginDefinition::new(id("elf")).with_impact(Impact::Low))
            .origin(OriginDefinition::new(id("dwarf")).with_impact(Impact::Medium))
            .origin(OriginDefinition::new(id("golem")).unchoosable())
            .origin(OriginDefinition::new(id("stranger")).unchoosable())
            .layer(LayerDefinition::new(id("class")).with_origins(vec![id("warrior")]))
            .layer(
                LayerDefinition::new(id("origin"))
                    .with_order(1)
                    .with_origins(vec![id("human"), id("elf"), id("dwarf"), id("golem")])
                    .with_random(true),
            )
            .build()
            .expect("onboarding fixture is valid"),
    )
}

/// A single layer with one candidate
pub fn single_option_registry() -> Arc<dyn Registry> {
    Arc::new(
        StaticRegistry::builder()
            .origin(OriginDefinition::new(id("warrior")))
            .layer(LayerDefinition::new(id("class")).with_origins(vec![id("warrior")]))
            .build()
            .expect("single option fixture is valid"),
    )
}

/// A single interactive layer whose random pool is `[a, b, c]`
pub fn random_registry() -> Arc<dyn Registry> {
    Arc::new(
        StaticRegistry::builder()
            .origin(OriginDefinition::new(id("a")))
            .origin(OriginDefinition::new(id("b")))
            .origin(OriginDefinition::new(id("c")))
            .layer(
                LayerDefinition::new(id("origin"))
                    .with_origins(vec![id("a"), id("b"), id("c")])
                    .with_random(true)
                    .with_auto_choose(AutoChoose::Never),
            )
            .build()
            .expect("random fixture is valid"),
    )
}
