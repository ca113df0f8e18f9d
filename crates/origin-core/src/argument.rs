//! Layer arguments for operator commands

use crate::{Identifier, LayerDefinition, OriginError, OriginResult, Registry};

/// Translation key shown when a layer argument does not resolve
pub const LAYER_NOT_FOUND_KEY: &str = "commands.origin.layer_not_found";

/// Parse a layer id typed by an operator and resolve it
pub fn parse_layer_argument<'r>(
    registry: &'r dyn Registry,
    input: &str,
) -> OriginResult<&'r LayerDefinition> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OriginError::InvalidIdentifier(String::new()));
    }
    let id = Identifier::parse(input)?;
    registry.get_layer(&id)
}

/// Enabled layer ids matching a partially typed argument.
///
/// A candidate matches when either its full id or its path starts with the
/// input, so `ori` suggests `origins:origin`.
pub fn suggest_layers(registry: &dyn Registry, partial: &str) -> Vec<String> {
    registry
        .enabled_layers()
        .into_iter()
        .map(|layer| layer.id.to_string())
        .filter(|full| {
            let path = full.split_once(':').map_or(full.as_str(), |(_, p)| p);
            full.starts_with(partial) || path.starts_with(partial)
        })
        .collect()
}
