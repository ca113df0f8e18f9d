//! Registry service contract
//!
//! The registry resolves layer and origin ids to their definitions. It is
//! loaded once and read-only afterwards, so implementations are shared
//! behind an `Arc` without locking.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Identifier, LayerDefinition, OriginDefinition, OriginError, OriginResult};

/// Read-only lookup of layer and origin definitions
pub trait Registry: Send + Sync {
    fn layer(&self, id: &Identifier) -> Option<&LayerDefinition>;

    fn origin(&self, id: &Identifier) -> Option<&OriginDefinition>;

    /// All layers, ordering priority ascending then id
    fn layers(&self) -> Vec<&LayerDefinition>;

    fn enabled_layers(&self) -> Vec<&LayerDefinition> {
        self.layers().into_iter().filter(|l| l.is_enabled()).collect()
    }

    fn get_layer(&self, id: &Identifier) -> OriginResult<&LayerDefinition> {
        self.layer(id)
            .ok_or_else(|| OriginError::LayerNotFound(id.clone()))
    }

    fn get_origin(&self, id: &Identifier) -> OriginResult<&OriginDefinition> {
        self.origin(id)
            .ok_or_else(|| OriginError::OriginNotFound(id.clone()))
    }
}

/// Serialized form of a registry
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub layers: Vec<LayerDefinition>,
    #[serde(default)]
    pub origins: Vec<OriginDefinition>,
}

/// In-memory registry
#[derive(Debug, Default)]
pub struct StaticRegistry {
    layers: HashMap<Identifier, LayerDefinition>,
    origins: HashMap<Identifier, OriginDefinition>,
    layer_order: Vec<Identifier>,
}

impl StaticRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn from_document(document: RegistryDocument) -> OriginResult<Self> {
        let mut builder = RegistryBuilder::default();
        for origin in document.origins {
            builder = builder.origin(origin);
        }
        for layer in document.layers {
            builder = builder.layer(layer);
        }
        builder.build()
    }

    pub fn from_json_str(json: &str) -> OriginResult<Self> {
        let document: RegistryDocument = serde_json::from_str(json)
            .map_err(|e| OriginError::InvalidDefinitions(e.to_string()))?;
        StaticRegistry::from_document(document)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> OriginResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| OriginError::InvalidDefinitions(format!("{}: {e}", path.display())))?;
        StaticRegistry::from_json_str(&json)
    }

    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl Registry for StaticRegistry {
    fn layer(&self, id: &Identifier) -> Option<&LayerDefinition> {
        self.layers.get(id)
    }

    fn origin(&self, id: &Identifier) -> Option<&OriginDefinition> {
        self.origins.get(id)
    }

    fn layers(&self) -> Vec<&LayerDefinition> {
        self.layer_order
            .iter()
            .filter_map(|id| self.layers.get(id))
            .collect()
    }
}

/// Builder collecting definitions before validation
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    layers: Vec<LayerDefinition>,
    origins: Vec<OriginDefinition>,
}

impl RegistryBuilder {
    pub fn layer(mut self, layer: LayerDefinition) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn origin(mut self, origin: OriginDefinition) -> Self {
        self.origins.push(origin);
        self
    }

    /// Validate and freeze. The EMPTY sentinel is always present.
    pub fn build(self) -> OriginResult<StaticRegistry> {
        let mut origins = HashMap::new();
        let empty = OriginDefinition::empty();
        origins.insert(empty.id.clone(), empty);

        for origin in self.origins {
            if origins.contains_key(&origin.id) {
                return Err(OriginError::DuplicateDefinition(origin.id));
            }
            origins.insert(origin.id.clone(), origin);
        }

        let mut layers = HashMap::new();
        for layer in self.layers {
            if layers.contains_key(&layer.id) {
                return Err(OriginError::DuplicateDefinition(layer.id));
            }
            if let Some(default_origin) = &layer.default_origin {
                if !origins.contains_key(default_origin) {
                    return Err(OriginError::InvalidDefinitions(format!(
                        "layer {} names unknown default origin {}",
                        layer.id, default_origin
                    )));
                }
            }
            layers.insert(layer.id.clone(), layer);
        }

        let mut layer_order: Vec<Identifier> = layers.keys().cloned().collect();
        layer_order.sort_by(|a, b| {
            let (la, lb) = (&layers[a], &layers[b]);
            la.order.cmp(&lb.order).then_with(|| a.cmp(b))
        });

        Ok(StaticRegistry {
            layers,
            origins,
            layer_order,
        })
    }
}
