//! Grant bundles
//!
//! A grant is an out-of-band item or command that forces assignments and
//! then sends the participant back through selection for whatever is left.

use serde::{Deserialize, Serialize};

use origin_core::{Identifier, Registry};

/// Translation key prefix for grant tooltips
pub const GRANT_TOOLTIP_KEY: &str = "component.item.origins.origin";

fn empty_origin() -> Identifier {
    Identifier::empty()
}

/// One `(layer, origin)` pair carried by a grant. An EMPTY origin names the
/// layer only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantEntry {
    pub layer: Identifier,
    #[serde(default = "empty_origin")]
    pub origin: Identifier,
}

impl GrantEntry {
    pub fn new(layer: Identifier, origin: Identifier) -> Self {
        GrantEntry { layer, origin }
    }

    pub fn layer_only(layer: Identifier) -> Self {
        GrantEntry::new(layer, Identifier::empty())
    }

    /// The layer exists and is enabled, the origin exists, and the layer
    /// declares the origin or the origin is special
    pub fn can_select(&self, registry: &dyn Registry) -> bool {
        let Some(layer) = registry.layer(&self.layer) else {
            return false;
        };
        let Some(origin) = registry.origin(&self.origin) else {
            return false;
        };
        layer.is_enabled() && (layer.declares(origin) || origin.is_special())
    }
}

/// One tooltip line: a translation key and its arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayLine {
    pub key: String,
    pub args: Vec<String>,
}

/// Ordered set of grant entries; duplicates are dropped on insert
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<GrantEntry>", into = "Vec<GrantEntry>")]
pub struct GrantBundle {
    entries: Vec<GrantEntry>,
}

impl GrantBundle {
    pub fn new() -> Self {
        GrantBundle::default()
    }

    pub fn with(mut self, entry: GrantEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Returns `false` when the entry was already present
    pub fn insert(&mut self, entry: GrantEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[GrantEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that will be written when the bundle is applied
    pub fn assignable<'a>(
        &'a self,
        registry: &'a dyn Registry,
    ) -> impl Iterator<Item = &'a GrantEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| !e.origin.is_empty_origin() && e.can_select(registry))
    }

    /// Tooltip lines for the selectable entries, or the generic line
    pub fn describe(&self, registry: &dyn Registry) -> Vec<DisplayLine> {
        let mut lines: Vec<DisplayLine> = self
            .entries
            .iter()
            .filter(|e| e.can_select(registry))
            .map(|e| {
                let layer_name = registry
                    .layer(&e.layer)
                    .map(|l| display_or_id(&l.name, &l.id))
                    .unwrap_or_else(|| e.layer.to_string());
                if e.origin.is_empty_origin() {
                    DisplayLine {
                        key: format!("{GRANT_TOOLTIP_KEY}.layer"),
                        args: vec![layer_name],
                    }
                } else {
                    let origin_name = registry
                        .origin(&e.origin)
                        .map(|o| display_or_id(&o.display.name, &o.id))
                        .unwrap_or_else(|| e.origin.to_string());
                    DisplayLine {
                        key: format!("{GRANT_TOOLTIP_KEY}.layer_and_origin"),
                        args: vec![layer_name, origin_name],
                    }
                }
            })
            .collect();

        if lines.is_empty() {
            lines.push(DisplayLine {
                key: format!("{GRANT_TOOLTIP_KEY}.generic"),
                args: Vec::new(),
            });
        }
        lines
    }
}

fn display_or_id(name: &str, id: &Identifier) -> String {
    if name.is_empty() {
        id.to_string()
    } else {
        name.to_string()
    }
}

impl From<Vec<GrantEntry>> for GrantBundle {
    fn from(entries: Vec<GrantEntry>) -> Self {
        entries.into_iter().fold(GrantBundle::new(), GrantBundle::with)
    }
}

impl From<GrantBundle> for Vec<GrantEntry> {
    fn from(bundle: GrantBundle) -> Self {
        bundle.entries
    }
}
