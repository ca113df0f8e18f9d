//! Headless selection cursor
//!
//! Models what the selection screen offers for one layer: the choosable
//! members in display order, followed by the random entry when the layer
//! allows it. `next` and `previous` wrap around.

use origin_core::{Identifier, OriginDefinition, OriginError, OriginResult, Participant, Registry};
use origin_wire::ClientMessage;

/// What the cursor currently points at
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CursorEntry {
    Origin(Identifier),
    Random,
}

/// Selection cursor for one layer
#[derive(Clone, Debug)]
pub struct SelectionCursor {
    layer: Identifier,
    candidates: Vec<Identifier>,
    random_pool: Vec<Identifier>,
    max_selection: usize,
    index: usize,
}

impl SelectionCursor {
    pub fn new(
        registry: &dyn Registry,
        participant: &Participant,
        layer: &Identifier,
    ) -> OriginResult<Self> {
        let definition = registry.get_layer(layer)?;

        let mut candidates = definition.choosable_members(registry, participant);
        candidates.sort_by(|a, b| a.display_cmp(b));

        let mut pool: Vec<&OriginDefinition> = definition
            .random_origins(registry, participant)
            .iter()
            .filter_map(|id| registry.origin(id))
            .collect();
        pool.sort_by(|a, b| a.display_cmp(b));

        Ok(SelectionCursor {
            layer: layer.clone(),
            candidates: candidates.into_iter().map(|o| o.id.clone()).collect(),
            random_pool: pool.into_iter().map(|o| o.id.clone()).collect(),
            max_selection: definition.option_count(registry, participant),
            index: 0,
        })
    }

    pub fn layer(&self) -> &Identifier {
        &self.layer
    }

    /// Number of entries the cursor cycles through
    pub fn max_selection(&self) -> usize {
        self.max_selection
    }

    /// Nothing to choose; the flow moves on to the next layer
    pub fn is_skipped(&self) -> bool {
        self.max_selection == 0
    }

    pub fn candidates(&self) -> &[Identifier] {
        &self.candidates
    }

    pub fn current(&self) -> Option<CursorEntry> {
        if self.is_skipped() {
            return None;
        }
        Some(match self.candidates.get(self.index) {
            Some(id) => CursorEntry::Origin(id.clone()),
            None => CursorEntry::Random,
        })
    }

    pub fn next(&mut self) -> Option<CursorEntry> {
        if self.max_selection > 0 {
            self.index = (self.index + 1) % self.max_selection;
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<CursorEntry> {
        if self.max_selection > 0 {
            self.index = (self.index + self.max_selection - 1) % self.max_selection;
        }
        self.current()
    }

    /// Point at a specific origin
    pub fn focus(&mut self, origin: &Identifier) -> OriginResult<()> {
        let index = self
            .candidates
            .iter()
            .position(|c| c == origin)
            .ok_or_else(|| OriginError::OriginNotFound(origin.clone()))?;
        self.index = index;
        Ok(())
    }

    /// Request for the current entry; `None` when the layer is skipped
    pub fn select(&self) -> Option<ClientMessage> {
        match self.current()? {
            CursorEntry::Origin(origin) => Some(ClientMessage::RequestChoice {
                layer: self.layer.clone(),
                origin,
            }),
            CursorEntry::Random => Some(ClientMessage::RequestRandomChoice {
                layer: self.layer.clone(),
            }),
        }
    }

    /// Origins the random entry may produce, in display order
    pub fn random_preview(&self) -> &[Identifier] {
        &self.random_pool
    }
}
