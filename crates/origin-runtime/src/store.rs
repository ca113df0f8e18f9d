//! Assignment record storage
//!
//! Records are saved when a connection ends and loaded when the participant
//! reconnects. Last write wins.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::RwLock;

use origin_core::{AssignmentRecord, OriginError, OriginResult, ParticipantId};

/// Persistence for assignment records
pub trait RecordStore: Send + Sync {
    fn load(&self, participant: ParticipantId) -> Option<AssignmentRecord>;

    fn save(&self, participant: ParticipantId, record: AssignmentRecord);

    fn remove(&self, participant: ParticipantId) -> Option<AssignmentRecord>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<ParticipantId, AssignmentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Dump every record as JSON, keyed by participant handle
    pub fn to_json(&self) -> OriginResult<String> {
        let records: HashMap<String, AssignmentRecord> = self
            .records
            .read()
            .iter()
            .map(|(id, record)| (id.0.to_string(), record.clone()))
            .collect();
        serde_json::to_string_pretty(&records).map_err(|e| OriginError::Config(e.to_string()))
    }

    pub fn from_json(json: &str) -> OriginResult<Self> {
        let raw: HashMap<String, AssignmentRecord> =
            serde_json::from_str(json).map_err(|e| OriginError::Config(e.to_string()))?;
        let mut records = HashMap::with_capacity(raw.len());
        for (key, record) in raw {
            let id = key
                .parse::<u64>()
                .map_err(|e| OriginError::Config(format!("participant key {key:?}: {e}")))?;
            records.insert(ParticipantId::new(id), record);
        }
        Ok(MemoryStore {
            records: RwLock::new(records),
        })
    }

    pub fn load_file(path: impl AsRef<Path>) -> OriginResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| OriginError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> OriginResult<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)
            .map_err(|e| OriginError::Config(format!("{}: {e}", path.display())))
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, participant: ParticipantId) -> Option<AssignmentRecord> {
        self.records.read().get(&participant).cloned()
    }

    fn save(&self, participant: ParticipantId, record: AssignmentRecord) {
        tracing::debug!(%participant, assignments = record.assignments.len(), "saving record");
        self.records.write().insert(participant, record);
    }

    fn remove(&self, participant: ParticipantId) -> Option<AssignmentRecord> {
        self.records.write().remove(&participant)
    }
}
