use std::{collections::HashMap, convert::Infallible};

use super::{Snapshot, SnapshotStore};

/// Keeps snapshots in memory for the lifetime of the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshots: HashMap<String, Snapshot>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotStore for MemoryStore {
    type Error = Infallible;

    fn load(&self, tool_id: &str) -> Result<Option<Snapshot>, Self::Error> {
        Ok(self.snapshots.get(tool_id).cloned())
    }

    fn save(&mut self, tool_id: &str, snapshot: &Snapshot) -> Result<(), Self::Error> {
        self.snapshots.insert(tool_id.to_string(), snapshot.clone());
        Ok(())
    }
}
