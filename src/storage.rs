//! Persistence of collected family data.
//!
//! The core never performs I/O itself. Callers hand a [`Snapshot`] to a
//! [`SnapshotStore`] keyed by a tool identifier, and load it back later.

mod file;
mod memory;
mod snapshot;

pub use file::{FileStore, StoreError};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Loads and saves snapshots by tool identifier.
pub trait SnapshotStore {
    /// Error type for store operations.
    type Error;

    /// Loads the snapshot saved under `tool_id`, if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored snapshot exists but cannot be read.
    fn load(&self, tool_id: &str) -> Result<Option<Snapshot>, Self::Error>;

    /// Saves `snapshot` under `tool_id`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&mut self, tool_id: &str, snapshot: &Snapshot) -> Result<(), Self::Error>;
}
