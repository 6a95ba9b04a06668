use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{Snapshot, SnapshotStore};

/// Stores one YAML document per tool identifier in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

/// Errors that can occur when reading or writing snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("snapshot file could not be accessed")]
    Io(#[from] io::Error),
    /// The snapshot could not be (de)serialized.
    #[error("snapshot file is not valid")]
    Yaml(#[from] serde_yaml::Error),
    /// The tool identifier cannot be used as a file name.
    #[error("'{0}' is not a valid tool identifier")]
    InvalidToolId(String),
}

impl FileStore {
    /// Creates a store writing below `root`.
    ///
    /// The directory is created on the first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory snapshots are written to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a snapshot for `tool_id` is stored in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidToolId`] unless `tool_id` is a non-empty
    /// run of ASCII letters, digits, `-`, `_` and `.` that does not start with
    /// a dot.
    pub fn path_for(&self, tool_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !tool_id.is_empty()
            && !tool_id.starts_with('.')
            && tool_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidToolId(tool_id.to_string()));
        }
        Ok(self.root.join(format!("{tool_id}.yaml")))
    }
}

impl SnapshotStore for FileStore {
    type Error = StoreError;

    fn load(&self, tool_id: &str) -> Result<Option<Snapshot>, Self::Error> {
        let path = self.path_for(tool_id)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot stored");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_yaml::from_reader(BufReader::new(file))?;
        debug!(path = %path.display(), "loaded snapshot");
        Ok(Some(snapshot))
    }

    fn save(&mut self, tool_id: &str, snapshot: &Snapshot) -> Result<(), Self::Error> {
        let path = self.path_for(tool_id)?;
        std::fs::create_dir_all(&self.root)?;

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_yaml::to_writer(&mut writer, snapshot)?;
        writer.flush()?;

        debug!(path = %path.display(), persons = snapshot.persons.len(), "saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{IdAllocator, MatrimonialRegime, Person, Relationship, SequentialIds};

    #[test]
    fn save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = FileStore::new(temp_dir.path().join("sessions"));
        let mut ids = SequentialIds::default();
        let mut snapshot = Snapshot::new(
            "Erich Berg",
            MatrimonialRegime::CommunityOfProperty,
            vec![Person::new(ids.person_id(), Relationship::Spouse, "Helga", "Berg")],
        );
        snapshot.estate_value = Some(50_000.0);

        store.save("erbfolge-rechner", &snapshot).unwrap();
        let loaded = store.load("erbfolge-rechner").unwrap().unwrap();

        assert_eq!(loaded, snapshot);
        assert!(
            temp_dir
                .path()
                .join("sessions/erbfolge-rechner.yaml")
                .exists()
        );
    }

    #[test]
    fn load_missing_snapshot_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        assert!(store.load("unknown").unwrap().is_none());
    }

    #[test]
    fn load_corrupt_snapshot_fails() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("broken.yaml"), "_version: '9'\n").unwrap();

        let store = FileStore::new(temp_dir.path());
        assert!(matches!(store.load("broken"), Err(StoreError::Yaml(_))));
    }

    #[test]
    fn rejects_path_like_tool_ids() {
        let store = FileStore::new("/tmp");
        for tool_id in ["", "../etc", ".hidden", "a/b"] {
            assert!(matches!(
                store.path_for(tool_id),
                Err(StoreError::InvalidToolId(_))
            ));
        }
    }
}
