//! Locating the configuration and the stored case below a root directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use erbfolge::{
    Config, PersonId, Snapshot,
    storage::{FileStore, SnapshotStore},
};
use tracing::debug;

/// Directory holding configuration and snapshots.
pub const STATE_DIR: &str = ".erbfolge";

/// A root directory with its configuration loaded.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens the workspace at `root`, falling back to default settings when no
    /// configuration file exists.
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let path = Self::config_path(root);
        let config = if path.exists() {
            Config::load(&path).map_err(|e| anyhow::anyhow!("{e}"))?
        } else {
            debug!(path = %path.display(), "no configuration file, using defaults");
            Config::default()
        };
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(STATE_DIR).join("config.toml")
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    fn store(&self) -> FileStore {
        FileStore::new(self.root.join(STATE_DIR).join("sessions"))
    }

    /// The stored case, if any.
    pub fn snapshot(&self) -> anyhow::Result<Option<Snapshot>> {
        self.store()
            .load(self.config.tool_id())
            .with_context(|| format!("failed to load case '{}'", self.config.tool_id()))
    }

    /// The stored case, failing when nothing has been recorded.
    pub fn require_snapshot(&self) -> anyhow::Result<Snapshot> {
        self.snapshot()?.with_context(|| {
            format!(
                "no case recorded under '{}'; run 'erbfolge interview' or 'erbfolge add' first",
                self.config.tool_id()
            )
        })
    }

    /// The stored case, or an empty one using the default regime.
    pub fn snapshot_or_default(&self) -> anyhow::Result<Snapshot> {
        Ok(self
            .snapshot()?
            .unwrap_or_else(|| Snapshot::new("", self.config.default_regime, Vec::new())))
    }

    /// Stamps and stores `snapshot`.
    pub fn save(&self, snapshot: &mut Snapshot) -> anyhow::Result<()> {
        snapshot.touch();
        self.store()
            .save(self.config.tool_id(), snapshot)
            .with_context(|| format!("failed to save case '{}'", self.config.tool_id()))
    }
}

/// Finds the single person whose identifier starts with `prefix`.
pub fn resolve_person(snapshot: &Snapshot, prefix: &str) -> anyhow::Result<PersonId> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        anyhow::bail!("person identifier must not be empty");
    }

    let matches: Vec<PersonId> = snapshot
        .persons
        .iter()
        .map(erbfolge::Person::id)
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => anyhow::bail!("no person with identifier '{prefix}'"),
        _ => anyhow::bail!(
            "identifier '{prefix}' is ambiguous ({} matches); use more characters",
            matches.len()
        ),
    }
}

/// The first eight characters of an identifier, as shown in tables.
pub fn short_id(id: PersonId) -> String {
    id.to_string().chars().take(8).collect()
}
