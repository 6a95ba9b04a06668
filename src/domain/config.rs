use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::MatrimonialRegime;

/// Workspace settings for the succession calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The key snapshots are stored under.
    ///
    /// A workspace holding several cases gives each its own key.
    tool_id: String,

    /// The regime preselected when the interview asks about the spouse.
    pub default_regime: MatrimonialRegime,

    /// Fraction digits shown for percentages and amounts.
    decimals: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_id: default_tool_id(),
            default_regime: MatrimonialRegime::default(),
            decimals: default_decimals(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The key snapshots are stored under.
    #[must_use]
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    /// Sets the snapshot key. Blank keys are ignored.
    ///
    /// Returns `true` if the key was changed.
    pub fn set_tool_id(&mut self, tool_id: &str) -> bool {
        let tool_id = tool_id.trim();
        if tool_id.is_empty() || tool_id == self.tool_id {
            false
        } else {
            self.tool_id = tool_id.to_string();
            true
        }
    }

    /// Fraction digits shown for percentages and amounts.
    #[must_use]
    pub const fn decimals(&self) -> usize {
        self.decimals
    }

    /// Sets the number of fraction digits shown.
    pub fn set_decimals(&mut self, decimals: usize) {
        self.decimals = decimals;
    }
}

fn default_tool_id() -> String {
    "erbfolge-rechner".to_string()
}

const fn default_decimals() -> usize {
    2
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_tool_id")]
        tool_id: String,

        #[serde(default)]
        default_regime: MatrimonialRegime,

        #[serde(default = "default_decimals")]
        decimals: usize,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                tool_id,
                default_regime,
                decimals,
            } => Self {
                tool_id,
                default_regime,
                decimals,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            tool_id: config.tool_id,
            default_regime: config.default_regime,
            decimals: config.decimals,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"_version = "1"
tool_id = "nachlass-2024-17"
default_regime = "guetertrennung"
decimals = 4
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.tool_id(), "nachlass-2024-17");
        assert_eq!(
            config.default_regime,
            MatrimonialRegime::SeparationOfProperty
        );
        assert_eq!(config.decimals(), 4);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\ndecimals = \"two\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.tool_id(), "erbfolge-rechner");
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        assert!(config.set_tool_id("  fall-42 "));
        assert!(!config.set_tool_id("   "));
        config.default_regime = MatrimonialRegime::CommunityOfProperty;

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
