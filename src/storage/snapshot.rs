use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{MatrimonialRegime, Person, Registry, RegistryError},
    interview::InterviewOutcome,
};

/// Everything needed to resume work on a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnapshotVersion", into = "SnapshotVersion")]
pub struct Snapshot {
    /// Name of the deceased.
    pub deceased_name: String,
    /// Matrimonial regime of the deceased.
    pub regime: MatrimonialRegime,
    /// Recorded relatives, in order.
    pub persons: Vec<Person>,
    /// Value of the estate, if known.
    pub estate_value: Option<f64>,
    /// When the case was last saved.
    pub last_accessed: DateTime<Utc>,
}

impl Snapshot {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(
        deceased_name: impl Into<String>,
        regime: MatrimonialRegime,
        persons: Vec<Person>,
    ) -> Self {
        Self {
            deceased_name: deceased_name.into(),
            regime,
            persons,
            estate_value: None,
            last_accessed: Utc::now(),
        }
    }

    /// Refreshes the access timestamp.
    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    /// Builds a registry from the recorded persons.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if two records share an id.
    pub fn registry(&self) -> Result<Registry, RegistryError> {
        Registry::from_persons(self.persons.iter().cloned())
    }
}

impl From<InterviewOutcome> for Snapshot {
    fn from(outcome: InterviewOutcome) -> Self {
        Self::new(outcome.deceased_name, outcome.regime, outcome.persons)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum SnapshotVersion {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        deceased_name: String,

        #[serde(default)]
        regime: MatrimonialRegime,

        #[serde(default)]
        persons: Vec<Person>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        estate_value: Option<f64>,

        last_accessed: DateTime<Utc>,
    },
}

impl From<SnapshotVersion> for Snapshot {
    fn from(version: SnapshotVersion) -> Self {
        match version {
            SnapshotVersion::V1 {
                deceased_name,
                regime,
                persons,
                estate_value,
                last_accessed,
            } => Self {
                deceased_name,
                regime,
                persons,
                estate_value,
                last_accessed,
            },
        }
    }
}

impl From<Snapshot> for SnapshotVersion {
    fn from(snapshot: Snapshot) -> Self {
        Self::V1 {
            deceased_name: snapshot.deceased_name,
            regime: snapshot.regime,
            persons: snapshot.persons,
            estate_value: snapshot.estate_value,
            last_accessed: snapshot.last_accessed,
        }
    }
}
