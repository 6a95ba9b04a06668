use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The unique, stable identifier of a recorded relative.
///
/// Assigned once when the record is created and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(Uuid);

impl PersonId {
    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

/// Identifies a stirps ("Stamm"): every descendant tracing back to the same
/// first-order child shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineageId(Uuid);

impl LineageId {
    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for LineageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LineageId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ParseIdError(s.to_string()))
    }
}

/// Error returned when a string is not a valid identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid identifier '{0}': expected a UUID")]
pub struct ParseIdError(String);

/// Hands out fresh identifiers for people and lineages.
pub trait IdAllocator {
    /// Allocates a new person identifier.
    fn person_id(&mut self) -> PersonId;

    /// Allocates a new lineage identifier.
    fn lineage_id(&mut self) -> LineageId;
}

/// Allocates random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdAllocator for RandomIds {
    fn person_id(&mut self) -> PersonId {
        PersonId(Uuid::new_v4())
    }

    fn lineage_id(&mut self) -> LineageId {
        LineageId(Uuid::new_v4())
    }
}

/// Allocates identifiers from a counter.
///
/// Person and lineage identifiers are drawn from the same sequence, so no two
/// identifiers handed out by one allocator ever collide.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    last: u128,
}

impl SequentialIds {
    /// Starts the sequence after `last`.
    #[must_use]
    pub const fn starting_after(last: u128) -> Self {
        Self { last }
    }

    fn next(&mut self) -> Uuid {
        self.last += 1;
        Uuid::from_u128(self.last)
    }
}

impl IdAllocator for SequentialIds {
    fn person_id(&mut self) -> PersonId {
        PersonId(self.next())
    }

    fn lineage_id(&mut self) -> LineageId {
        LineageId(self.next())
    }
}
