//! Domain models for statutory succession.
//!
//! This module contains the recorded relatives, their identifiers, the
//! matrimonial regime, the registry that holds them, and configuration.

use chrono::NaiveDate;

mod id;
pub use id::{IdAllocator, LineageId, ParseIdError, PersonId, RandomIds, SequentialIds};

mod person;
pub use person::{ParseRelationshipError, Person, Relationship};

mod regime;
pub use regime::{MatrimonialRegime, ParseRegimeError};

mod registry;
pub use registry::{LineageIssue, Registry, RegistryError};

/// Stirps grouping of first-order descendants.
pub mod lineage;
pub use lineage::{Unit, UnitKind};

mod config;
pub use config::Config;

/// The local calendar date, used as the reference date by default.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
