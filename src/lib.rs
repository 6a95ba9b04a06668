//! Statutory succession for notary offices
//!
//! Relatives of a deceased person are collected through a guided interview
//! and their statutory inheritance shares are computed from the family graph.

pub mod domain;
pub use domain::{
    Config, IdAllocator, LineageId, MatrimonialRegime, Person, PersonId, RandomIds, Registry,
    Relationship,
};

/// The guided family interview.
pub mod interview;
pub use interview::{Event, Interview, InterviewOutcome, PersonForm, Step};

/// Statutory share calculation.
pub mod calculator;
pub use calculator::{Calculation, ShareMap, compute};

/// Display tree of a family and its shares.
pub mod projection;
pub use projection::{TreeNode, project};

/// Persistence of collected family data.
pub mod storage;
pub use storage::{Snapshot, SnapshotStore};
