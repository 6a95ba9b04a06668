//! The in-memory set of recorded relatives.
//!
//! The [`Registry`] knows nothing about persistence. Callers may snapshot
//! [`Registry::all`] and later re-seed a registry with
//! [`Registry::from_persons`].

use std::{collections::HashMap, fmt};

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    LineageId, Person, PersonId, Relationship,
    lineage::{self, Unit},
};

/// The relatives recorded for one deceased person, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    persons: Vec<Person>,

    /// Position of each person in `persons`.
    index: HashMap<PersonId, usize>,
}

/// Errors that can occur when modifying a [`Registry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No person with this identifier is recorded.
    #[error("person {0} not found")]
    NotFound(PersonId),
    /// A person with this identifier is already recorded.
    #[error("person {0} is already recorded")]
    Duplicate(PersonId),
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry from an ordered sequence of records.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if two records share an id.
    pub fn from_persons(persons: impl IntoIterator<Item = Person>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for person in persons {
            registry.add(person)?;
        }
        Ok(registry)
    }

    /// Appends a record and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the id is already recorded.
    pub fn add(&mut self, person: Person) -> Result<PersonId, RegistryError> {
        let id = person.id();
        if self.index.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.index.insert(id, self.persons.len());
        self.persons.push(person);
        Ok(id)
    }

    /// Replaces the record stored under `id`, keeping its position.
    ///
    /// The replacement is stored under `id` whatever id it carried before.
    /// Returns the previous record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` is not recorded.
    pub fn replace(&mut self, id: PersonId, mut person: Person) -> Result<Person, RegistryError> {
        let position = *self.index.get(&id).ok_or(RegistryError::NotFound(id))?;
        person.set_id(id);
        Ok(std::mem::replace(&mut self.persons[position], person))
    }

    /// Removes the record stored under `id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` is not recorded.
    pub fn remove(&mut self, id: PersonId) -> Result<Person, RegistryError> {
        let position = self.index.remove(&id).ok_or(RegistryError::NotFound(id))?;
        let removed = self.persons.remove(position);

        // Everything after the removed record shifted down by one.
        for person in &self.persons[position..] {
            if let Some(slot) = self.index.get_mut(&person.id()) {
                *slot -= 1;
            }
        }

        Ok(removed)
    }

    /// Looks up a record by identifier.
    #[must_use]
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.index.get(&id).map(|&position| &self.persons[position])
    }

    /// Every record, in insertion order.
    #[must_use]
    pub fn all(&self) -> &[Person] {
        &self.persons
    }

    /// Records with the given relationship, in insertion order.
    pub fn by_relationship(&self, kind: Relationship) -> impl Iterator<Item = &Person> + '_ {
        self.persons
            .iter()
            .filter(move |person| person.relationship == kind)
    }

    /// Whether `person` was alive on `as_of`.
    #[must_use]
    pub fn is_alive(person: &Person, as_of: NaiveDate) -> bool {
        person.is_alive(as_of)
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Whether no records exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Consumes the registry, returning the records in insertion order.
    #[must_use]
    pub fn into_persons(self) -> Vec<Person> {
        self.persons
    }

    /// Grandchildren belonging to the given stirps.
    #[must_use]
    pub fn stirpes_of(&self, lineage: LineageId) -> Vec<&Person> {
        lineage::stirpes_of(&self.persons, lineage)
    }

    /// The first-order units standing to inherit on `as_of`.
    #[must_use]
    pub fn first_order_units(&self, as_of: NaiveDate) -> Vec<Unit<'_>> {
        lineage::first_order_units(&self.persons, as_of)
    }

    /// The number of first-order units on `as_of`.
    #[must_use]
    pub fn living_first_order_units(&self, as_of: NaiveDate) -> usize {
        lineage::living_first_order_units(&self.persons, as_of)
    }

    /// Finds records that break the lineage rules for grandchildren.
    ///
    /// A grandchild must name a recorded child as its parent and share that
    /// child's lineage. These rules are not enforced on insertion, since bulk
    /// imports may arrive in any state.
    #[must_use]
    pub fn lineage_issues(&self) -> Vec<LineageIssue> {
        let mut issues = Vec::new();

        for grandchild in self.by_relationship(Relationship::Grandchild) {
            let id = grandchild.id();

            if grandchild.lineage_id.is_none() {
                issues.push(LineageIssue::MissingLineage { grandchild: id });
            }

            let Some(parent_id) = grandchild.parent_id else {
                issues.push(LineageIssue::MissingParent { grandchild: id });
                continue;
            };

            let Some(parent) = self.get(parent_id) else {
                issues.push(LineageIssue::UnknownParent {
                    grandchild: id,
                    parent: parent_id,
                });
                continue;
            };

            if parent.relationship != Relationship::Child {
                issues.push(LineageIssue::ParentNotChild {
                    grandchild: id,
                    parent: parent_id,
                    relationship: parent.relationship,
                });
            } else if grandchild.lineage_id.is_some() && parent.lineage_id != grandchild.lineage_id
            {
                issues.push(LineageIssue::LineageMismatch {
                    grandchild: id,
                    parent: parent_id,
                });
            }
        }

        issues
    }
}

/// A grandchild record that breaks the lineage rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageIssue {
    /// The grandchild names no parent.
    MissingParent {
        /// The offending grandchild.
        grandchild: PersonId,
    },
    /// The named parent is not recorded.
    UnknownParent {
        /// The offending grandchild.
        grandchild: PersonId,
        /// The parent it names.
        parent: PersonId,
    },
    /// The named parent is not a child of the deceased.
    ParentNotChild {
        /// The offending grandchild.
        grandchild: PersonId,
        /// The parent it names.
        parent: PersonId,
        /// The parent's actual relationship.
        relationship: Relationship,
    },
    /// The grandchild and its parent belong to different lineages.
    LineageMismatch {
        /// The offending grandchild.
        grandchild: PersonId,
        /// The parent it names.
        parent: PersonId,
    },
    /// The grandchild belongs to no lineage.
    MissingLineage {
        /// The offending grandchild.
        grandchild: PersonId,
    },
}

impl LineageIssue {
    /// The grandchild the issue concerns.
    #[must_use]
    pub const fn grandchild(&self) -> PersonId {
        match self {
            Self::MissingParent { grandchild }
            | Self::UnknownParent { grandchild, .. }
            | Self::ParentNotChild { grandchild, .. }
            | Self::LineageMismatch { grandchild, .. }
            | Self::MissingLineage { grandchild } => *grandchild,
        }
    }
}

impl fmt::Display for LineageIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParent { grandchild } => {
                write!(f, "grandchild {grandchild} names no parent")
            }
            Self::UnknownParent { grandchild, parent } => {
                write!(f, "grandchild {grandchild} names unknown parent {parent}")
            }
            Self::ParentNotChild {
                grandchild,
                parent,
                relationship,
            } => write!(
                f,
                "grandchild {grandchild} names {parent} as parent, a {relationship} not a child"
            ),
            Self::LineageMismatch { grandchild, parent } => write!(
                f,
                "grandchild {grandchild} is in a different lineage than its parent {parent}"
            ),
            Self::MissingLineage { grandchild } => {
                write!(f, "grandchild {grandchild} belongs to no lineage")
            }
        }
    }
}
