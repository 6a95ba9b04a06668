use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{LineageId, PersonId};

/// How a recorded relative is related to the deceased.
///
/// The German terms used by older data sets are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Husband or wife of the deceased.
    #[serde(alias = "ehepartner")]
    Spouse,
    /// Son or daughter.
    #[serde(alias = "kind")]
    Child,
    /// Mother or father.
    #[serde(alias = "elternteil")]
    Parent,
    /// Brother or sister.
    #[serde(alias = "geschwister")]
    Sibling,
    /// Child of a sibling.
    #[serde(alias = "neffe")]
    NieceNephew,
    /// Parent of a parent.
    #[serde(alias = "großelternteil")]
    Grandparent,
    /// Grandparent of a parent.
    #[serde(alias = "urgroßelternteil")]
    GreatGrandparent,
    /// Child of a child.
    #[serde(alias = "enkel")]
    Grandchild,
}

impl Relationship {
    /// Every relationship, in statutory order.
    pub const ALL: [Self; 8] = [
        Self::Spouse,
        Self::Child,
        Self::Grandchild,
        Self::Parent,
        Self::Sibling,
        Self::NieceNephew,
        Self::Grandparent,
        Self::GreatGrandparent,
    ];

    /// The canonical machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spouse => "spouse",
            Self::Child => "child",
            Self::Parent => "parent",
            Self::Sibling => "sibling",
            Self::NieceNephew => "niece_nephew",
            Self::Grandparent => "grandparent",
            Self::GreatGrandparent => "great_grandparent",
            Self::Grandchild => "grandchild",
        }
    }

    /// Generation depth a record of this kind gets by default.
    ///
    /// Spouses share the deceased's generation and get `0`.
    #[must_use]
    pub const fn default_generation(self) -> u32 {
        match self {
            Self::Spouse => 0,
            Self::Child | Self::Parent | Self::Sibling => 1,
            Self::Grandchild | Self::Grandparent | Self::NieceNephew => 2,
            Self::GreatGrandparent => 3,
        }
    }

    /// Whether this relative is a descendant of the deceased.
    #[must_use]
    pub const fn is_descendant(self) -> bool {
        matches!(self, Self::Child | Self::Grandchild)
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = ParseRelationshipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let relationship = match normalized.as_str() {
            "spouse" | "ehepartner" => Self::Spouse,
            "child" | "kind" => Self::Child,
            "parent" | "elternteil" => Self::Parent,
            "sibling" | "geschwister" => Self::Sibling,
            "niece_nephew" | "niece" | "nephew" | "neffe" => Self::NieceNephew,
            "grandparent" | "großelternteil" => Self::Grandparent,
            "great_grandparent" | "urgroßelternteil" => Self::GreatGrandparent,
            "grandchild" | "enkel" => Self::Grandchild,
            _ => return Err(ParseRelationshipError(s.to_string())),
        };
        Ok(relationship)
    }
}

/// Error returned when a string names no known relationship.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown relationship '{0}'")]
pub struct ParseRelationshipError(String);

/// A relative of the deceased.
///
/// Records are never mutated by the core once recorded; edits replace the
/// whole record, keyed by [`Person::id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: PersonId,

    /// How this person is related to the deceased.
    pub relationship: Relationship,

    /// Given name.
    pub given_name: String,

    /// Family name.
    pub family_name: String,

    /// Date of birth, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    /// Date of death, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,

    /// The relative this person descends from (a grandchild's parent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PersonId>,

    /// Depth from the deceased: 1 for children and parents, 2 for
    /// grandchildren and grandparents, and so on.
    #[serde(default)]
    pub generation: u32,

    /// The stirps this person belongs to, for descendants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_id: Option<LineageId>,
}

impl Person {
    /// Creates a record with the default generation for its relationship.
    #[must_use]
    pub fn new(
        id: PersonId,
        relationship: Relationship,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            relationship,
            given_name: given_name.into(),
            family_name: family_name.into(),
            birth_date: None,
            death_date: None,
            parent_id: None,
            generation: relationship.default_generation(),
            lineage_id: None,
        }
    }

    /// Sets the date of birth.
    #[must_use]
    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    /// Sets the date of death.
    #[must_use]
    pub fn with_death_date(mut self, date: NaiveDate) -> Self {
        self.death_date = Some(date);
        self
    }

    /// Sets the parent this person descends from.
    #[must_use]
    pub fn with_parent(mut self, parent: PersonId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Sets the stirps this person belongs to.
    #[must_use]
    pub fn with_lineage(mut self, lineage: LineageId) -> Self {
        self.lineage_id = Some(lineage);
        self
    }

    /// Overrides the generation depth.
    #[must_use]
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    /// The stable identifier of this record.
    #[must_use]
    pub const fn id(&self) -> PersonId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: PersonId) {
        self.id = id;
    }

    /// Given and family name, separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }

    /// Whether the person was alive on `as_of`.
    ///
    /// A person with a death date on or before `as_of` is deceased. The death
    /// date is not checked against the birth date.
    #[must_use]
    pub fn is_alive(&self, as_of: NaiveDate) -> bool {
        self.death_date.is_none_or(|death| death > as_of)
    }

    /// The inverse of [`Person::is_alive`].
    #[must_use]
    pub fn is_deceased(&self, as_of: NaiveDate) -> bool {
        !self.is_alive(as_of)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IdAllocator, SequentialIds};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn death_on_the_reference_date_counts_as_deceased() {
        let mut ids = SequentialIds::default();
        let person = Person::new(ids.person_id(), Relationship::Child, "Anna", "Berg")
            .with_death_date(date("2024-03-01"));

        assert!(person.is_alive(date("2024-02-29")));
        assert!(person.is_deceased(date("2024-03-01")));
        assert!(person.is_deceased(date("2025-01-01")));
    }

    #[test]
    fn no_death_date_means_alive() {
        let mut ids = SequentialIds::default();
        let person = Person::new(ids.person_id(), Relationship::Parent, "Karl", "Berg");
        assert!(person.is_alive(date("2100-01-01")));
    }

    #[test]
    fn death_before_birth_is_not_validated() {
        let mut ids = SequentialIds::default();
        let person = Person::new(ids.person_id(), Relationship::Sibling, "Eva", "Berg")
            .with_birth_date(date("2000-01-01"))
            .with_death_date(date("1990-01-01"));
        assert!(person.is_deceased(date("2000-01-01")));
    }

    #[test]
    fn relationship_parses_german_and_kebab_case() {
        assert_eq!("Enkel".parse::<Relationship>(), Ok(Relationship::Grandchild));
        assert_eq!(
            "great-grandparent".parse::<Relationship>(),
            Ok(Relationship::GreatGrandparent)
        );
        assert!("cousin".parse::<Relationship>().is_err());
    }

    #[test]
    fn deserializes_legacy_relationship_names() {
        let relationship: Relationship = serde_json::from_str("\"ehepartner\"").unwrap();
        assert_eq!(relationship, Relationship::Spouse);
        assert_eq!(
            serde_json::to_string(&Relationship::NieceNephew).unwrap(),
            "\"niece_nephew\""
        );
    }

    #[test]
    fn new_person_gets_generation_from_relationship() {
        let mut ids = SequentialIds::default();
        let grandchild = Person::new(ids.person_id(), Relationship::Grandchild, "Lea", "Berg");
        assert_eq!(grandchild.generation, 2);
        assert_eq!(grandchild.full_name(), "Lea Berg");
    }
}
