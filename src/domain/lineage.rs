//! Stirps bookkeeping for first-order descendants.
//!
//! A living child forms a unit on its own. A deceased child is represented by
//! its living descendants, who together form one unit keyed by the shared
//! [`LineageId`].

use std::collections::HashSet;

use chrono::NaiveDate;
use nonempty::NonEmpty;

use crate::domain::{LineageId, Person, PersonId, Relationship};

/// What a first-order unit stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// A living child inheriting in its own right.
    Child(PersonId),
    /// The living descendants of a deceased child.
    Represented(LineageId),
}

/// One share-bearing unit of the first order.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit<'a> {
    /// What the unit stands for.
    pub kind: UnitKind,

    /// The persons the unit's share is split between, in recorded order.
    pub heirs: NonEmpty<&'a Person>,
}

impl Unit<'_> {
    /// The number of heirs splitting this unit's share.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heirs.len()
    }

    /// Always `false`: a unit has at least one heir.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Grandchildren belonging to `lineage`, in recorded order.
#[must_use]
pub fn stirpes_of(persons: &[Person], lineage: LineageId) -> Vec<&Person> {
    persons
        .iter()
        .filter(|p| p.relationship == Relationship::Grandchild && p.lineage_id == Some(lineage))
        .collect()
}

/// The first-order units standing to inherit on `as_of`.
///
/// Living children come first in recorded order. Each lineage that has a
/// living grandchild but no living child follows, ordered by the first
/// appearance of one of its grandchildren. Grandchildren with no lineage do
/// not take part.
#[must_use]
pub fn first_order_units(persons: &[Person], as_of: NaiveDate) -> Vec<Unit<'_>> {
    let living = |kind: Relationship| {
        persons
            .iter()
            .filter(move |p| p.relationship == kind && p.is_alive(as_of))
    };

    let mut units: Vec<Unit<'_>> = living(Relationship::Child)
        .map(|child| Unit {
            kind: UnitKind::Child(child.id()),
            heirs: NonEmpty::new(child),
        })
        .collect();

    let covered: HashSet<LineageId> = living(Relationship::Child)
        .filter_map(|child| child.lineage_id)
        .collect();

    let mut seen = HashSet::new();
    for grandchild in living(Relationship::Grandchild) {
        let Some(lineage) = grandchild.lineage_id else {
            continue;
        };
        if covered.contains(&lineage) || !seen.insert(lineage) {
            continue;
        }

        let mut heirs = NonEmpty::new(grandchild);
        for sibling in living(Relationship::Grandchild)
            .filter(|p| p.lineage_id == Some(lineage) && p.id() != grandchild.id())
        {
            heirs.push(sibling);
        }

        units.push(Unit {
            kind: UnitKind::Represented(lineage),
            heirs,
        });
    }

    units
}

/// The number of first-order units on `as_of`.
#[must_use]
pub fn living_first_order_units(persons: &[Person], as_of: NaiveDate) -> usize {
    first_order_units(persons, as_of).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IdAllocator, SequentialIds};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    struct Family {
        ids: SequentialIds,
        persons: Vec<Person>,
    }

    impl Family {
        fn new() -> Self {
            Self {
                ids: SequentialIds::default(),
                persons: Vec::new(),
            }
        }

        fn child(&mut self, name: &str, died: Option<&str>) -> (PersonId, LineageId) {
            let lineage = self.ids.lineage_id();
            let mut child = Person::new(self.ids.person_id(), Relationship::Child, name, "Berg")
                .with_lineage(lineage);
            if let Some(died) = died {
                child = child.with_death_date(date(died));
            }
            let id = child.id();
            self.persons.push(child);
            (id, lineage)
        }

        fn grandchild(&mut self, name: &str, parent: PersonId, lineage: Option<LineageId>) {
            let mut grandchild =
                Person::new(self.ids.person_id(), Relationship::Grandchild, name, "Berg")
                    .with_parent(parent);
            if let Some(lineage) = lineage {
                grandchild = grandchild.with_lineage(lineage);
            }
            self.persons.push(grandchild);
        }
    }

    #[test]
    fn living_children_come_before_represented_lineages() {
        let mut family = Family::new();
        let (dead, dead_lineage) = family.child("Anna", Some("2020-01-01"));
        family.grandchild("Lea", dead, Some(dead_lineage));
        let (ben, _) = family.child("Ben", None);
        family.grandchild("Max", dead, Some(dead_lineage));

        let units = first_order_units(&family.persons, date("2024-01-01"));

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Child(ben));
        assert_eq!(units[1].kind, UnitKind::Represented(dead_lineage));
        let names: Vec<_> = units[1]
            .heirs
            .iter()
            .map(|p| p.given_name.as_str())
            .collect();
        assert_eq!(names, ["Lea", "Max"]);
    }

    #[test]
    fn living_child_excludes_its_own_descendants() {
        let mut family = Family::new();
        let (anna, lineage) = family.child("Anna", None);
        family.grandchild("Lea", anna, Some(lineage));

        let units = first_order_units(&family.persons, date("2024-01-01"));
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].kind, UnitKind::Child(anna));
    }

    #[test]
    fn grandchildren_without_lineage_are_ignored() {
        let mut family = Family::new();
        let (anna, _) = family.child("Anna", Some("2020-01-01"));
        family.grandchild("Lea", anna, None);

        assert_eq!(living_first_order_units(&family.persons, date("2024-01-01")), 0);
    }

    #[test]
    fn stirps_without_living_members_drops_out() {
        let mut family = Family::new();
        let (anna, lineage) = family.child("Anna", Some("2020-01-01"));
        family.grandchild("Lea", anna, Some(lineage));
        family.persons[1].death_date = Some(date("2021-01-01"));

        assert!(first_order_units(&family.persons, date("2024-01-01")).is_empty());
        assert_eq!(stirpes_of(&family.persons, lineage).len(), 1);
    }
}
