//! Statutory share calculation.
//!
//! [`compute`] distributes 100% of the estate among the living relatives
//! entitled to it on a reference date:
//!
//! 1. A living spouse next to first-order heirs takes half; the units of the
//!    first order share the other half.
//! 2. A living spouse without first-order heirs takes three quarters next to
//!    living parents or siblings (who split the rest per head), and
//!    everything otherwise.
//! 3. Without a spouse the first order takes everything, unit by unit.
//! 4. Without spouse or descendants the estate goes to living parents, then
//!    siblings, then grandparents, and finally to whoever is still alive.
//!
//! A unit of the first order is a living child, or the living grandchildren
//! of a deceased child, who split that child's share equally. Results are not
//! rounded.

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use crate::domain::{
    MatrimonialRegime, Person, PersonId, Relationship,
    lineage::{self, Unit},
};

mod share_map;
pub use share_map::ShareMap;

/// Percentage of the estate.
const WHOLE: f64 = 100.0;

/// The spouse's share next to first-order heirs.
const SPOUSE_WITH_DESCENDANTS: f64 = 50.0;

/// The spouse's share next to parents or siblings.
const SPOUSE_WITH_SECOND_ORDER: f64 = 75.0;

/// Splits `total` equally among `heirs`.
#[allow(clippy::cast_precision_loss)]
fn per_head(shares: &mut ShareMap, heirs: &[PersonId], total: f64) {
    if heirs.is_empty() {
        return;
    }
    let each = total / heirs.len() as f64;
    for &heir in heirs {
        shares.credit(heir, each);
    }
}

/// Splits `total` equally among `units`, and each unit equally among its heirs.
#[allow(clippy::cast_precision_loss)]
fn per_stirpes(shares: &mut ShareMap, units: &[Unit<'_>], total: f64) {
    if units.is_empty() {
        return;
    }
    let per_unit = total / units.len() as f64;
    for unit in units {
        let heirs: Vec<PersonId> = unit.heirs.iter().map(|p| p.id()).collect();
        per_head(shares, &heirs, per_unit);
    }
}

fn living(persons: &[Person], kind: Relationship, as_of: NaiveDate) -> Vec<PersonId> {
    persons
        .iter()
        .filter(|p| p.relationship == kind && p.is_alive(as_of))
        .map(Person::id)
        .collect()
}

/// Computes the statutory shares of `persons` on `as_of`.
///
/// The regime is accepted for the record; it does not change the quotas.
#[must_use]
#[instrument(level = "debug", skip(persons), fields(count = persons.len()))]
pub fn compute(persons: &[Person], regime: MatrimonialRegime, as_of: NaiveDate) -> ShareMap {
    let mut shares = ShareMap::new();

    let spouses = living(persons, Relationship::Spouse, as_of);
    let units = lineage::first_order_units(persons, as_of);

    match (spouses.is_empty(), units.is_empty()) {
        (false, false) => {
            debug!(units = units.len(), "spouse next to first-order heirs");
            per_head(&mut shares, &spouses, SPOUSE_WITH_DESCENDANTS);
            per_stirpes(&mut shares, &units, WHOLE - SPOUSE_WITH_DESCENDANTS);
        }
        (false, true) => {
            let mut second_order = living(persons, Relationship::Parent, as_of);
            second_order.extend(living(persons, Relationship::Sibling, as_of));

            if second_order.is_empty() {
                debug!("spouse inherits alone");
                per_head(&mut shares, &spouses, WHOLE);
            } else {
                debug!(heirs = second_order.len(), "spouse next to parents or siblings");
                per_head(&mut shares, &spouses, SPOUSE_WITH_SECOND_ORDER);
                per_head(
                    &mut shares,
                    &second_order,
                    WHOLE - SPOUSE_WITH_SECOND_ORDER,
                );
            }
        }
        (true, false) => {
            debug!(units = units.len(), "first order inherits alone");
            per_stirpes(&mut shares, &units, WHOLE);
        }
        (true, true) => {
            let fallback = [
                Relationship::Parent,
                Relationship::Sibling,
                Relationship::Grandparent,
            ]
            .into_iter()
            .map(|kind| (kind, living(persons, kind, as_of)))
            .find(|(_, heirs)| !heirs.is_empty());

            if let Some((kind, heirs)) = fallback {
                debug!(%kind, heirs = heirs.len(), "more remote order inherits");
                per_head(&mut shares, &heirs, WHOLE);
            } else {
                let anyone: Vec<PersonId> = persons
                    .iter()
                    .filter(|p| p.is_alive(as_of))
                    .map(Person::id)
                    .collect();
                debug!(heirs = anyone.len(), "no ranked heir, splitting among all living");
                per_head(&mut shares, &anyone, WHOLE);
            }
        }
    }

    shares
}

/// Something the caller should point out next to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Nobody inherits; the estate may fall to the state.
    NoStatutoryHeirs,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoStatutoryHeirs => f.write_str("no living statutory heir is recorded"),
        }
    }
}

/// The inputs of a calculation.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Recorded relatives.
    pub persons: &'a [Person],
    /// Matrimonial regime of the deceased.
    pub regime: MatrimonialRegime,
    /// Reference date for life status.
    pub as_of: NaiveDate,
    /// Value of the estate, if known.
    pub estate_value: Option<f64>,
}

/// A computed set of shares together with its inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// Matrimonial regime of the deceased.
    pub regime: MatrimonialRegime,
    /// Reference date for life status.
    pub as_of: NaiveDate,
    /// Value of the estate, if known.
    pub estate_value: Option<f64>,
    /// The shares.
    pub shares: ShareMap,
}

impl Calculation {
    /// Computes the shares of `persons`.
    #[must_use]
    pub fn new(persons: &[Person], regime: MatrimonialRegime, as_of: NaiveDate) -> Self {
        Self {
            regime,
            as_of,
            estate_value: None,
            shares: compute(persons, regime, as_of),
        }
    }

    /// Attaches an estate value.
    #[must_use]
    pub fn with_estate_value(mut self, value: f64) -> Self {
        self.estate_value = Some(value);
        self
    }

    /// The amount `id` inherits, if an estate value is known.
    #[must_use]
    pub fn amount_of(&self, id: PersonId) -> Option<f64> {
        self.estate_value
            .map(|value| value * self.shares.get(id) / WHOLE)
    }

    /// A caveat for this result, if any.
    #[must_use]
    pub fn warning(&self) -> Option<Warning> {
        self.shares.is_empty().then_some(Warning::NoStatutoryHeirs)
    }
}

/// Computes a [`Calculation`] for `request`.
#[must_use]
pub fn calculate(request: Request<'_>) -> Calculation {
    let mut calculation = Calculation::new(request.persons, request.regime, request.as_of);
    if let Some(value) = request.estate_value {
        calculation = calculation.with_estate_value(value);
    }
    if let Some(warning) = calculation.warning() {
        warn!(%warning, "degenerate result");
    }
    calculation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IdAllocator, LineageId, SequentialIds};

    const EPSILON: f64 = 1e-9;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn as_of() -> NaiveDate {
        date("2024-06-01")
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    #[derive(Default)]
    struct Family {
        ids: SequentialIds,
        persons: Vec<Person>,
    }

    impl Family {
        fn add(&mut self, relationship: Relationship, name: &str) -> PersonId {
            let person = Person::new(self.ids.person_id(), relationship, name, "Berg");
            let id = person.id();
            self.persons.push(person);
            id
        }

        fn dead(&mut self, relationship: Relationship, name: &str) -> PersonId {
            let id = self.add(relationship, name);
            self.kill(id);
            id
        }

        fn kill(&mut self, id: PersonId) {
            if let Some(person) = self.persons.iter_mut().find(|p| p.id() == id) {
                person.death_date = Some(date("2020-01-01"));
            }
        }

        fn child(&mut self, name: &str, alive: bool) -> (PersonId, LineageId) {
            let lineage = self.ids.lineage_id();
            let id = self.add(Relationship::Child, name);
            let person = self.persons.last_mut().unwrap();
            person.lineage_id = Some(lineage);
            if !alive {
                person.death_date = Some(date("2020-01-01"));
            }
            (id, lineage)
        }

        fn grandchild(&mut self, name: &str, parent: PersonId, lineage: LineageId) -> PersonId {
            let id = self.add(Relationship::Grandchild, name);
            let person = self.persons.last_mut().unwrap();
            person.parent_id = Some(parent);
            person.lineage_id = Some(lineage);
            id
        }

        fn compute(&self) -> ShareMap {
            compute(&self.persons, MatrimonialRegime::default(), as_of())
        }
    }

    #[test]
    fn spouse_and_two_children() {
        let mut family = Family::default();
        let spouse = family.add(Relationship::Spouse, "Helga");
        let (anna, _) = family.child("Anna", true);
        let (ben, _) = family.child("Ben", true);

        let shares = family.compute();

        assert_close(shares.get(spouse), 50.0);
        assert_close(shares.get(anna), 25.0);
        assert_close(shares.get(ben), 25.0);
        assert_close(shares.total(), 100.0);
    }

    #[test]
    fn deceased_child_represented_by_two_grandchildren() {
        let mut family = Family::default();
        let (anna, lineage) = family.child("Anna", false);
        let lea = family.grandchild("Lea", anna, lineage);
        let max = family.grandchild("Max", anna, lineage);
        let (ben, _) = family.child("Ben", true);

        let shares = family.compute();

        assert_close(shares.get(ben), 50.0);
        assert_close(shares.get(lea), 25.0);
        assert_close(shares.get(max), 25.0);
        assert_eq!(shares.share(anna), None);
        assert_eq!(shares.len(), 3);
    }

    #[test]
    fn spouse_with_parents_and_sibling() {
        let mut family = Family::default();
        let spouse = family.add(Relationship::Spouse, "Helga");
        let mother = family.add(Relationship::Parent, "Ilse");
        let father = family.add(Relationship::Parent, "Karl");
        let sister = family.add(Relationship::Sibling, "Eva");

        let shares = family.compute();

        assert_close(shares.get(spouse), 75.0);
        for heir in [mother, father, sister] {
            assert_close(shares.get(heir), 25.0 / 3.0);
        }
        assert_close(shares.total(), 100.0);
    }

    #[test]
    fn spouse_alone_inherits_everything() {
        let mut family = Family::default();
        let spouse = family.add(Relationship::Spouse, "Helga");
        family.dead(Relationship::Parent, "Karl");
        family.add(Relationship::Grandparent, "Otto");

        let shares = family.compute();

        assert_close(shares.get(spouse), 100.0);
        assert_eq!(shares.len(), 1);
    }

    #[test]
    fn nobody_alive_gives_an_empty_result() {
        let mut family = Family::default();
        family.dead(Relationship::Spouse, "Helga");
        family.dead(Relationship::Parent, "Karl");

        let calculation = Calculation::new(&family.persons, MatrimonialRegime::default(), as_of());
        assert!(calculation.shares.is_empty());
        assert_eq!(calculation.warning(), Some(Warning::NoStatutoryHeirs));

        let empty = compute(&[], MatrimonialRegime::default(), as_of());
        assert!(empty.is_empty());
    }

    #[test]
    fn parents_exclude_siblings_without_spouse() {
        let mut family = Family::default();
        let father = family.add(Relationship::Parent, "Karl");
        let sister = family.add(Relationship::Sibling, "Eva");

        let shares = family.compute();
        assert_close(shares.get(father), 100.0);
        assert_eq!(shares.share(sister), None);
    }

    #[test]
    fn falls_through_to_siblings_then_grandparents() {
        let mut family = Family::default();
        family.dead(Relationship::Parent, "Karl");
        let otto = family.add(Relationship::Grandparent, "Otto");
        let eva = family.add(Relationship::Sibling, "Eva");
        let paul = family.add(Relationship::Sibling, "Paul");

        let shares = family.compute();
        assert_close(shares.get(eva), 50.0);
        assert_close(shares.get(paul), 50.0);
        assert_eq!(shares.share(otto), None);

        family.kill(eva);
        family.kill(paul);
        let shares = family.compute();
        assert_close(shares.get(otto), 100.0);
    }

    #[test]
    fn last_resort_splits_among_all_living() {
        let mut family = Family::default();
        let niece = family.add(Relationship::NieceNephew, "Mia");
        let great = family.add(Relationship::GreatGrandparent, "Gustav");

        let shares = family.compute();
        assert_close(shares.get(niece), 50.0);
        assert_close(shares.get(great), 50.0);
    }

    #[test]
    fn spouse_priority_holds_with_and_without_descendants() {
        let mut family = Family::default();
        let spouse = family.add(Relationship::Spouse, "Helga");
        family.add(Relationship::Parent, "Karl");
        assert_close(family.compute().get(spouse), 75.0);

        let (anna, lineage) = family.child("Anna", false);
        family.grandchild("Lea", anna, lineage);
        assert_close(family.compute().get(spouse), 50.0);
    }

    #[test]
    fn living_child_halves_a_sole_spouse() {
        let mut family = Family::default();
        let spouse = family.add(Relationship::Spouse, "Helga");
        assert_close(family.compute().get(spouse), 100.0);

        let (anna, _) = family.child("Anna", true);
        let shares = family.compute();
        assert_close(shares.get(spouse), 50.0);
        assert_close(shares.get(anna), 50.0);
    }

    #[test]
    fn two_spouses_split_the_spouse_quota() {
        let mut family = Family::default();
        let helga = family.add(Relationship::Spouse, "Helga");
        let ingrid = family.add(Relationship::Spouse, "Ingrid");
        let (anna, _) = family.child("Anna", true);

        let shares = family.compute();

        assert_close(shares.get(helga), 25.0);
        assert_close(shares.get(ingrid), 25.0);
        assert_close(shares.get(anna), 50.0);
        assert_close(shares.total(), 100.0);
    }

    #[test]
    fn represented_unit_equals_a_living_child_share() {
        let mut family = Family::default();
        family.add(Relationship::Spouse, "Helga");
        let (ben, _) = family.child("Ben", true);
        let (anna, lineage) = family.child("Anna", false);
        let heirs = [
            family.grandchild("Lea", anna, lineage),
            family.grandchild("Max", anna, lineage),
            family.grandchild("Nora", anna, lineage),
        ];

        let shares = family.compute();
        let stirps: f64 = heirs.iter().map(|&id| shares.get(id)).sum();
        assert_close(stirps, shares.get(ben));
        for heir in heirs {
            assert_close(shares.get(heir), 25.0 / 3.0);
        }
    }

    #[test]
    fn compute_is_deterministic() {
        let mut family = Family::default();
        family.add(Relationship::Spouse, "Helga");
        let (anna, lineage) = family.child("Anna", false);
        family.grandchild("Lea", anna, lineage);
        family.child("Ben", true);

        let first = family.compute();
        let second = family.compute();
        assert_eq!(first, second);
        assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn regime_does_not_change_quotas() {
        let mut family = Family::default();
        family.add(Relationship::Spouse, "Helga");
        family.child("Anna", true);

        let baseline = family.compute();
        for regime in MatrimonialRegime::ALL {
            assert_eq!(compute(&family.persons, regime, as_of()), baseline);
        }
    }

    #[test]
    fn shares_always_sum_to_one_hundred() {
        let mut family = Family::default();
        family.add(Relationship::Spouse, "Helga");
        family.add(Relationship::Parent, "Karl");
        family.add(Relationship::Sibling, "Eva");
        family.add(Relationship::Grandparent, "Otto");
        for (name, alive) in [("Anna", false), ("Ben", true), ("Carla", false)] {
            let (child, lineage) = family.child(name, alive);
            family.grandchild("Kid", child, lineage);
        }

        let shares = family.compute();
        assert_close(shares.total(), 100.0);
        assert!(shares.iter().all(|(_, share)| share > 0.0 && share <= 100.0));
    }

    #[test]
    fn amounts_follow_shares() {
        let mut family = Family::default();
        let spouse = family.add(Relationship::Spouse, "Helga");
        let (anna, _) = family.child("Anna", true);
        let stranger = family.ids.person_id();

        let calculation = calculate(Request {
            persons: &family.persons,
            regime: MatrimonialRegime::CommunityOfAccruedGains,
            as_of: as_of(),
            estate_value: Some(240_000.0),
        });

        assert_close(calculation.amount_of(spouse).unwrap(), 120_000.0);
        assert_close(calculation.amount_of(anna).unwrap(), 120_000.0);
        assert_close(calculation.amount_of(stranger).unwrap(), 0.0);
        assert_eq!(calculation.warning(), None);

        let without_value =
            Calculation::new(&family.persons, MatrimonialRegime::default(), as_of());
        assert_eq!(without_value.amount_of(spouse), None);
    }
}
