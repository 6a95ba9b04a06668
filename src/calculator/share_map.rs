use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::PersonId;

/// Statutory shares in percent, keyed by person.
///
/// Iteration is ordered by identifier. A person without an entry inherits
/// nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareMap(BTreeMap<PersonId, f64>);

impl ShareMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds `percent` to the share of `id`.
    pub(crate) fn credit(&mut self, id: PersonId, percent: f64) {
        *self.0.entry(id).or_insert(0.0) += percent;
    }

    /// The share of `id` in percent, `0.0` if it has none.
    #[must_use]
    pub fn get(&self, id: PersonId) -> f64 {
        self.share(id).unwrap_or(0.0)
    }

    /// The share of `id` in percent, if it has an entry.
    #[must_use]
    pub fn share(&self, id: PersonId) -> Option<f64> {
        self.0.get(&id).copied()
    }

    /// Entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (PersonId, f64)> + '_ {
        self.0.iter().map(|(&id, &share)| (id, share))
    }

    /// The number of heirs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nobody inherits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The sum of all shares.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// The share of `id` formatted as a percentage, `"0%"` if it has none.
    #[must_use]
    pub fn format(&self, id: PersonId, decimals: usize) -> String {
        self.share(id)
            .map_or_else(|| "0%".to_string(), |share| format!("{share:.decimals$}%"))
    }
}

impl<'a> IntoIterator for &'a ShareMap {
    type Item = (&'a PersonId, &'a f64);
    type IntoIter = std::collections::btree_map::Iter<'a, PersonId, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
