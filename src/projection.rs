//! Display tree of a family and its shares.
//!
//! The tree is a plain nested structure for renderers. The deceased is the
//! root; spouses come first beneath it, then children with their own
//! children nested below, then everybody else.

use std::collections::{BTreeMap, HashSet};

use petgraph::{Direction, graphmap::DiGraphMap};
use serde::Serialize;

use crate::{
    calculator::ShareMap,
    domain::{Person, PersonId, Relationship},
};

/// Label used when no name of the deceased is known.
pub const DEFAULT_ROOT_LABEL: &str = "Deceased";

/// A node of the display tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// The person's full name.
    pub name: String,
    /// Display attributes such as `relationship` or `share`.
    pub attributes: BTreeMap<String, String>,
    /// Nested nodes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(person: &Person, shares: &ShareMap, decimals: usize) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "relationship".to_string(),
            person.relationship.to_string(),
        );
        if let Some(birth) = person.birth_date {
            attributes.insert("birth".to_string(), birth.to_string());
        }
        if let Some(death) = person.death_date {
            attributes.insert("death".to_string(), death.to_string());
        }
        attributes.insert("share".to_string(), shares.format(person.id(), decimals));

        Self {
            name: person.full_name(),
            attributes,
            children: Vec::new(),
        }
    }

    /// An attribute value, if present.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The number of nodes in this subtree, including this one.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Self::size).sum::<usize>()
    }
}

/// Builds the display tree with shares shown to two decimals.
#[must_use]
pub fn project(deceased_label: &str, persons: &[Person], shares: &ShareMap) -> TreeNode {
    project_with_precision(deceased_label, persons, shares, 2)
}

/// Builds the display tree with shares shown to `decimals` decimals.
#[must_use]
pub fn project_with_precision(
    deceased_label: &str,
    persons: &[Person],
    shares: &ShareMap,
    decimals: usize,
) -> TreeNode {
    let by_id: BTreeMap<PersonId, &Person> = persons.iter().map(|p| (p.id(), p)).collect();

    // Edges run from a recorded child to the grandchildren naming it.
    let mut descent = DiGraphMap::<PersonId, ()>::new();
    for person in persons {
        let Some(parent) = person.parent_id else {
            continue;
        };
        let nests = person.relationship == Relationship::Grandchild
            && by_id
                .get(&parent)
                .is_some_and(|p| p.relationship == Relationship::Child);
        if nests {
            descent.add_edge(parent, person.id(), ());
        }
    }

    let mut placed = HashSet::new();
    let mut children = Vec::with_capacity(persons.len());

    for spouse in persons
        .iter()
        .filter(|p| p.relationship == Relationship::Spouse)
    {
        placed.insert(spouse.id());
        children.push(TreeNode::leaf(spouse, shares, decimals));
    }

    for child in persons
        .iter()
        .filter(|p| p.relationship == Relationship::Child)
    {
        placed.insert(child.id());
        let mut node = TreeNode::leaf(child, shares, decimals);
        if descent.contains_node(child.id()) {
            // Graph neighbour order is not the recorded order.
            let mut nested: Vec<&Person> = descent
                .neighbors_directed(child.id(), Direction::Outgoing)
                .filter_map(|id| by_id.get(&id).copied())
                .collect();
            nested.sort_by_key(|p| persons.iter().position(|q| q.id() == p.id()));
            for grandchild in nested {
                placed.insert(grandchild.id());
                node.children
                    .push(TreeNode::leaf(grandchild, shares, decimals));
            }
        }
        children.push(node);
    }

    for other in persons.iter().filter(|p| !placed.contains(&p.id())) {
        children.push(TreeNode::leaf(other, shares, decimals));
    }

    let label = deceased_label.trim();
    let mut attributes = BTreeMap::new();
    attributes.insert("role".to_string(), "deceased".to_string());

    TreeNode {
        name: if label.is_empty() {
            DEFAULT_ROOT_LABEL.to_string()
        } else {
            label.to_string()
        },
        attributes,
        children,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        calculator::compute,
        domain::{IdAllocator, MatrimonialRegime, SequentialIds},
    };

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn nests_grandchildren_under_their_parent() {
        let mut ids = SequentialIds::default();
        let lineage = ids.lineage_id();
        let anna = Person::new(ids.person_id(), Relationship::Child, "Anna", "Berg")
            .with_lineage(lineage)
            .with_death_date(date("2020-01-01"));
        let father = Person::new(ids.person_id(), Relationship::Parent, "Karl", "Berg");
        let lea = Person::new(ids.person_id(), Relationship::Grandchild, "Lea", "Berg")
            .with_parent(anna.id())
            .with_lineage(lineage)
            .with_birth_date(date("2001-02-03"));
        let max = Person::new(ids.person_id(), Relationship::Grandchild, "Max", "Berg")
            .with_parent(anna.id())
            .with_lineage(lineage);
        let spouse = Person::new(ids.person_id(), Relationship::Spouse, "Helga", "Berg");
        let stray = Person::new(ids.person_id(), Relationship::Grandchild, "Olaf", "Berg")
            .with_parent(ids.person_id());

        let persons = vec![anna, father, lea, max, spouse, stray];
        let shares = compute(&persons, MatrimonialRegime::default(), date("2024-06-01"));
        let tree = project("Erich Berg", &persons, &shares);

        assert_eq!(tree.name, "Erich Berg");
        assert_eq!(tree.attribute("role"), Some("deceased"));
        let names: Vec<_> = tree.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Helga Berg", "Anna Berg", "Karl Berg", "Olaf Berg"]);

        let anna_node = &tree.children[1];
        let nested: Vec<_> = anna_node.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(nested, ["Lea Berg", "Max Berg"]);
        assert_eq!(anna_node.attribute("share"), Some("0%"));
        assert_eq!(anna_node.attribute("death"), Some("2020-01-01"));
        assert_eq!(anna_node.children[0].attribute("birth"), Some("2001-02-03"));
        assert_eq!(anna_node.children[0].attribute("share"), Some("25.00%"));
        assert_eq!(tree.children[0].attribute("share"), Some("50.00%"));
        assert_eq!(tree.size(), 7);
    }

    #[test]
    fn blank_label_falls_back_to_default() {
        let tree = project("  ", &[], &ShareMap::new());
        assert_eq!(tree.name, DEFAULT_ROOT_LABEL);
        assert!(tree.children.is_empty());

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["attributes"]["role"], "deceased");
        assert!(json.get("children").is_none());
    }
}
