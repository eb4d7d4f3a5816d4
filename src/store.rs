use std::collections::HashMap;

use tracing::trace;

/// One side of a relationship as seen from a person's neighbor list.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub person: String,
    pub label: String,
}

/// A relationship exactly as it was declared: `from --label--> to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub from: String,
    pub label: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: String,
    pub neighbors: Vec<Neighbor>,
}

/// Append-only store of people and the relationships between them.
///
/// Every relationship is recorded twice in the neighbor lists (once per
/// endpoint) and once, in declaration order, in the edge list. People are
/// enumerated in the order they were first added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipStore {
    people: Vec<Person>,
    index: HashMap<String, usize>,
    edges: Vec<Relationship>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_person(&mut self, id: &str) {
        self.slot(id);
    }

    pub fn add_relationship(&mut self, from: &str, label: &str, to: &str) {
        let a = self.slot(from);
        let b = self.slot(to);

        self.people[a].neighbors.push(Neighbor {
            person: to.to_string(),
            label: label.to_string(),
        });
        self.people[b].neighbors.push(Neighbor {
            person: from.to_string(),
            label: label.to_string(),
        });
        self.edges.push(Relationship {
            from: from.to_string(),
            label: label.to_string(),
            to: to.to_string(),
        });
        trace!(from, label, to, "relationship added");
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// People in insertion order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    /// The first person ever added, if any.
    pub fn first(&self) -> Option<&str> {
        self.people.first().map(|p| p.id.as_str())
    }

    pub fn neighbors(&self, id: &str) -> &[Neighbor] {
        self.index
            .get(id)
            .map(|&i| self.people[i].neighbors.as_slice())
            .unwrap_or(&[])
    }

    pub fn edges(&self) -> &[Relationship] {
        &self.edges
    }

    /// Relationships declared with `id` as the source, in declaration order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }

    fn slot(&mut self, id: &str) -> usize {
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        let i = self.people.len();
        self.people.push(Person {
            id: id.to_string(),
            neighbors: Vec::new(),
        });
        self.index.insert(id.to_string(), i);
        trace!(id, "person added");
        i
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn neighbor(person: &str, label: &str) -> Neighbor {
        Neighbor {
            person: person.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn add_person_is_idempotent() {
        let mut store = RelationshipStore::new();
        store.add_person("Alice");
        store.add_person("Alice");
        assert_eq!(store.len(), 1);
        assert!(store.neighbors("Alice").is_empty());
    }

    #[test]
    fn add_person_keeps_existing_neighbors() {
        let mut store = RelationshipStore::new();
        store.add_relationship("Alice", "mother", "Bob");
        store.add_person("Alice");
        assert_eq!(store.neighbors("Alice"), &[neighbor("Bob", "mother")]);
    }

    #[test]
    fn add_relationship_records_both_directions_and_one_edge() {
        let mut store = RelationshipStore::new();
        store.add_relationship("Alice", "mother", "Bob");

        assert_eq!(store.neighbors("Alice"), &[neighbor("Bob", "mother")]);
        assert_eq!(store.neighbors("Bob"), &[neighbor("Alice", "mother")]);
        assert_eq!(
            store.edges(),
            &[Relationship {
                from: "Alice".to_string(),
                label: "mother".to_string(),
                to: "Bob".to_string(),
            }]
        );
    }

    #[test]
    fn add_relationship_adds_missing_people() {
        let mut store = RelationshipStore::new();
        store.add_relationship("A", "parent", "B");
        assert!(store.contains("A"));
        assert!(store.contains("B"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn duplicate_relationships_are_not_deduplicated() {
        let mut store = RelationshipStore::new();
        store.add_relationship("A", "parent", "B");
        store.add_relationship("A", "parent", "B");
        assert_eq!(store.edges().len(), 2);
        assert_eq!(store.neighbors("A").len(), 2);
        assert_eq!(store.neighbors("B").len(), 2);
    }

    #[test]
    fn self_relationship_creates_self_loop() {
        let mut store = RelationshipStore::new();
        store.add_relationship("A", "self", "A");
        assert_eq!(store.len(), 1);
        assert_eq!(store.neighbors("A"), &[neighbor("A", "self"), neighbor("A", "self")]);
        assert_eq!(store.edges().len(), 1);
    }

    #[test]
    fn people_enumerate_in_insertion_order() {
        let mut store = RelationshipStore::new();
        store.add_person("Zed");
        store.add_relationship("Amy", "sister", "Zed");
        store.add_person("Bea");
        let ids: Vec<&str> = store.people().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["Zed", "Amy", "Bea"]);
        assert_eq!(store.first(), Some("Zed"));
    }

    #[test]
    fn outgoing_only_lists_declared_source() {
        let mut store = RelationshipStore::new();
        store.add_relationship("A", "parent", "B");
        store.add_relationship("C", "parent", "A");
        let out: Vec<&str> = store.outgoing("A").map(|e| e.to.as_str()).collect();
        assert_eq!(out, vec!["B"]);
    }

    #[test]
    fn unknown_person_has_no_neighbors() {
        let store = RelationshipStore::new();
        assert!(store.neighbors("nobody").is_empty());
        assert_eq!(store.first(), None);
    }
}
