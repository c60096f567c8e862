//! Diff computation for child collections

use crate::identity::Child;
use std::collections::BTreeMap;

/// Operations that turn a live child collection into the desired one.
///
/// The three sets are disjoint. Items in `to_update` already carry the wire
/// name of the live child they replace.
#[derive(Debug, Clone)]
pub struct ChildDiff<T> {
    /// Live children absent from the desired set.
    pub to_delete: Vec<T>,
    /// Desired children with no live counterpart.
    pub to_create: Vec<T>,
    /// Desired children whose live counterpart differs.
    pub to_update: Vec<T>,
    /// Number of desired children already in place.
    pub unchanged: usize,
}

impl<T> Default for ChildDiff<T> {
    fn default() -> Self {
        Self {
            to_delete: Vec::new(),
            to_create: Vec::new(),
            to_update: Vec::new(),
            unchanged: 0,
        }
    }
}

impl<T: Child> ChildDiff<T> {
    /// Match `before` and `after` by identity key.
    ///
    /// When a key occurs more than once, the last occurrence wins. Items
    /// without identity are ignored.
    pub fn compute(before: &[T], after: &[T]) -> Self {
        let before = by_key(before);
        let after = by_key(after);
        let mut diff = Self::default();

        for (key, desired) in &after {
            match before.get(key) {
                Some(live) => {
                    let mut desired = (*desired).clone();
                    desired.adopt_wire_name(live);
                    if desired.same_as(live) {
                        diff.unchanged += 1;
                    } else {
                        diff.to_update.push(desired);
                    }
                }
                None => diff.to_create.push((*desired).clone()),
            }
        }

        diff.to_delete = before
            .iter()
            .filter(|(key, _)| !after.contains_key(*key))
            .map(|(_, live)| (*live).clone())
            .collect();

        diff
    }

    /// Whether any write is needed.
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty() && self.to_update.is_empty()
    }
}

fn by_key<T: Child>(items: &[T]) -> BTreeMap<T::Key, &T> {
    items
        .iter()
        .filter_map(|item| item.key().map(|key| (key, item)))
        .collect()
}

/// Whether two collections are equal for no-op detection.
///
/// Lengths must match before keys are compared, so a desired list with
/// duplicate keys never counts as unchanged.
pub fn children_match<T: Child>(before: &[T], after: &[T]) -> bool {
    before.len() == after.len() && ChildDiff::compute(before, after).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Bind, Server};

    fn server(name: &str, port: u16) -> Server {
        Server::new(name, "10.0.0.1", port)
    }

    fn named_bind(name: &str, address: &str, port: u16) -> Bind {
        let mut bind = Bind::new(address, port);
        bind.wire_name = Some(name.to_string());
        bind
    }

    #[test]
    fn test_compute_sets() {
        let before = vec![server("a", 80), server("b", 80), server("c", 80)];
        let after = vec![server("b", 80), server("c", 81), server("d", 80)];

        let diff = ChildDiff::compute(&before, &after);
        let names = |items: &[Server]| items.iter().map(|s| s.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&diff.to_delete), vec!["a"]);
        assert_eq!(names(&diff.to_create), vec!["d"]);
        assert_eq!(names(&diff.to_update), vec!["c"]);
        assert_eq!(diff.unchanged, 1);
    }

    #[test]
    fn test_counts_add_up() {
        let before = vec![server("a", 80), server("b", 80), server("c", 80)];
        let after = vec![server("b", 81), server("c", 80), server("d", 80), server("e", 80)];
        let diff = ChildDiff::compute(&before, &after);

        assert_eq!(diff.to_create.len() + diff.to_update.len() + diff.unchanged, after.len());
        assert_eq!(diff.to_delete.len() + diff.to_update.len() + diff.unchanged, before.len());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let after = vec![server("a", 80), server("a", 90)];
        let diff = ChildDiff::compute(&[], &after);
        assert_eq!(diff.to_create.len(), 1);
        assert_eq!(diff.to_create[0].port, 90);
    }

    #[test]
    fn test_update_carries_wire_name() {
        let before = vec![named_bind("http", "*", 80)];
        let mut desired = Bind::new("*", 80);
        desired.ssl = true;

        let diff = ChildDiff::compute(&before, &[desired]);
        assert_eq!(diff.to_update.len(), 1);
        assert_eq!(diff.to_update[0].wire_name.as_deref(), Some("http"));
    }

    #[test]
    fn test_binds_match_by_address_and_port() {
        let before = vec![named_bind("http", "*", 80), named_bind("alt", "*", 8080)];
        let after = vec![Bind::new("*", 8080), Bind::new("*", 80)];
        assert!(children_match(&before, &after));
        assert!(ChildDiff::compute(&before, &after).is_empty());
    }

    #[test]
    fn test_children_match_requires_same_length() {
        let before = vec![server("a", 80)];
        let after = vec![server("a", 80), server("a", 80)];
        assert!(ChildDiff::compute(&before, &after).is_empty());
        assert!(!children_match(&before, &after));
    }

    #[test]
    fn test_identical_is_empty() {
        let items = vec![server("a", 80), server("b", 80)];
        let diff = ChildDiff::compute(&items, &items);
        assert!(diff.is_empty());
        assert_eq!(diff.unchanged, 2);
    }
}
