//! Keyed deduplication registry for entities shared between nodes.
//!
//! Keywords, learning outcomes and bibliographic references are referenced by
//! many content records. Each kind lives in one [`DedupRegistry`], keyed by a
//! term id or a content hash; repeated occurrences only add a backlink.

use std::collections::HashMap;
use std::hash::Hash;

use ltb_export_shared::NodeId;

/// An entity that records which nodes reference it.
pub trait Backlinked {
    fn add_backlink(&mut self, node: NodeId);
}

/// Insertion-ordered map from a dedup key to a canonical entity.
#[derive(Debug, Clone)]
pub struct DedupRegistry<K, P> {
    index: HashMap<K, usize>,
    entries: Vec<P>,
}

impl<K: Eq + Hash, P: Backlinked> DedupRegistry<K, P> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Create the entity for `key` with `factory` if it is absent, then
    /// append `node` to its backlinks. Returns `true` if the entity was created.
    pub fn upsert(&mut self, key: K, factory: impl FnOnce() -> P, node: NodeId) -> bool {
        let (pos, created) = match self.index.get(&key) {
            Some(&pos) => (pos, false),
            None => {
                self.entries.push(factory());
                let pos = self.entries.len() - 1;
                self.index.insert(key, pos);
                (pos, true)
            }
        };
        self.entries[pos].add_backlink(node);
        created
    }

    /// Entities in first-insertion order.
    pub fn all(&self) -> &[P] {
        &self.entries
    }

    pub fn get(&self, key: &K) -> Option<&P> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, P: Backlinked> Default for DedupRegistry<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tag {
        name: String,
        refs: Vec<NodeId>,
    }

    impl Backlinked for Tag {
        fn add_backlink(&mut self, node: NodeId) {
            self.refs.push(node);
        }
    }

    fn tag(name: &str) -> Tag {
        Tag {
            name: name.into(),
            refs: Vec::new(),
        }
    }

    #[test]
    fn first_upsert_creates() {
        let mut reg: DedupRegistry<u64, Tag> = DedupRegistry::new();
        assert!(reg.upsert(42, || tag("rivers"), NodeId(2)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&42).unwrap().refs, vec![NodeId(2)]);
    }

    #[test]
    fn repeated_key_appends_backlink_only() {
        let mut reg: DedupRegistry<u64, Tag> = DedupRegistry::new();
        reg.upsert(42, || tag("rivers"), NodeId(2));
        let created = reg.upsert(42, || tag("ignored"), NodeId(5));
        assert!(!created);
        assert_eq!(reg.len(), 1);
        let entry = reg.get(&42).unwrap();
        assert_eq!(entry.name, "rivers");
        assert_eq!(entry.refs, vec![NodeId(2), NodeId(5)]);
    }

    #[test]
    fn duplicate_backlinks_retained() {
        let mut reg: DedupRegistry<u64, Tag> = DedupRegistry::new();
        reg.upsert(1, || tag("a"), NodeId(3));
        reg.upsert(1, || tag("a"), NodeId(3));
        assert_eq!(reg.get(&1).unwrap().refs, vec![NodeId(3), NodeId(3)]);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut reg: DedupRegistry<String, Tag> = DedupRegistry::new();
        for name in ["zeta", "alpha", "mid", "alpha"] {
            reg.upsert(name.to_string(), || tag(name), NodeId(1));
        }
        let names: Vec<&str> = reg.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn empty_registry() {
        let reg: DedupRegistry<u64, Tag> = DedupRegistry::default();
        assert!(reg.is_empty());
        assert!(reg.all().is_empty());
        assert!(reg.get(&1).is_none());
    }
}
