//! Internal graph records accumulated during one export pass.
//!
//! These hold raw (unsanitized) text; the serializer derives the output
//! shape from them.

use ltb_export_shared::{BROADER_RELATION_NAME, BROADER_RELATION_URI, NodeId};

use crate::registry::Backlinked;

/// A graph vertex: the root, a category, or a content item.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub source_id: Option<u64>,
    pub code: Option<String>,
    pub title: String,
    pub name: Option<String>,
    pub definition: Option<String>,
    pub content: Option<String>,
}

/// Relation kinds a [`Link`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Source is a subconcept of target.
    Broader,
}

impl Relation {
    pub fn uri(self) -> &'static str {
        match self {
            Relation::Broader => BROADER_RELATION_URI,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Relation::Broader => BROADER_RELATION_NAME,
        }
    }
}

/// A directed, typed edge between two existing nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub relation: Relation,
    pub source: NodeId,
    pub target: NodeId,
}

impl Link {
    /// `source` is a subconcept of `target`.
    pub fn broader(source: NodeId, target: NodeId) -> Self {
        Self {
            relation: Relation::Broader,
            source,
            target,
        }
    }
}

/// A keyword tag, keyed by its taxonomy-term id.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub id: u64,
    pub name: String,
    pub is_keyword_of: Vec<NodeId>,
}

impl Backlinked for Keyword {
    fn add_backlink(&mut self, node: NodeId) {
        self.is_keyword_of.push(node);
    }
}

/// A learning outcome list item, keyed by the hash of its trimmed text.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningOutcome {
    /// Trimmed outcome text.
    pub text: String,
    pub is_learning_outcome_of: Vec<NodeId>,
}

impl Backlinked for LearningOutcome {
    fn add_backlink(&mut self, node: NodeId) {
        self.is_learning_outcome_of.push(node);
    }
}

/// A bibliography entry, keyed by the hash of its trimmed text.
#[derive(Debug, Clone, PartialEq)]
pub struct BibliographicReference {
    pub reference: String,
    /// May repeat a node; deduplicated on output.
    pub is_reference_of: Vec<NodeId>,
}

impl Backlinked for BibliographicReference {
    fn add_backlink(&mut self, node: NodeId) {
        self.is_reference_of.push(node);
    }
}
