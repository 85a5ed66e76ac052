//! Output document types for the Living Textbook import format.

use serde::{Deserialize, Serialize};

/// URI of the broader-concept relation used for every hierarchy link.
pub const BROADER_RELATION_URI: &str = "http://www.w3.org/2004/02/skos/core#broader";

/// Display name of [`BROADER_RELATION_URI`].
pub const BROADER_RELATION_NAME: &str = "is subconcept of";

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Sequential graph node identifier. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Identifier of the synthetic root node.
    pub const ROOT: NodeId = NodeId(0);
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ExportDocument
// ---------------------------------------------------------------------------

/// The single JSON document handed to the Living Textbook importer.
///
/// Field order is the key order of the emitted JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
    pub learning_outcomes: Vec<LearningOutcomeRecord>,
    pub keywords: Vec<KeywordRecord>,
    /// Always present, possibly empty.
    pub external_resources: Vec<ExternalResourceRecord>,
}

/// A graph vertex: the root, a category, or a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    /// Native identifier in the content-management system.
    pub source_id: Option<u64>,
    pub code: String,
    /// Display title, prefixed with `[code]` when a code is present.
    pub title: String,
    /// Canonical URL.
    pub name: String,
    pub definition: String,
    /// Long-form body; tag-stripped only when the strip flag is set.
    pub content: Option<String>,
}

/// A directed, typed hierarchy edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub relation: String,
    pub relation_name: String,
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningOutcomeRecord {
    /// Display label, at most 255 characters of the raw outcome text.
    pub label: String,
    pub definition: String,
    pub is_learning_outcome_of: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    /// Taxonomy term id of the keyword.
    pub id: u64,
    pub name: String,
    /// Every referencing node, in encounter order, duplicates retained.
    pub is_keyword_of: Vec<NodeId>,
}

/// A bibliographic reference exported as a Living Textbook external resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResourceRecord {
    pub name: String,
    pub description: String,
    pub url: String,
    pub is_reference_of: Vec<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_key_order() {
        let json = serde_json::to_string(&ExportDocument::default()).expect("serialize");
        assert_eq!(
            json,
            r#"{"nodes":[],"links":[],"learning_outcomes":[],"keywords":[],"external_resources":[]}"#
        );
    }

    #[test]
    fn node_uses_camel_case_keys() {
        let node = NodeRecord {
            id: NodeId(3),
            source_id: Some(117),
            code: "AM-01".into(),
            title: "[AM-01] Intro".into(),
            name: "https://example.org/node/117".into(),
            definition: "Hello".into(),
            content: None,
        };
        let json = serde_json::to_string(&node).expect("serialize");
        assert!(json.starts_with(r#"{"id":3,"sourceId":117,"code":"AM-01""#));
        assert!(json.contains(r#""content":null"#));
        // Slashes stay unescaped.
        assert!(json.contains("https://example.org/node/117"));
    }

    #[test]
    fn link_serialization() {
        let link = LinkRecord {
            relation: BROADER_RELATION_URI.into(),
            relation_name: BROADER_RELATION_NAME.into(),
            source: NodeId(1),
            target: NodeId::ROOT,
        };
        let json = serde_json::to_string(&link).expect("serialize");
        let parsed: LinkRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, link);
        assert!(json.contains(r#""relationName":"is subconcept of""#));
    }
}
