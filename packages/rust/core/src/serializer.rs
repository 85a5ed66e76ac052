//! Export serializer: maps internal records to the Living Textbook JSON shape.
//!
//! One pure mapping function per record kind. Sanitization happens here and
//! only here, so every field is escaped exactly once.

use ltb_export_shared::{
    ExportDocument, ExternalResourceRecord, KeywordRecord, LearningOutcomeRecord, LinkRecord,
    NodeId, NodeRecord,
};
use ltb_export_text::{LABEL_MAX_CHARS, sanitize, truncate_chars};

use crate::assembler::ExportGraph;
use crate::model::{BibliographicReference, Keyword, LearningOutcome, Link, Node};

/// Flatten an assembled graph into the output document.
///
/// `strip` controls whether node `content` is sanitized.
pub fn to_document(graph: &ExportGraph, strip: bool) -> ExportDocument {
    ExportDocument {
        nodes: graph.nodes.iter().map(|n| node_record(n, strip)).collect(),
        links: graph.links.iter().map(link_record).collect(),
        learning_outcomes: graph
            .learning_outcomes
            .all()
            .iter()
            .map(learning_outcome_record)
            .collect(),
        keywords: graph.keywords.all().iter().map(keyword_record).collect(),
        external_resources: graph
            .references
            .all()
            .iter()
            .filter_map(external_resource_record)
            .collect(),
    }
}

/// A node, with its title prefixed by `[code]` when a code is present.
pub fn node_record(node: &Node, strip: bool) -> NodeRecord {
    let code = node.code.as_deref().unwrap_or_default();
    let title = if code.is_empty() {
        node.title.clone()
    } else {
        format!("[{code}] {}", node.title)
    };

    let content = if strip {
        Some(sanitize(node.content.as_deref().unwrap_or_default()))
    } else {
        node.content.clone()
    };

    NodeRecord {
        id: node.id,
        source_id: node.source_id,
        code: sanitize(code),
        title: sanitize(&title),
        name: sanitize(node.name.as_deref().unwrap_or_default()),
        definition: sanitize(node.definition.as_deref().unwrap_or_default()),
        content,
    }
}

pub fn link_record(link: &Link) -> LinkRecord {
    LinkRecord {
        relation: link.relation.uri().to_string(),
        relation_name: link.relation.name().to_string(),
        source: link.source,
        target: link.target,
    }
}

/// The label is cut from the raw text before sanitizing; the definition is
/// the sanitized full text. Neither is derived from the other.
pub fn learning_outcome_record(outcome: &LearningOutcome) -> LearningOutcomeRecord {
    LearningOutcomeRecord {
        label: sanitize(&truncate_chars(&outcome.text, LABEL_MAX_CHARS)),
        definition: sanitize(&outcome.text),
        is_learning_outcome_of: outcome.is_learning_outcome_of.clone(),
    }
}

pub fn keyword_record(keyword: &Keyword) -> KeywordRecord {
    KeywordRecord {
        id: keyword.id,
        name: sanitize(&keyword.name),
        is_keyword_of: keyword.is_keyword_of.clone(),
    }
}

/// `None` when the reference sanitizes to blank text.
pub fn external_resource_record(reference: &BibliographicReference) -> Option<ExternalResourceRecord> {
    let name = sanitize(&reference.reference);
    if name.trim().is_empty() {
        return None;
    }

    Some(ExternalResourceRecord {
        name,
        description: String::new(),
        url: String::new(),
        is_reference_of: unique(&reference.is_reference_of),
    })
}

/// First occurrence of each node id, order preserved.
fn unique(ids: &[NodeId]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ltb_export_shared::{BROADER_RELATION_NAME, BROADER_RELATION_URI};

    fn node(code: Option<&str>, content: Option<&str>) -> Node {
        Node {
            id: NodeId(2),
            source_id: Some(101),
            code: code.map(String::from),
            title: "Map \"Projections\"".into(),
            name: Some("https://gistbok.ucgis.org/node/101".into()),
            definition: Some("Tobler\u{2019}s law".into()),
            content: content.map(String::from),
        }
    }

    #[test]
    fn node_title_gets_code_prefix() {
        let rec = node_record(&node(Some("CV-01"), None), false);
        assert_eq!(rec.title, r#"[CV-01] Map \"Projections\""#);
        assert_eq!(rec.code, "CV-01");
        assert_eq!(rec.definition, "Tobler's law");
        assert_eq!(rec.name, "https://gistbok.ucgis.org/node/101");
    }

    #[test]
    fn node_without_code_has_plain_title() {
        let rec = node_record(&node(None, None), false);
        assert_eq!(rec.title, r#"Map \"Projections\""#);
        assert_eq!(rec.code, "");
    }

    #[test]
    fn content_raw_without_strip() {
        let rec = node_record(&node(None, Some("<p>Body &amp; soul</p>")), false);
        assert_eq!(rec.content.as_deref(), Some("<p>Body &amp; soul</p>"));

        let rec = node_record(&node(None, None), false);
        assert_eq!(rec.content, None);
    }

    #[test]
    fn content_sanitized_with_strip() {
        let rec = node_record(&node(None, Some("<p>Body &amp; soul</p>")), true);
        assert_eq!(rec.content.as_deref(), Some("Body & soul"));

        let rec = node_record(&node(None, None), true);
        assert_eq!(rec.content.as_deref(), Some(""));
    }

    #[test]
    fn root_node_nulls_become_empty_strings() {
        let root = Node {
            id: NodeId::ROOT,
            source_id: None,
            code: None,
            title: "GIS&T Body of Knowledge".into(),
            name: None,
            definition: None,
            content: None,
        };
        let rec = node_record(&root, false);
        assert_eq!(rec.title, "GIS&T Body of Knowledge");
        assert_eq!(rec.name, "");
        assert_eq!(rec.definition, "");
        assert_eq!(rec.source_id, None);
    }

    #[test]
    fn link_carries_relation() {
        let rec = link_record(&Link::broader(NodeId(3), NodeId(1)));
        assert_eq!(rec.relation, BROADER_RELATION_URI);
        assert_eq!(rec.relation_name, BROADER_RELATION_NAME);
        assert_eq!((rec.source, rec.target), (NodeId(3), NodeId(1)));
    }

    #[test]
    fn outcome_label_truncated_definition_full() {
        let text = "x".repeat(300);
        let rec = learning_outcome_record(&LearningOutcome {
            text: text.clone(),
            is_learning_outcome_of: vec![NodeId(2)],
        });
        assert_eq!(rec.label.chars().count(), LABEL_MAX_CHARS);
        assert_eq!(rec.definition, text);
        assert_eq!(rec.is_learning_outcome_of, vec![NodeId(2)]);
    }

    #[test]
    fn outcome_label_truncates_before_escaping() {
        let text = format!("{}\"tail", "a".repeat(254));
        let rec = learning_outcome_record(&LearningOutcome {
            text,
            is_learning_outcome_of: vec![],
        });
        // The 255th character is the quote, escaped after truncation.
        assert!(rec.label.ends_with("a\\\""));
        assert_eq!(rec.label.chars().count(), 256);
    }

    #[test]
    fn keyword_backlinks_verbatim() {
        let rec = keyword_record(&Keyword {
            id: 42,
            name: "<em>rivers</em>".into(),
            is_keyword_of: vec![NodeId(2), NodeId(2), NodeId(5)],
        });
        assert_eq!(rec.name, "rivers");
        assert_eq!(rec.is_keyword_of, vec![NodeId(2), NodeId(2), NodeId(5)]);
    }

    #[test]
    fn reference_backlinks_deduplicated() {
        let rec = external_resource_record(&BibliographicReference {
            reference: "Tobler, W. (1970).".into(),
            is_reference_of: vec![NodeId(4), NodeId(2), NodeId(4)],
        })
        .expect("kept");
        assert_eq!(rec.is_reference_of, vec![NodeId(4), NodeId(2)]);
        assert_eq!(rec.description, "");
        assert_eq!(rec.url, "");
    }

    #[test]
    fn blank_reference_excluded() {
        let blank = BibliographicReference {
            reference: "<span></span>&nbsp;".into(),
            is_reference_of: vec![NodeId(2)],
        };
        assert!(external_resource_record(&blank).is_none());
    }

    #[test]
    fn document_drops_blank_references_only() {
        let mut graph = ExportGraph::default();
        graph.references.upsert(
            "a".to_string(),
            || BibliographicReference {
                reference: "<b></b>".into(),
                is_reference_of: vec![],
            },
            NodeId(2),
        );
        graph.references.upsert(
            "b".to_string(),
            || BibliographicReference {
                reference: "Snyder (1987)".into(),
                is_reference_of: vec![],
            },
            NodeId(2),
        );
        let doc = to_document(&graph, false);
        assert_eq!(doc.external_resources.len(), 1);
        assert_eq!(doc.external_resources[0].name, "Snyder (1987)");
    }
}
