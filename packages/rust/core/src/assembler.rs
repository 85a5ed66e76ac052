//! Graph assembler: flattens the category tree and its tagged records into
//! nodes, hierarchy links and deduplicated shared entities.
//!
//! Node identifiers are allocated sequentially in visitation order: the root
//! is 0, then each category followed by its accepted records. Identifier
//! allocation is part of the observable output, so the repository's category
//! and record order must be preserved exactly.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use ltb_export_repository::{CategoryTerm, ContentRecord, ContentRepository, RecordHandle};
use ltb_export_shared::{ExportOptions, NodeId, Result};
use ltb_export_text::{content_hash, list_items, paragraphs, plain_text};

use crate::model::{BibliographicReference, Keyword, LearningOutcome, Link, Node};
use crate::pipeline::ProgressReporter;
use crate::registry::DedupRegistry;

/// Everything one export pass accumulates.
#[derive(Debug, Default)]
pub struct ExportGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    /// Keyed by taxonomy-term id.
    pub keywords: DedupRegistry<u64, Keyword>,
    /// Keyed by hash of the trimmed outcome text.
    pub learning_outcomes: DedupRegistry<String, LearningOutcome>,
    /// Keyed by hash of the trimmed entry text.
    pub references: DedupRegistry<String, BibliographicReference>,
}

/// Diagnostic counters for one export pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub nodes: usize,
    pub links: usize,
    pub learning_outcomes: usize,
    pub keywords: usize,
    /// References that survived the empty-text filter.
    pub external_resources: usize,
    pub categories: usize,
    pub records_accepted: usize,
    pub skipped_duplicate_code: usize,
    pub skipped_superseded: usize,
    pub skipped_legacy_code: usize,
    /// The record that hit the limit plus every handle after it in the
    /// category. Those later handles are never loaded, so records the skip
    /// policy would reject are counted too.
    pub records_over_limit: usize,
    /// Records the repository failed to load.
    pub failed_records: usize,
    /// Categories whose record query failed.
    pub failed_queries: usize,
    /// Accepted records whose primary category has no node; exported without
    /// a hierarchy link.
    pub orphaned_records: usize,
}

/// Why a record was left out of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DuplicateCode,
    SupersededUrl,
    LegacyCode,
}

/// Run the assembler over every category of the configured taxonomy.
///
/// Only a failing category-tree lookup is fatal; record and query failures
/// are logged, counted in `stats`, and skipped.
#[instrument(skip_all, fields(taxonomy = %options.taxonomy))]
pub fn assemble(
    repo: &dyn ContentRepository,
    options: &ExportOptions,
    progress: &dyn ProgressReporter,
    stats: &mut ExportStats,
) -> Result<ExportGraph> {
    let categories = repo.category_tree(&options.taxonomy)?;

    let mut assembler = Assembler::new(repo, options, progress, stats);
    assembler.add_root();

    let selected: Vec<&CategoryTerm> = categories
        .iter()
        .filter(|term| options.category_filter.is_none_or(|id| id == term.id))
        .collect();

    if let Some(id) = options.category_filter {
        if selected.is_empty() {
            warn!(category_id = id, "category filter matched no category");
        }
    }

    for (i, term) in selected.iter().enumerate() {
        progress.category_started(&term.name, i + 1, selected.len());
        assembler.add_category(term);
    }

    let graph = assembler.graph;
    info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        keywords = graph.keywords.len(),
        learning_outcomes = graph.learning_outcomes.len(),
        references = graph.references.len(),
        "graph assembled"
    );
    Ok(graph)
}

// ---------------------------------------------------------------------------
// Assembler state
// ---------------------------------------------------------------------------

struct Assembler<'a> {
    repo: &'a dyn ContentRepository,
    options: &'a ExportOptions,
    progress: &'a dyn ProgressReporter,
    stats: &'a mut ExportStats,
    graph: ExportGraph,
    next_id: u64,
    /// Category external id → node id.
    category_nodes: HashMap<u64, NodeId>,
    seen_codes: HashSet<String>,
}

impl<'a> Assembler<'a> {
    fn new(
        repo: &'a dyn ContentRepository,
        options: &'a ExportOptions,
        progress: &'a dyn ProgressReporter,
        stats: &'a mut ExportStats,
    ) -> Self {
        Self {
            repo,
            options,
            progress,
            stats,
            graph: ExportGraph::default(),
            next_id: 0,
            category_nodes: HashMap::new(),
            seen_codes: HashSet::new(),
        }
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn add_root(&mut self) {
        let id = self.allocate_id();
        debug_assert_eq!(id, NodeId::ROOT);
        self.graph.nodes.push(Node {
            id,
            source_id: None,
            code: None,
            title: self.options.site_name.clone(),
            name: None,
            definition: None,
            content: None,
        });
    }

    fn add_category(&mut self, term: &CategoryTerm) {
        let id = self.allocate_id();
        self.category_nodes.insert(term.id, id);
        self.stats.categories += 1;

        self.graph.links.push(Link::broader(id, NodeId::ROOT));
        self.graph.nodes.push(Node {
            id,
            source_id: Some(term.id),
            code: None,
            title: term.name.clone(),
            name: Some(self.repo.category_url(term)),
            definition: term.description.as_deref().map(plain_text),
            content: None,
        });

        info!(category_id = term.id, node_id = %id, name = %term.name, "exporting category");

        // Skipped records must not consume the limit, so the query itself is
        // never limited.
        let handles = match self.repo.query_content_by_category(term.id, true, None) {
            Ok(handles) => handles,
            Err(e) => {
                warn!(category_id = term.id, error = %e, "record query failed, category left empty");
                self.stats.failed_queries += 1;
                return;
            }
        };

        self.add_records(term, &handles);
    }

    fn add_records(&mut self, term: &CategoryTerm, handles: &[RecordHandle]) {
        let mut accepted = 0usize;

        for (pos, &handle) in handles.iter().enumerate() {
            let record = match self.repo.load_content_record(handle) {
                Ok(record) => record,
                Err(e) => {
                    warn!(record_id = handle.0, error = %e, "failed to load record, skipping");
                    self.stats.failed_records += 1;
                    continue;
                }
            };

            let url = self.repo.canonical_url(&record);
            let code = record.code.as_deref().map(str::trim).unwrap_or_default();

            if let Some(reason) = self.skip_reason(code, &url) {
                debug!(record_id = record.id, code, ?reason, "skipping record");
                match reason {
                    SkipReason::DuplicateCode => self.stats.skipped_duplicate_code += 1,
                    SkipReason::SupersededUrl => self.stats.skipped_superseded += 1,
                    SkipReason::LegacyCode => self.stats.skipped_legacy_code += 1,
                }
                continue;
            }

            if let Some(limit) = self.options.limit {
                if accepted >= limit {
                    let abandoned = handles.len() - pos;
                    debug!(category_id = term.id, limit, abandoned, "category limit reached");
                    self.stats.records_over_limit += abandoned;
                    break;
                }
            }

            accepted += 1;
            if !code.is_empty() {
                self.seen_codes.insert(code.to_string());
            }
            self.add_record(&record, code, url);
        }
    }

    fn skip_reason(&self, code: &str, url: &str) -> Option<SkipReason> {
        if !code.is_empty() && self.seen_codes.contains(code) {
            Some(SkipReason::DuplicateCode)
        } else if self.options.skip.is_superseded_url(url) {
            Some(SkipReason::SupersededUrl)
        } else if self.options.skip.is_legacy_code(code) {
            Some(SkipReason::LegacyCode)
        } else {
            None
        }
    }

    fn add_record(&mut self, record: &ContentRecord, code: &str, url: String) {
        let id = self.allocate_id();

        for tag in &record.secondary_tags {
            self.graph.keywords.upsert(
                tag.id,
                || Keyword {
                    id: tag.id,
                    name: tag.name.clone(),
                    is_keyword_of: Vec::new(),
                },
                id,
            );
        }

        let node = Node {
            id,
            source_id: Some(record.id),
            code: (!code.is_empty()).then(|| code.to_string()),
            title: record.title.clone(),
            name: Some(url),
            definition: record.body.first().map(|body| plain_text(body)),
            content: record.topic_content.first().cloned(),
        };

        if let Some(bibliography) = record.bibliography.as_deref() {
            for entry in paragraphs(bibliography) {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                self.graph.references.upsert(
                    content_hash(entry),
                    || BibliographicReference {
                        reference: entry.to_string(),
                        is_reference_of: Vec::new(),
                    },
                    id,
                );
            }
        }

        self.progress.record_exported(&node.title, self.graph.nodes.len() + 1);
        debug!(record_id = record.id, node_id = %id, code, "exported record");
        self.graph.nodes.push(node);
        self.stats.records_accepted += 1;

        match record
            .primary_category
            .and_then(|category| self.category_nodes.get(&category))
        {
            Some(&category_node) => self.graph.links.push(Link::broader(id, category_node)),
            None => {
                warn!(
                    record_id = record.id,
                    primary_category = ?record.primary_category,
                    "primary category has no node, record left unlinked"
                );
                self.stats.orphaned_records += 1;
            }
        }

        if let Some(objectives) = record.learning_objectives.as_deref() {
            for item in list_items(objectives) {
                // A blank item has no label to show.
                let text = item.trim();
                if text.is_empty() {
                    continue;
                }
                self.graph.learning_outcomes.upsert(
                    content_hash(text),
                    || LearningOutcome {
                        text: text.to_string(),
                        is_learning_outcome_of: Vec::new(),
                    },
                    id,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
