//! End-to-end export pipeline: repository → graph → document → JSON file.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use ltb_export_repository::ContentRepository;
use ltb_export_shared::{ExportDocument, ExportOptions, LtbExportError, Result};

use crate::assembler::{self, ExportStats};
use crate::serializer;

/// Result of one export pass.
#[derive(Debug)]
pub struct ExportResult {
    pub document: ExportDocument,
    pub stats: ExportStats,
    pub elapsed: Duration,
}

/// Progress callback for reporting export status.
pub trait ProgressReporter {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a category's records are visited.
    fn category_started(&self, name: &str, current: usize, total: usize);
    /// Called after a record node is emitted.
    fn record_exported(&self, title: &str, node_count: usize);
    /// Called when the pass completes.
    fn done(&self, stats: &ExportStats);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn category_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn record_exported(&self, _title: &str, _node_count: usize) {}
    fn done(&self, _stats: &ExportStats) {}
}

/// Run the full export pass.
///
/// 1. Walk the category tree and assemble the graph
/// 2. Flatten nodes, links and registries into the output document
/// 3. Fill in the output counts
#[instrument(skip_all, fields(taxonomy = %options.taxonomy, limit = ?options.limit, strip = options.strip))]
pub fn run_export(
    repo: &dyn ContentRepository,
    options: &ExportOptions,
    progress: &dyn ProgressReporter,
) -> Result<ExportResult> {
    let start = Instant::now();
    let mut stats = ExportStats::default();

    progress.phase("Assembling graph");
    let graph = assembler::assemble(repo, options, progress, &mut stats)?;

    progress.phase("Serializing");
    let document = serializer::to_document(&graph, options.strip);

    stats.nodes = document.nodes.len();
    stats.links = document.links.len();
    stats.learning_outcomes = document.learning_outcomes.len();
    stats.keywords = document.keywords.len();
    stats.external_resources = document.external_resources.len();

    let elapsed = start.elapsed();
    info!(
        nodes = stats.nodes,
        links = stats.links,
        learning_outcomes = stats.learning_outcomes,
        keywords = stats.keywords,
        external_resources = stats.external_resources,
        skipped = stats.skipped_duplicate_code + stats.skipped_superseded + stats.skipped_legacy_code,
        orphaned = stats.orphaned_records,
        elapsed_ms = elapsed.as_millis() as u64,
        "export complete"
    );
    progress.done(&stats);

    Ok(ExportResult {
        document,
        stats,
        elapsed,
    })
}

/// Encode the document as JSON (compact, or indented when `pretty`).
pub fn encode_document(document: &ExportDocument, pretty: bool) -> Result<String> {
    let encoded = if pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    encoded.map_err(|e| LtbExportError::Encoding(e.to_string()))
}

/// Write the encoded document, overwriting any existing file.
pub fn write_output(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LtbExportError::io(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| LtbExportError::io(path, e))?;
    debug!(path = %path.display(), bytes = json.len(), "wrote export file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
