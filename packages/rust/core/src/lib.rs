//! Export pass for the GIS&T Body of Knowledge.
//!
//! Walks the category tree of a [`ContentRepository`](ltb_export_repository::ContentRepository),
//! assembles a node/link graph with deduplicated keywords, learning outcomes
//! and references, and serializes it as a Living Textbook import document.

pub mod assembler;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod serializer;

pub use assembler::{ExportGraph, ExportStats, SkipReason, assemble};
pub use pipeline::{
    ExportResult, ProgressReporter, SilentProgress, encode_document, run_export, write_output,
};
pub use serializer::to_document;
