//! Shared types, error model, and configuration for the Living Textbook exporter.
//!
//! This crate is the foundation depended on by all other exporter crates.
//! It provides:
//! - [`LtbExportError`], the unified error type
//! - Output document types ([`ExportDocument`], [`NodeRecord`], [`LinkRecord`], ...)
//! - Configuration ([`AppConfig`], [`ExportOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExportDefaultsConfig, ExportOptions, SiteConfig, SkipConfig, SkipRules,
    config_dir, config_file_path, load_config, load_config_from,
};
pub use error::{LtbExportError, Result};
pub use types::{
    BROADER_RELATION_NAME, BROADER_RELATION_URI, ExportDocument, ExternalResourceRecord,
    KeywordRecord, LearningOutcomeRecord, LinkRecord, NodeId, NodeRecord,
};
