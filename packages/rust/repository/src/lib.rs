//! Content repository capability consumed by the exporter.
//!
//! The [`ContentRepository`] trait is the only way the export pass reads the
//! content-management system: the category tree, the records tagged with a
//! category, and the records themselves. [`DumpRepository`] implements it
//! over a JSON site dump.
//!
//! All calls are synchronous and must return data in a stable order; node
//! identifiers are allocated in visitation order.

mod dump;
mod urls;

use serde::{Deserialize, Serialize};

use ltb_export_shared::Result;

pub use dump::{DumpRepository, SiteDump};
pub use urls::SiteUrls;

// ---------------------------------------------------------------------------
// Repository types
// ---------------------------------------------------------------------------

/// A category (knowledge area) term of the category vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTerm {
    /// External taxonomy-term id.
    pub id: u64,
    pub name: String,
    /// Term description (becomes the category node definition).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path alias of the term page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Opaque handle returned by a category query, resolved by
/// [`ContentRepository::load_content_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle(pub u64);

/// A taxonomy-term reference with its resolved display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A content record (topic). Every field may be absent in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Native record id.
    pub id: u64,
    /// Published status.
    #[serde(default = "default_status")]
    pub status: bool,
    /// Path alias of the record page.
    #[serde(default)]
    pub url: Option<String>,
    /// Catalog code (e.g. `AM-01`).
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: String,
    /// Rich-text summary field; only the first value is exported.
    #[serde(default)]
    pub body: Vec<String>,
    /// Long-form rich-text content; only the first value is exported.
    #[serde(default)]
    pub topic_content: Vec<String>,
    /// Rich-text bibliography, one reference per paragraph.
    #[serde(default)]
    pub bibliography: Option<String>,
    /// Rich-text list of learning objectives.
    #[serde(default)]
    pub learning_objectives: Option<String>,
    /// External id of the category the record primarily belongs to.
    #[serde(default)]
    pub primary_category: Option<u64>,
    /// Every category the record is tagged with (queried by category).
    #[serde(default)]
    pub categories: Vec<u64>,
    /// Keyword tags.
    #[serde(default)]
    pub secondary_tags: Vec<TermRef>,
}

fn default_status() -> bool {
    true
}

impl Default for ContentRecord {
    fn default() -> Self {
        Self {
            id: 0,
            status: default_status(),
            url: None,
            code: None,
            title: String::new(),
            body: Vec::new(),
            topic_content: Vec::new(),
            bibliography: None,
            learning_objectives: None,
            primary_category: None,
            categories: Vec::new(),
            secondary_tags: Vec::new(),
        }
    }
}

impl ContentRecord {
    /// Whether the record is tagged with `category_id`.
    pub fn is_tagged_with(&self, category_id: u64) -> bool {
        self.primary_category == Some(category_id) || self.categories.contains(&category_id)
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Read-only access to the taxonomy and its tagged content.
pub trait ContentRepository {
    /// The ordered category terms of vocabulary `taxonomy`.
    fn category_tree(&self, taxonomy: &str) -> Result<Vec<CategoryTerm>>;

    /// Handles of the records tagged with `category_id`, in stable order.
    fn query_content_by_category(
        &self,
        category_id: u64,
        published_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<RecordHandle>>;

    /// Load the record behind `handle`.
    fn load_content_record(&self, handle: RecordHandle) -> Result<ContentRecord>;

    /// Canonical URL of a record.
    fn canonical_url(&self, record: &ContentRecord) -> String;

    /// Canonical URL of a category term.
    fn category_url(&self, term: &CategoryTerm) -> String;
}
