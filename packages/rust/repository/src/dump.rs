//! JSON site-dump backed repository.
//!
//! A dump holds every vocabulary's ordered term list and the content records
//! in export order:
//!
//! ```json
//! {
//!   "taxonomies": { "knowledge_areas": [{ "id": 7, "name": "Cartography" }] },
//!   "records": [{ "id": 101, "code": "CV-01", "title": "Intro", "categories": [7] }]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use ltb_export_shared::{LtbExportError, Result};

use crate::urls::SiteUrls;
use crate::{CategoryTerm, ContentRecord, ContentRepository, RecordHandle};

/// On-disk site dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteDump {
    /// Vocabulary id → ordered terms.
    #[serde(default)]
    pub taxonomies: BTreeMap<String, Vec<CategoryTerm>>,
    /// Content records, in export order.
    #[serde(default)]
    pub records: Vec<ContentRecord>,
}

/// A [`ContentRepository`] over an in-memory [`SiteDump`].
pub struct DumpRepository {
    dump: SiteDump,
    urls: SiteUrls,
    index: HashMap<u64, usize>,
}

impl DumpRepository {
    /// Wrap an already-loaded dump.
    pub fn from_dump(dump: SiteDump, urls: SiteUrls) -> Self {
        let mut index = HashMap::with_capacity(dump.records.len());
        for (pos, record) in dump.records.iter().enumerate() {
            if index.insert(record.id, pos).is_some() {
                warn!(record_id = record.id, "duplicate record id in dump, keeping the last");
            }
        }
        Self { dump, urls, index }
    }

    /// Load a dump from a JSON file. Invalid UTF-8 sequences are dropped.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, urls: SiteUrls) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| LtbExportError::io(path, e))?;

        let (text, dropped) = decode_dropping_invalid(&bytes);
        if dropped > 0 {
            warn!(dropped_bytes = dropped, "dropped invalid UTF-8 sequences from dump");
        }

        let dump: SiteDump = serde_json::from_str(&text).map_err(|e| {
            LtbExportError::parse(format!("invalid site dump {}: {e}", path.display()))
        })?;

        info!(
            taxonomies = dump.taxonomies.len(),
            records = dump.records.len(),
            "site dump loaded"
        );

        Ok(Self::from_dump(dump, urls))
    }

    /// Number of records in the dump.
    pub fn record_count(&self) -> usize {
        self.dump.records.len()
    }
}

impl ContentRepository for DumpRepository {
    fn category_tree(&self, taxonomy: &str) -> Result<Vec<CategoryTerm>> {
        self.dump
            .taxonomies
            .get(taxonomy)
            .cloned()
            .ok_or_else(|| LtbExportError::repository(format!("unknown taxonomy '{taxonomy}'")))
    }

    fn query_content_by_category(
        &self,
        category_id: u64,
        published_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<RecordHandle>> {
        let handles: Vec<RecordHandle> = self
            .dump
            .records
            .iter()
            .filter(|r| r.is_tagged_with(category_id))
            .filter(|r| !published_only || r.status)
            .map(|r| RecordHandle(r.id))
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        debug!(category_id, count = handles.len(), "queried records by category");
        Ok(handles)
    }

    fn load_content_record(&self, handle: RecordHandle) -> Result<ContentRecord> {
        self.index
            .get(&handle.0)
            .map(|&pos| self.dump.records[pos].clone())
            .ok_or_else(|| LtbExportError::repository(format!("record {} not found", handle.0)))
    }

    fn canonical_url(&self, record: &ContentRecord) -> String {
        self.urls.record_url(record.id, record.url.as_deref())
    }

    fn category_url(&self, term: &CategoryTerm) -> String {
        self.urls.term_url(term.id, term.url.as_deref())
    }
}

/// Decode UTF-8, dropping invalid byte sequences. Returns the text and the
/// number of dropped bytes.
fn decode_dropping_invalid(bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    (text, dropped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn fixture_path(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(name)
    }

    fn site_urls() -> SiteUrls {
        SiteUrls::new(Url::parse("https://gistbok.ucgis.org").unwrap())
    }

    fn record(id: u64, categories: Vec<u64>, status: bool) -> ContentRecord {
        ContentRecord {
            id,
            status,
            title: format!("Record {id}"),
            categories,
            ..Default::default()
        }
    }

    fn make_repo() -> DumpRepository {
        let mut dump = SiteDump::default();
        dump.taxonomies.insert(
            "knowledge_areas".into(),
            vec![
                CategoryTerm {
                    id: 7,
                    name: "Cartography".into(),
                    description: None,
                    url: None,
                },
                CategoryTerm {
                    id: 8,
                    name: "Analytics".into(),
                    description: None,
                    url: Some("/knowledge-areas/analytics".into()),
                },
            ],
        );
        dump.records = vec![
            record(1, vec![7], true),
            record(2, vec![8], true),
            record(3, vec![7], false),
            record(4, vec![7, 8], true),
        ];
        DumpRepository::from_dump(dump, site_urls())
    }

    #[test]
    fn category_tree_in_order() {
        let repo = make_repo();
        let terms = repo.category_tree("knowledge_areas").unwrap();
        assert_eq!(terms.iter().map(|t| t.id).collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn unknown_taxonomy_is_error() {
        let repo = make_repo();
        let err = repo.category_tree("tags").unwrap_err();
        assert!(err.to_string().contains("unknown taxonomy"));
    }

    #[test]
    fn query_filters_published_and_tag() {
        let repo = make_repo();
        let handles = repo.query_content_by_category(7, true, None).unwrap();
        assert_eq!(handles, vec![RecordHandle(1), RecordHandle(4)]);

        let all = repo.query_content_by_category(7, false, None).unwrap();
        assert_eq!(all, vec![RecordHandle(1), RecordHandle(3), RecordHandle(4)]);
    }

    #[test]
    fn query_respects_limit() {
        let repo = make_repo();
        let handles = repo.query_content_by_category(7, false, Some(2)).unwrap();
        assert_eq!(handles, vec![RecordHandle(1), RecordHandle(3)]);
    }

    #[test]
    fn query_matches_primary_category() {
        let mut dump = SiteDump::default();
        dump.records = vec![ContentRecord {
            id: 9,
            primary_category: Some(5),
            ..Default::default()
        }];
        let repo = DumpRepository::from_dump(dump, site_urls());
        let handles = repo.query_content_by_category(5, true, None).unwrap();
        assert_eq!(handles, vec![RecordHandle(9)]);
    }

    #[test]
    fn load_missing_record_is_error() {
        let repo = make_repo();
        assert_eq!(repo.load_content_record(RecordHandle(2)).unwrap().id, 2);
        assert!(repo.load_content_record(RecordHandle(99)).is_err());
    }

    #[test]
    fn canonical_urls() {
        let repo = make_repo();
        let rec = repo.load_content_record(RecordHandle(1)).unwrap();
        assert_eq!(repo.canonical_url(&rec), "https://gistbok.ucgis.org/node/1");

        let terms = repo.category_tree("knowledge_areas").unwrap();
        assert_eq!(
            repo.category_url(&terms[0]),
            "https://gistbok.ucgis.org/taxonomy/term/7"
        );
        assert_eq!(
            repo.category_url(&terms[1]),
            "https://gistbok.ucgis.org/knowledge-areas/analytics"
        );
    }

    #[test]
    fn missing_fields_default() {
        let rec: ContentRecord = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        assert!(rec.status);
        assert!(rec.code.is_none());
        assert!(rec.body.is_empty());
        assert!(rec.secondary_tags.is_empty());
    }

    #[test]
    fn decode_drops_invalid_sequences() {
        let (text, dropped) = decode_dropping_invalid(b"ab\xffc\xe2\x82");
        assert_eq!(text, "abc");
        assert_eq!(dropped, 3);
    }

    #[test]
    fn open_fixture_dump() {
        let repo = DumpRepository::open(&fixture_path("json/site-dump.fixture.json"), site_urls())
            .expect("open fixture");
        assert_eq!(repo.record_count(), 6);
        let terms = repo.category_tree("knowledge_areas").unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].name, "Cartography and Visualization");
    }

    #[test]
    fn open_invalid_utf8_dump() {
        let path = std::env::temp_dir().join(format!(
            "ltb-dump-test-{}.json",
            uuid::Uuid::now_v7()
        ));
        let mut bytes = br#"{"taxonomies":{"ka":[{"id":1,"name":"Maps"#.to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(br#""}]},"records":[]}"#);
        std::fs::write(&path, &bytes).unwrap();

        let repo = DumpRepository::open(&path, site_urls()).expect("open");
        assert_eq!(repo.category_tree("ka").unwrap()[0].name, "Maps");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let err = DumpRepository::open(Path::new("/nonexistent/dump.json"), site_urls())
            .err()
            .expect("error");
        assert!(matches!(err, LtbExportError::Io { .. }));
    }
}
