//! Canonical URL construction.

use url::Url;

/// Builds canonical record and category URLs against a site base URL.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    base: Url,
}

impl SiteUrls {
    /// Wrap a base URL. A base path without a trailing slash is treated as a
    /// directory, so `https://host/site` and `https://host/site/` agree.
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    /// URL of a record: its alias when present, otherwise `{base}/node/{id}`.
    pub fn record_url(&self, id: u64, alias: Option<&str>) -> String {
        self.resolve(alias, &format!("node/{id}"))
    }

    /// URL of a category term: its alias when present, otherwise
    /// `{base}/taxonomy/term/{id}`.
    pub fn term_url(&self, id: u64, alias: Option<&str>) -> String {
        self.resolve(alias, &format!("taxonomy/term/{id}"))
    }

    fn resolve(&self, alias: Option<&str>, fallback: &str) -> String {
        let path = alias
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(fallback);

        // Absolute aliases are used verbatim.
        if let Ok(absolute) = Url::parse(path) {
            return absolute.to_string();
        }

        match self.base.join(path.trim_start_matches('/')) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(path, error = %e, "could not resolve URL against base");
                format!("{}{}", self.base, path.trim_start_matches('/'))
            }
        }
    }
}
