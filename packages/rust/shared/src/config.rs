//! Application configuration for the exporter.
//!
//! User config lives at `~/.ltb-export/ltb-export.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LtbExportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "ltb-export.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".ltb-export";

// ---------------------------------------------------------------------------
// Config structs (matching ltb-export.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site identity and URL base.
    #[serde(default)]
    pub site: SiteConfig,

    /// Export defaults.
    #[serde(default)]
    pub export: ExportDefaultsConfig,

    /// Legacy and superseded record filters.
    #[serde(default)]
    pub skip: SkipConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Title of the synthetic root node.
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Base URL canonical record and category URLs are built from.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            base_url: default_base_url(),
        }
    }
}

fn default_site_name() -> String {
    "GIS&T Body of Knowledge".into()
}
fn default_base_url() -> String {
    "https://gistbok.ucgis.org".into()
}

/// `[export]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDefaultsConfig {
    /// Vocabulary holding the category tree.
    #[serde(default = "default_taxonomy")]
    pub taxonomy: String,

    /// Maximum accepted records per category (unset = unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Tag-strip the long-form `content` field.
    #[serde(default)]
    pub strip: bool,

    /// Indent the output JSON.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for ExportDefaultsConfig {
    fn default() -> Self {
        Self {
            taxonomy: default_taxonomy(),
            limit: None,
            strip: false,
            pretty: false,
        }
    }
}

fn default_taxonomy() -> String {
    "knowledge_areas".into()
}

/// `[skip]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipConfig {
    /// Regex matching prior-edition codes. Empty disables the rule.
    #[serde(default = "default_legacy_code_pattern")]
    pub legacy_code_pattern: String,

    /// URL substrings marking a superseded content batch.
    #[serde(default = "default_superseded_url_markers")]
    pub superseded_url_markers: Vec<String>,
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            legacy_code_pattern: default_legacy_code_pattern(),
            superseded_url_markers: default_superseded_url_markers(),
        }
    }
}

fn default_legacy_code_pattern() -> String {
    r"^[A-Za-z]{2}\d+-\d+$".into()
}
fn default_superseded_url_markers() -> Vec<String> {
    vec!["/bok-topics/2016-".into()]
}

// ---------------------------------------------------------------------------
// Export options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Compiled skip rules for legacy and superseded records.
#[derive(Debug, Clone, Default)]
pub struct SkipRules {
    /// Prior-edition code pattern (`None` = rule disabled).
    pub legacy_code: Option<Regex>,
    /// URL substrings marking a superseded content batch.
    pub superseded_url_markers: Vec<String>,
}

impl SkipRules {
    /// Compile the rules from the `[skip]` section.
    pub fn from_config(config: &SkipConfig) -> Result<Self> {
        let legacy_code = if config.legacy_code_pattern.trim().is_empty() {
            None
        } else {
            Some(Regex::new(&config.legacy_code_pattern).map_err(|e| {
                LtbExportError::config(format!(
                    "invalid legacy_code_pattern '{}': {e}",
                    config.legacy_code_pattern
                ))
            })?)
        };

        Ok(Self {
            legacy_code,
            superseded_url_markers: config
                .superseded_url_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// Whether `code` looks like a prior-edition code.
    pub fn is_legacy_code(&self, code: &str) -> bool {
        self.legacy_code
            .as_ref()
            .is_some_and(|re| re.is_match(code))
    }

    /// Whether `url` belongs to a superseded content batch.
    pub fn is_superseded_url(&self, url: &str) -> bool {
        self.superseded_url_markers
            .iter()
            .any(|marker| url.contains(marker.as_str()))
    }
}

/// Runtime export configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Title of the root node.
    pub site_name: String,
    /// Base URL for canonical URLs.
    pub base_url: Url,
    /// Category vocabulary id.
    pub taxonomy: String,
    /// Maximum accepted records per category.
    pub limit: Option<usize>,
    /// Tag-strip `content` fields.
    pub strip: bool,
    /// Restrict the export to one category external id.
    pub category_filter: Option<u64>,
    /// Indent the output JSON.
    pub pretty: bool,
    /// Legacy / superseded record filters.
    pub skip: SkipRules,
}

impl TryFrom<&AppConfig> for ExportOptions {
    type Error = LtbExportError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url).map_err(|e| {
            LtbExportError::config(format!("invalid base_url '{}': {e}", config.site.base_url))
        })?;

        Ok(Self {
            site_name: config.site.name.clone(),
            base_url,
            taxonomy: config.export.taxonomy.clone(),
            limit: config.export.limit,
            strip: config.export.strip,
            category_filter: None,
            pretty: config.export.pretty,
            skip: SkipRules::from_config(&config.skip)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.ltb-export/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LtbExportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.ltb-export/ltb-export.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LtbExportError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        LtbExportError::config(format!("failed to parse {}: {e}", path.display()))
    })
}
