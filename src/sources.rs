//! Data source catalog
//!
//! Sources describe where raw items come from. The catalog is read-only at
//! runtime; it is loaded from configuration and summarized for display.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of ingestion source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Third-party search or data API
    Api,
    /// Files uploaded by users
    Upload,
    /// Database export
    Database,
    /// Web scraper
    Scraping,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Api => "api",
            Self::Upload => "upload",
            Self::Database => "database",
            Self::Scraping => "scraping",
        };
        write!(f, "{}", name)
    }
}

/// Health of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    /// Syncing normally
    Active,
    /// Configured but paused
    Inactive,
    /// Last sync failed
    Error,
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// A configured data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Source identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Kind of source
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Current health
    pub status: SourceStatus,
    /// Items ingested so far
    #[serde(default)]
    pub item_count: u64,
    /// Human-readable time of the last sync
    #[serde(default)]
    pub last_sync: String,
    /// Source-specific settings
    #[serde(default)]
    pub settings: BTreeMap<String, serde_yaml::Value>,
}

/// Totals across the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    /// Sources with status `active`
    pub active: usize,
    /// Items across every source
    pub total_items: u64,
    /// Sources with status `error`
    pub errored: usize,
}

/// Ordered list of data sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCatalog {
    sources: Vec<DataSource>,
}

impl SourceCatalog {
    /// Create a catalog from configured sources
    pub fn new(sources: Vec<DataSource>) -> Self {
        Self { sources }
    }

    /// Sources in configured order
    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    /// Sources with the given status
    pub fn with_status(&self, status: SourceStatus) -> impl Iterator<Item = &DataSource> {
        self.sources
            .iter()
            .filter(move |source| source.status == status)
    }

    /// Summarize the catalog
    ///
    /// # Examples
    ///
    /// ```
    /// use sift::sources::SourceCatalog;
    ///
    /// let summary = SourceCatalog::default().summary();
    /// assert_eq!(summary.active, 2);
    /// assert_eq!(summary.total_items, 27_560);
    /// assert_eq!(summary.errored, 1);
    /// ```
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            active: self.with_status(SourceStatus::Active).count(),
            total_items: self.sources.iter().map(|source| source.item_count).sum(),
            errored: self.with_status(SourceStatus::Error).count(),
        }
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::new(default_sources())
    }
}

fn setting_list(values: &[&str]) -> serde_yaml::Value {
    serde_yaml::Value::Sequence(
        values
            .iter()
            .map(|value| serde_yaml::Value::String(value.to_string()))
            .collect(),
    )
}

fn settings(entries: Vec<(&str, serde_yaml::Value)>) -> BTreeMap<String, serde_yaml::Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Sources shown before any are configured
pub fn default_sources() -> Vec<DataSource> {
    vec![
        DataSource {
            id: "1".to_string(),
            name: "Bing Image Search API".to_string(),
            kind: SourceKind::Api,
            status: SourceStatus::Active,
            item_count: 15_420,
            last_sync: "2 hours ago".to_string(),
            settings: settings(vec![
                ("endpoint", serde_yaml::Value::String("api.bing.com".to_string())),
                ("queries", setting_list(&["nature", "architecture"])),
            ]),
        },
        DataSource {
            id: "2".to_string(),
            name: "User Uploads".to_string(),
            kind: SourceKind::Upload,
            status: SourceStatus::Active,
            item_count: 3_240,
            last_sync: "30 minutes ago".to_string(),
            settings: settings(vec![("allowed_types", setting_list(&["jpg", "png", "gif"]))]),
        },
        DataSource {
            id: "3".to_string(),
            name: "Google Custom Search".to_string(),
            kind: SourceKind::Api,
            status: SourceStatus::Inactive,
            item_count: 8_900,
            last_sync: "1 day ago".to_string(),
            settings: settings(vec![
                (
                    "search_engine_id",
                    serde_yaml::Value::String("cx_123456".to_string()),
                ),
                ("queries", setting_list(&["technology"])),
            ]),
        },
        DataSource {
            id: "4".to_string(),
            name: "Web Scraping Bot".to_string(),
            kind: SourceKind::Scraping,
            status: SourceStatus::Error,
            item_count: 0,
            last_sync: "Failed".to_string(),
            settings: settings(vec![("targets", setting_list(&["example.com", "sample.org"]))]),
        },
    ]
}
