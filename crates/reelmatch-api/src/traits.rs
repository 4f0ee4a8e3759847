//! Trait definitions for the collaborators a reconciliation run talks to.
//!
//! The engine never crawls disks, stores settings, or speaks HTTP itself;
//! it reaches the scanner, the metadata catalog and the local library only
//! through these traits, so callers can plug in any backend.

use std::future::Future;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which kind of library an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn is_series(self) -> bool {
        matches!(self, Self::Series)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

/// A file or folder reported by the filesystem scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedFile {
    pub path: String,
    pub filename: String,
    pub size_bytes: u64,
}

/// Walks a directory and reports candidate media files.
pub trait Scanner: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Scan `path` for media of the given kind. No ordering guarantee.
    fn scan(
        &self,
        path: &Path,
        kind: MediaKind,
    ) -> impl Future<Output = Result<Vec<ScannedFile>, Self::Error>> + Send;
}

/// A search result from the metadata catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub external_id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    /// Release or first-air date as reported by the catalog ("1999-03-30").
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_ref: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl CatalogCandidate {
    /// Best-effort release year: the explicit year, else the year of the
    /// release date, else its leading four digits.
    pub fn release_year(&self) -> Option<u32> {
        if self.year.is_some() {
            return self.year;
        }
        let date = self.release_date.as_deref()?.trim();
        if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            return u32::try_from(parsed.year()).ok();
        }
        date.get(..4)?.parse().ok()
    }

    /// Title variants to compare against: primary title first, then the
    /// original-language title when it differs.
    pub fn title_variants(&self) -> Vec<&str> {
        let mut titles = vec![self.title.as_str()];
        if let Some(original) = self.original_title.as_deref() {
            if !original.is_empty() && original != self.title {
                titles.push(original);
            }
        }
        titles
    }
}

/// The external metadata catalog.
pub trait CatalogSearch: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search for `query`, optionally filtered by release year.
    ///
    /// A bare numeric query is an identifier lookup; implementations ignore
    /// `year` in that case.
    fn search(
        &self,
        query: &str,
        year: Option<u32>,
        kind: MediaKind,
    ) -> impl Future<Output = Result<Vec<CatalogCandidate>, Self::Error>> + Send;

    /// Whether the catalog has what it needs (credentials, endpoint) to
    /// answer searches. Checked once before a run starts.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Everything the library needs to add a new item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryAddRequest {
    pub external_id: u64,
    pub title: String,
    pub year: Option<u32>,
    pub poster_ref: Option<String>,
    pub folder_path: String,
    pub profile_id: u64,
    pub kind: MediaKind,
    /// Ask the library to search for the item right after adding it.
    pub search_on_add: bool,
}

/// An item as stored by the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub id: u64,
    pub external_id: u64,
    pub path: String,
}

/// The local library that owns already-imported media.
pub trait LibraryService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Folder paths of every item the library already tracks.
    fn list_paths(
        &self,
        kind: MediaKind,
    ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Add an item. Rejections come back as `Err`, never as a panic.
    fn add(
        &self,
        request: LibraryAddRequest,
    ) -> impl Future<Output = Result<LibraryItem, Self::Error>> + Send;
}

/// Read-only application settings relevant to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub concurrency_limit: usize,
    pub default_profile: Option<u64>,
    pub auto_search: bool,
}

/// Source of [`Settings`].
pub trait SettingsProvider: Send + Sync {
    fn settings(&self) -> Settings;
}
