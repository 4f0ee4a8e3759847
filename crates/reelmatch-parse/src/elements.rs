use serde::{Deserialize, Serialize};

/// Which catalog an embedded identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdSource {
    Tmdb,
    Tvdb,
    /// A bare braced number with no catalog prefix.
    Unknown,
}

/// Metadata extracted from a file or folder name.
///
/// Purely a function of the input name: the same name always parses to the
/// same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMetadata {
    /// Title with year, release tokens and separators removed.
    pub clean_title: String,
    /// Release year (19xx/20xx).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    /// Canonical resolution tag (e.g. "1080p", "2160p").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_tag: Option<String>,
    /// Catalog identifier embedded in the name (e.g. `{tmdb-603}`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_source: Option<IdSource>,
    /// Canonical release source (e.g. "BluRay", "WEB-DL").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Scene group from a trailing `-GROUP` suffix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
    /// Season number (series only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    /// Episode number (series only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl ParsedMetadata {
    /// Whether there is anything to send to a catalog search.
    pub fn is_searchable(&self) -> bool {
        !self.clean_title.is_empty() || self.external_id.is_some()
    }
}
