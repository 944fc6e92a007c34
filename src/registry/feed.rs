//! OData feed response shapes
//!
//! The registry is an OData v2 feed queried with a JSON `Accept` header.
//! Depending on the server generation the payload is either
//! `{"d": {"results": [...]}}` or `{"d": [...]}`; both are accepted.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FeedEnvelope {
    pub d: FeedData,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FeedData {
    Wrapped { results: Vec<FeedEntry> },
    Bare(Vec<FeedEntry>),
}

impl FeedData {
    pub fn into_entries(self) -> Vec<FeedEntry> {
        match self {
            FeedData::Wrapped { results } => results,
            FeedData::Bare(entries) => entries,
        }
    }
}

/// One package entry from the feed.
#[derive(Debug, Deserialize)]
pub struct FeedEntry {
    /// Media metadata; `media_src` is the package content URL.
    #[serde(rename = "__metadata", default)]
    pub metadata: Option<EntryMetadata>,

    #[serde(rename = "Id", default)]
    pub id: Option<String>,

    #[serde(rename = "Title", default)]
    pub title: Option<String>,

    #[serde(rename = "Version")]
    pub version: String,

    /// Pipe-delimited `name:versionExpr:` triples.
    #[serde(rename = "Dependencies", default)]
    pub dependencies: Option<String>,

    /// Comma-separated owner identities.
    #[serde(rename = "Owners", default)]
    pub owners: Option<String>,
}

impl FeedEntry {
    /// Package name; some feeds leave `Title` empty and only fill `Id`.
    pub fn name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or(self.id.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryMetadata {
    #[serde(default)]
    pub media_src: Option<String>,
}
