use serde::{Deserialize, Serialize};

pub use self::identifiers::SteamAppId;

pub mod identifiers;

/// A single search hit from the primary game catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    /// Relevance/popularity score (metacritic), when the catalog has one.
    pub score: Option<i32>,
    pub release_year: Option<String>,
    pub genres: Vec<String>,
    pub background_image: Option<String>,
    /// Link to the game's Steam store page.
    pub store_url: Option<String>,
    pub app_id: Option<SteamAppId>,
}

/// Playtime estimates scraped for a title. Any subset of fields may be unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTimeInfo {
    /// The title as the scraped site names it, which may differ from the query.
    pub title: Option<String>,
    pub main: Option<String>,
    pub completionist: Option<String>,
    pub url: Option<String>,
}

/// Store details from the structured details API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
}

/// A catalog entry plus whatever enrichment could be found for it.
///
/// Every enrichment field is optional; an entry with nothing resolved is
/// still a valid record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub id: i64,
    pub title: String,
    pub score: Option<i32>,
    pub release_year: Option<String>,
    pub genres: Vec<String>,
    pub background_image: Option<String>,
    pub store_url: Option<String>,
    pub app_id: Option<SteamAppId>,
    pub details: Option<StructuredDetails>,
    pub playtime_main: Option<String>,
    pub playtime_completionist: Option<String>,
    pub playtime_url: Option<String>,
}

impl EnrichedRecord {
    /// The record for `entry` before any enrichment is merged in.
    pub fn from_catalog(entry: CatalogEntry) -> EnrichedRecord {
        EnrichedRecord {
            id: entry.id,
            title: entry.title,
            score: entry.score,
            release_year: entry.release_year,
            genres: entry.genres,
            background_image: entry.background_image,
            store_url: entry.store_url,
            app_id: entry.app_id,
            details: None,
            playtime_main: None,
            playtime_completionist: None,
            playtime_url: None,
        }
    }

    pub fn with_details(mut self, details: Option<StructuredDetails>) -> EnrichedRecord {
        self.details = details;
        self
    }

    pub fn with_playtime(mut self, playtime: Option<CompletionTimeInfo>) -> EnrichedRecord {
        if let Some(info) = playtime {
            self.playtime_main = info.main;
            self.playtime_completionist = info.completionist;
            self.playtime_url = info.url;
        }
        self
    }

    /// Score used for ranking; entries without one rank as zero.
    pub fn rank_score(&self) -> i32 {
        self.score.unwrap_or(0)
    }
}

/// Failure of one of the secondary enrichment sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} timed out")]
    SourceTimeout { url: String },
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("unable to parse source response: {0}")]
    ParseFailure(String),
    #[error("no data for {0}")]
    NotFound(String),
}

impl SourceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SourceError::SourceTimeout { .. })
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::ParseFailure(e.to_string())
    }
}

/// Fixture builders shared by the test suites of downstream crates.
pub mod test_util {
    use super::*;

    pub fn catalog_entry(id: i64, title: &str, score: Option<i32>) -> CatalogEntry {
        CatalogEntry {
            id,
            title: title.to_owned(),
            score,
            release_year: Some("2015".to_owned()),
            genres: vec!["RPG".to_owned()],
            background_image: Some(format!("https://media.example/{}.jpg", id)),
            store_url: None,
            app_id: None,
        }
    }
}
