//! Canned enrichment for running the pipeline offline.

use gamedex_core::{CompletionTimeInfo, SourceError, SteamAppId, StructuredDetails};

use crate::{details::DetailsSource, playtime::PlaytimeSource};

pub const MOCK_PLAYTIME_MAIN: &str = "50h (Mock)";
pub const MOCK_PLAYTIME_COMPLETIONIST: &str = "172h (Mock)";
pub const MOCK_PLAYTIME_URL: &str = "https://howlongtobeat.com/mock";

/// Same details for every app id, without touching the network.
#[derive(Debug, Default, Clone)]
pub struct MockDetails;

#[async_trait::async_trait]
impl DetailsSource for MockDetails {
    async fn fetch(&self, app_id: SteamAppId) -> Result<Option<StructuredDetails>, SourceError> {
        log::debug!("mock details for app {}", app_id);
        Ok(Some(StructuredDetails {
            name: Some(format!("Steam app {} (Mock)", app_id)),
            header_image: None,
            short_description: Some("Store details are mocked".to_owned()),
        }))
    }
}

/// Same playtimes for every title, without touching the network.
#[derive(Debug, Default, Clone)]
pub struct MockPlaytime;

#[async_trait::async_trait]
impl PlaytimeSource for MockPlaytime {
    async fn lookup(&self, title: &str) -> Option<CompletionTimeInfo> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        log::debug!("mock playtime for {:?}", title);
        Some(CompletionTimeInfo {
            title: Some(title.to_owned()),
            main: Some(MOCK_PLAYTIME_MAIN.to_owned()),
            completionist: Some(MOCK_PLAYTIME_COMPLETIONIST.to_owned()),
            url: Some(MOCK_PLAYTIME_URL.to_owned()),
        })
    }
}
