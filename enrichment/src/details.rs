use std::{collections::HashMap, time::Duration};

use gamedex_core::{SourceError, SteamAppId, StructuredDetails};
use reqwest::Client;
use serde::Deserialize;

use crate::fetch::{classify_reqwest_error, http_client};

pub const DEFAULT_API_URL: &str = "https://store.steampowered.com/api/appdetails";

/// Source of store details keyed by Steam app id.
#[async_trait::async_trait]
pub trait DetailsSource: Send + Sync {
    /// `Ok(None)` when the store has nothing for this id.
    async fn fetch(&self, app_id: SteamAppId) -> Result<Option<StructuredDetails>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct AppContainer {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<StructuredDetails>,
}

/// Pull the details for `app_id` out of an `appdetails` response body.
///
/// The payload is an object keyed by the id as a string. Anything other than
/// a present key with `success: true` and a `data` object is "no details".
pub fn parse_details_payload(
    app_id: SteamAppId,
    body: &str,
) -> Result<Option<StructuredDetails>, SourceError> {
    let mut payload: HashMap<String, AppContainer> = serde_json::from_str(body)?;
    Ok(match payload.remove(&app_id.to_string()) {
        Some(container) if container.success => container.data,
        _ => None,
    })
}

#[derive(Debug, Clone)]
pub struct SteamDetailsFetcher {
    http: Client,
    api_url: String,
}

impl SteamDetailsFetcher {
    pub fn new(
        api_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<SteamDetailsFetcher, SourceError> {
        Ok(SteamDetailsFetcher {
            http: http_client(user_agent, timeout)?,
            api_url: api_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl DetailsSource for SteamDetailsFetcher {
    async fn fetch(&self, app_id: SteamAppId) -> Result<Option<StructuredDetails>, SourceError> {
        let id = app_id.to_string();
        let resp = self
            .http
            .get(&self.api_url)
            .query(&[("appids", id.as_str()), ("l", "en"), ("cc", "us")])
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&self.api_url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::SourceUnavailable(format!(
                "details for app {} returned status {}",
                app_id, status
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&self.api_url, e))?;
        log::trace!("details for app {}: {} bytes", app_id, body.len());
        parse_details_payload(app_id, &body)
    }
}
