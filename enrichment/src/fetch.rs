use std::time::Duration;

use gamedex_core::SourceError;
use reqwest::{header, redirect::Policy, Client};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const MAX_REDIRECTS: usize = 10;

/// A response body along with where it actually came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// Final address after redirects.
    pub url: String,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches html pages. Error statuses are returned, not raised; only
/// transport failures are errors.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, referrer: &str) -> Result<FetchedPage, SourceError>;
}

pub fn http_client(user_agent: &str, timeout: Duration) -> Result<Client, SourceError> {
    Client::builder()
        .user_agent(user_agent)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| SourceError::SourceUnavailable(format!("unable to build http client: {}", e)))
}

pub(crate) fn classify_reqwest_error(url: &str, e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::SourceTimeout {
            url: url.to_owned(),
        }
    } else if e.is_decode() {
        SourceError::ParseFailure(format!("{}: {}", url, e))
    } else {
        SourceError::SourceUnavailable(format!("{}: {}", url, e))
    }
}

#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http: Client,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<HttpPageFetcher, SourceError> {
        Ok(HttpPageFetcher {
            http: http_client(user_agent, timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, referrer: &str) -> Result<FetchedPage, SourceError> {
        let resp = self
            .http
            .get(url)
            .header(header::REFERER, referrer)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;
        log::trace!("GET {} -> {} ({} bytes)", final_url, status, body.len());
        Ok(FetchedPage {
            status,
            url: final_url,
            body,
        })
    }
}
