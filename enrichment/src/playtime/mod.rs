//! HowLongToBeat playtime lookups.
//!
//! The site has no API, so this scrapes the search and detail pages. Lookups go
//! through a [`PlaytimeCache`] first; both hits and confirmed misses are cached.
//! Candidate search urls are tried one at a time, never concurrently.

use std::sync::Arc;

use gamedex_core::{CompletionTimeInfo, SourceError};
use url::Url;

use crate::{
    cache::{cache_key, CacheLookup, PlaytimeCache},
    fetch::{FetchedPage, PageFetcher},
    html::Page,
};

pub mod extract;

use self::extract::SearchHit;

pub const DEFAULT_BASE_URL: &str = "https://howlongtobeat.com";
const SEARCH_REFERRER: &str = "https://google.com";

/// Source of playtime estimates for a title. Never fails; anything that goes
/// wrong is reported as "no data".
#[async_trait::async_trait]
pub trait PlaytimeSource: Send + Sync {
    async fn lookup(&self, title: &str) -> Option<CompletionTimeInfo>;
}

pub struct PlaytimeScraper {
    base_url: String,
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<dyn PlaytimeCache>,
}

impl std::fmt::Debug for PlaytimeScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaytimeScraper")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Search urls for `title`, in the order they should be tried.
pub fn candidate_urls(base_url: &str, title: &str) -> Vec<String> {
    let base = base_url.trim_end_matches('/');
    let encoded = url::form_urlencoded::byte_serialize(title.trim().as_bytes()).collect::<String>();
    vec![
        format!("{}/search_results?page=1&searchterm={}", base, encoded),
        format!(
            "{}/search_results?page=1&searchterm={}",
            base,
            encoded.replace('+', "%20")
        ),
        format!("{}/?q={}", base, encoded),
        format!("{}/search?q={}", base, encoded),
    ]
}

fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_owned();
    }
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(u) => u.to_string(),
        Err(_) => format!("{}{}", base_url.trim_end_matches('/'), href),
    }
}

impl PlaytimeScraper {
    pub fn new(
        base_url: impl Into<String>,
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<dyn PlaytimeCache>,
    ) -> PlaytimeScraper {
        PlaytimeScraper {
            base_url: base_url.into(),
            fetcher,
            cache,
        }
    }

    /// Try each candidate search url in turn and return the first successful page.
    async fn fetch_search_page(&self, title: &str) -> Result<FetchedPage, SourceError> {
        let mut last_error = None;
        for url in candidate_urls(&self.base_url, title) {
            match self.fetcher.fetch(&url, SEARCH_REFERRER).await {
                Ok(page) if page.is_success() => return Ok(page),
                Ok(page) => {
                    log::debug!("search candidate {} returned {}", url, page.status);
                    last_error = Some(SourceError::SourceUnavailable(format!(
                        "{} returned status {}",
                        page.url, page.status
                    )));
                }
                Err(e) => {
                    log::debug!("search candidate {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| SourceError::NotFound(title.to_owned())))
    }

    async fn fetch_detail_page(&self, href: &str) -> Option<FetchedPage> {
        let url = resolve_href(&self.base_url, href);
        match self.fetcher.fetch(&url, &self.base_url).await {
            Ok(page) if page.is_success() => Some(page),
            Ok(page) => {
                log::debug!("detail page {} returned {}", url, page.status);
                None
            }
            Err(e) => {
                log::debug!("detail page {} failed: {}", url, e);
                None
            }
        }
    }

    async fn fetch_and_parse(&self, title: &str) -> Result<CompletionTimeInfo, SourceError> {
        let search = self.fetch_search_page(title).await?;
        let hit = extract::first_result(&Page::parse(&search.body, Some(search.url.clone())));

        let detail = match hit.detail_href.as_deref() {
            Some(href) => self.fetch_detail_page(href).await,
            None => None,
        };
        let working = detail.as_ref().unwrap_or(&search);
        Ok(build_info(title, hit, working))
    }
}

fn build_info(query: &str, hit: SearchHit, working: &FetchedPage) -> CompletionTimeInfo {
    let page = Page::parse(&working.body, Some(working.url.clone()));
    let times = extract::extract_times(extract::main_region(&page));
    let title = hit
        .title
        .or_else(|| extract::page_title(&page))
        .unwrap_or_else(|| query.trim().to_owned());
    CompletionTimeInfo {
        title: Some(title),
        main: times.main.map(extract::normalize_value),
        completionist: times.completionist.map(extract::normalize_value),
        url: page.url().map(str::to_owned),
    }
}

#[async_trait::async_trait]
impl PlaytimeSource for PlaytimeScraper {
    async fn lookup(&self, title: &str) -> Option<CompletionTimeInfo> {
        let key = cache_key(title);
        if key.is_empty() {
            return None;
        }

        match self.cache.get(&key) {
            CacheLookup::Found(info) => {
                log::trace!("playtime cache hit for {:?}", key);
                return Some(info);
            }
            CacheLookup::ConfirmedAbsent => {
                log::trace!("playtime cache hit (absent) for {:?}", key);
                return None;
            }
            CacheLookup::NotLookedUp => {}
        }

        let result = match self.fetch_and_parse(title).await {
            Ok(info) => Some(info),
            Err(e) if e.is_timeout() => {
                log::warn!("playtime lookup for {:?} timed out: {}", title, e);
                None
            }
            Err(e) => {
                log::warn!("no playtime for {:?}: {}", title, e);
                None
            }
        };
        self.cache.put(key, result.clone());
        result
    }
}
