//! Enrich catalog results with store details and playtime estimates.

pub use self::{
    aggregator::ResultAggregator,
    cache::{CacheLookup, PlaytimeCache, TimeCache},
    details::{DetailsSource, SteamDetailsFetcher},
    fetch::{HttpPageFetcher, PageFetcher},
    mock::{MockDetails, MockPlaytime},
    orchestrator::EnrichmentOrchestrator,
    playtime::{PlaytimeScraper, PlaytimeSource},
};

pub mod aggregator;
pub mod cache;
pub mod details;
pub mod fetch;
pub mod html;
pub mod mock;
pub mod orchestrator;
pub mod playtime;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;
