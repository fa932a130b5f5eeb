use std::sync::Arc;

use gamedex_core::{CatalogEntry, EnrichedRecord, StructuredDetails};

use crate::{details::DetailsSource, playtime::PlaytimeSource};

/// Enriches one catalog entry at a time from the details and playtime sources.
///
/// The two sources are queried concurrently and independently: a failure in
/// one never loses data from the other, and enrichment itself never fails.
#[derive(Clone)]
pub struct EnrichmentOrchestrator {
    details: Arc<dyn DetailsSource>,
    playtime: Arc<dyn PlaytimeSource>,
}

impl std::fmt::Debug for EnrichmentOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentOrchestrator").finish_non_exhaustive()
    }
}

impl EnrichmentOrchestrator {
    pub fn new(
        details: Arc<dyn DetailsSource>,
        playtime: Arc<dyn PlaytimeSource>,
    ) -> EnrichmentOrchestrator {
        EnrichmentOrchestrator { details, playtime }
    }

    pub async fn enrich(&self, entry: CatalogEntry) -> EnrichedRecord {
        let (details, playtime) = tokio::join!(
            self.details_for(&entry),
            self.playtime.lookup(&entry.title)
        );
        log::debug!(
            "enriched {:?}: details={} playtime={}",
            entry.title,
            details.is_some(),
            playtime.is_some()
        );
        EnrichedRecord::from_catalog(entry)
            .with_details(details)
            .with_playtime(playtime)
    }

    async fn details_for(&self, entry: &CatalogEntry) -> Option<StructuredDetails> {
        let app_id = entry.app_id?;
        match self.details.fetch(app_id).await {
            Ok(details) => details,
            Err(e) => {
                log::warn!("details for {:?} (app {}) failed: {}", entry.title, app_id, e);
                None
            }
        }
    }
}
