use std::sync::Arc;

use enrichment::ResultAggregator;
use gamedex_core::EnrichedRecord;

use crate::{catalog::CatalogSearch, AppError};

/// Search the catalog and hand back enriched, ranked results.
#[derive(Clone)]
pub struct GameSearchService {
    catalog: Arc<dyn CatalogSearch>,
    aggregator: ResultAggregator,
}

impl std::fmt::Debug for GameSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSearchService")
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

impl GameSearchService {
    pub fn new(catalog: Arc<dyn CatalogSearch>, aggregator: ResultAggregator) -> GameSearchService {
        GameSearchService {
            catalog,
            aggregator,
        }
    }

    /// Only a failed catalog search is an error; enrichment problems just
    /// leave fields empty.
    pub async fn organize(&self, query: &str) -> Result<Vec<EnrichedRecord>, AppError> {
        log::info!("query: {:?}", query);
        let entries = self.catalog.search(query).await?;
        log::debug!("catalog returned {} entries", entries.len());
        Ok(self.aggregator.aggregate(entries).await)
    }
}
