use std::sync::Arc;

use gamedex_core::{CatalogEntry, EnrichedRecord};
use tokio::task::JoinSet;

use crate::orchestrator::EnrichmentOrchestrator;

/// Enriches a whole page of catalog results and ranks them.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    orchestrator: Arc<EnrichmentOrchestrator>,
}

impl ResultAggregator {
    pub fn new(orchestrator: Arc<EnrichmentOrchestrator>) -> ResultAggregator {
        ResultAggregator { orchestrator }
    }

    /// One task per entry, all running at once. Records come back sorted by
    /// descending score (missing scores rank as zero); ties keep catalog order.
    pub async fn aggregate(&self, entries: Vec<CatalogEntry>) -> Vec<EnrichedRecord> {
        let mut tasks = JoinSet::new();
        for (idx, entry) in entries.iter().cloned().enumerate() {
            let orchestrator = self.orchestrator.clone();
            tasks.spawn(async move { (idx, orchestrator.enrich(entry).await) });
        }

        let mut slots: Vec<Option<EnrichedRecord>> = vec![None; entries.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, record)) => slots[idx] = Some(record),
                Err(e) => log::error!("enrichment task failed: {}", e),
            }
        }

        let mut records = slots
            .into_iter()
            .zip(entries)
            .map(|(slot, entry)| slot.unwrap_or_else(|| EnrichedRecord::from_catalog(entry)))
            .collect::<Vec<_>>();
        records.sort_by_key(|r| std::cmp::Reverse(r.rank_score()));
        log::info!("enriched {} records", records.len());
        records
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gamedex_core::{
        test_util::catalog_entry, CompletionTimeInfo, SourceError, SteamAppId, StructuredDetails,
    };

    use super::*;
    use crate::{
        cache::{CacheLookup, PlaytimeCache, TimeCache},
        details::DetailsSource,
        orchestrator::tests::{FakeDetails, FakePlaytime},
        playtime::{
            candidate_urls,
            tests::{FakeFetcher, BASE, DETAIL_PAGE, SEARCH_PAGE},
            PlaytimeScraper, PlaytimeSource,
        },
    };

    fn aggregator(details: FakeDetails, playtime: FakePlaytime) -> ResultAggregator {
        ResultAggregator::new(Arc::new(EnrichmentOrchestrator::new(
            Arc::new(details),
            Arc::new(playtime),
        )))
    }

    #[tokio::test]
    async fn sorted_by_score_regardless_of_finish_order() {
        let playtime = FakePlaytime {
            delays: vec![("High".to_owned(), Duration::from_millis(100))],
            ..Default::default()
        };
        let records = aggregator(FakeDetails::default(), playtime)
            .aggregate(vec![
                catalog_entry(1, "Low", Some(50)),
                catalog_entry(2, "High", Some(90)),
            ])
            .await;
        let scores = records.iter().map(|r| r.score).collect::<Vec<_>>();
        assert_eq!(scores, vec![Some(90), Some(50)]);
        assert!(records.iter().all(|r| r.playtime_main.is_some()));
    }

    #[tokio::test]
    async fn missing_scores_rank_last_and_ties_keep_order() {
        let records = aggregator(FakeDetails::default(), FakePlaytime::default())
            .aggregate(vec![
                catalog_entry(1, "Unscored", None),
                catalog_entry(2, "First 80", Some(80)),
                catalog_entry(3, "Zero", Some(0)),
                catalog_entry(4, "Second 80", Some(80)),
            ])
            .await;
        let ids = records.iter().map(|r| r.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[tokio::test]
    async fn empty_input() {
        let records = aggregator(FakeDetails::default(), FakePlaytime::default())
            .aggregate(Vec::new())
            .await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn panicking_task_keeps_catalog_record() {
        struct PanicsOn(&'static str);

        #[async_trait::async_trait]
        impl PlaytimeSource for PanicsOn {
            async fn lookup(&self, title: &str) -> Option<CompletionTimeInfo> {
                if title == self.0 {
                    panic!("markup blew up");
                }
                None
            }
        }

        let orchestrator =
            EnrichmentOrchestrator::new(Arc::new(FakeDetails::default()), Arc::new(PanicsOn("B")));
        let entries = vec![catalog_entry(1, "A", Some(10)), catalog_entry(2, "B", Some(20))];
        let records = ResultAggregator::new(Arc::new(orchestrator))
            .aggregate(entries.clone())
            .await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], EnrichedRecord::from_catalog(entries[1].clone()));
        assert_eq!(records[1].id, 1);
    }

    #[tokio::test]
    async fn witcher_end_to_end() {
        struct WitcherDetails;

        #[async_trait::async_trait]
        impl DetailsSource for WitcherDetails {
            async fn fetch(
                &self,
                app_id: SteamAppId,
            ) -> Result<Option<StructuredDetails>, SourceError> {
                assert_eq!(app_id.get(), 292030);
                Ok(Some(StructuredDetails {
                    name: Some("The Witcher 3".to_owned()),
                    header_image: Some("https://cdn.test/292030/header.jpg".to_owned()),
                    short_description: None,
                }))
            }
        }

        let detail_url = format!("{}/game/10270", BASE);
        let fetcher = Arc::new(
            FakeFetcher::default()
                .page(&candidate_urls(BASE, "The Witcher 3")[0], 200, SEARCH_PAGE)
                .page(&detail_url, 200, DETAIL_PAGE),
        );
        let cache = Arc::new(TimeCache::default());
        let scraper = PlaytimeScraper::new(BASE, fetcher.clone(), cache.clone());

        let mut witcher = catalog_entry(1, "The Witcher 3", Some(92));
        witcher.app_id = SteamAppId::new(292030);

        let orchestrator = EnrichmentOrchestrator::new(Arc::new(WitcherDetails), Arc::new(scraper));
        let records = ResultAggregator::new(Arc::new(orchestrator))
            .aggregate(vec![witcher])
            .await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, 1);
        assert_eq!(record.title, "The Witcher 3");
        assert_eq!(record.score, Some(92));
        assert_eq!(
            record.details.as_ref().and_then(|d| d.name.as_deref()),
            Some("The Witcher 3")
        );
        assert_eq!(record.playtime_main.as_deref(), Some("25 Hours"));
        assert_eq!(record.playtime_completionist.as_deref(), Some("173 Hours"));
        assert_eq!(record.playtime_url.as_deref(), Some(detail_url.as_str()));
        assert_eq!(fetcher.calls().len(), 2);
        assert!(matches!(cache.get("the witcher 3"), CacheLookup::Found(_)));
    }
}
