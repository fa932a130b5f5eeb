use std::{path::Path, sync::Arc};

use enrichment::{
    DetailsSource, EnrichmentOrchestrator, HttpPageFetcher, MockDetails, MockPlaytime,
    PlaytimeScraper, PlaytimeSource, ResultAggregator, SteamDetailsFetcher, TimeCache,
};

use crate::{
    catalog::{CatalogSearch, MockCatalog, RawgCatalog},
    search_manager::GameSearchService,
    AppError,
};

mod gamedex_config;

pub use gamedex_config::{
    CatalogKind, ConfigBuilder, ConfigError, EnrichmentKind, GamedexConfig,
};

#[derive(Debug)]
pub struct GamedexBuilder {
    pub config: gamedex_config::ConfigBuilder,
}

impl GamedexBuilder {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(GamedexBuilder {
            config: gamedex_config::ConfigBuilder::new()?.load_environment(true),
        })
    }

    /// Builder reading its config file from `config_dir` and ignoring the environment.
    pub fn with_config_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        Ok(GamedexBuilder {
            config: gamedex_config::ConfigBuilder::with_config_dir(config_dir)?,
        })
    }

    pub fn update(
        self,
        f: impl FnOnce(
            gamedex_config::ConfigBuilder,
        ) -> Result<gamedex_config::ConfigBuilder, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let GamedexBuilder {
            config: config_builder,
        } = self;
        Ok(Self {
            config: f(config_builder)?,
        })
    }

    pub fn build(self) -> Result<GamedexApp, AppError> {
        let config = self.config.build()?;

        let timeout = config.request_timeout()?;
        let user_agent = config.user_agent()?;

        let cache = Arc::new(TimeCache::new(
            config.cache_ttl()?,
            config.cache_max_entries()?,
        ));
        let (details, playtime): (Arc<dyn DetailsSource>, Arc<dyn PlaytimeSource>) =
            match config.enrichment()? {
                EnrichmentKind::Mock => (Arc::new(MockDetails), Arc::new(MockPlaytime)),
                EnrichmentKind::Live => {
                    let fetcher = Arc::new(HttpPageFetcher::new(&user_agent, timeout)?);
                    let playtime = PlaytimeScraper::new(
                        config.hltb_base_url()?,
                        fetcher,
                        cache.clone(),
                    );
                    let details = SteamDetailsFetcher::new(
                        config.steam_api_url()?,
                        &user_agent,
                        timeout,
                    )?;
                    (Arc::new(details), Arc::new(playtime))
                }
            };

        let catalog: Arc<dyn CatalogSearch> = match config.catalog()? {
            CatalogKind::Mock => Arc::new(MockCatalog),
            CatalogKind::Rawg => Arc::new(RawgCatalog::new(
                config.rawg_api_url()?,
                config.rawg_api_key(),
                config.rawg_page_size()?,
                timeout,
            )?),
        };

        let app = GamedexApp {
            config,
            cache,
            playtime,
            details,
            catalog,
        };
        log::trace!("{:#?}", app);
        Ok(app)
    }
}

/// Everything needed to run searches, wired from one configuration.
pub struct GamedexApp {
    pub config: GamedexConfig,
    cache: Arc<TimeCache>,
    playtime: Arc<dyn PlaytimeSource>,
    details: Arc<dyn DetailsSource>,
    catalog: Arc<dyn CatalogSearch>,
}

impl std::fmt::Debug for GamedexApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamedexApp")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl GamedexApp {
    pub fn search_service(&self) -> GameSearchService {
        let orchestrator =
            EnrichmentOrchestrator::new(self.details.clone(), self.playtime.clone());
        GameSearchService::new(
            self.catalog.clone(),
            ResultAggregator::new(Arc::new(orchestrator)),
        )
    }

    pub fn playtime(&self) -> &dyn PlaytimeSource {
        self.playtime.as_ref()
    }

    pub fn details(&self) -> &dyn DetailsSource {
        self.details.as_ref()
    }

    pub fn cache(&self) -> &TimeCache {
        &self.cache
    }
}
