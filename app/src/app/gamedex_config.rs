use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "gamedex";
const APP: &str = "gamedex";
const APP_CAPS: &str = "GAMEDEX";

const CATALOG_KEY: &str = "catalog";
const ENRICHMENT_KEY: &str = "enrichment";
const RAWG_API_URL_KEY: &str = "rawg_api_url";
const RAWG_API_KEY_KEY: &str = "rawg_api_key";
const RAWG_PAGE_SIZE_KEY: &str = "rawg_page_size";
const STEAM_API_URL_KEY: &str = "steam_api_url";
const HLTB_BASE_URL_KEY: &str = "hltb_base_url";
const USER_AGENT_KEY: &str = "user_agent";
const REQUEST_TIMEOUT_KEY: &str = "request_timeout_secs";
const CACHE_TTL_KEY: &str = "cache_ttl_secs";
const CACHE_MAX_ENTRIES_KEY: &str = "cache_max_entries";

const DEFAULT_RAWG_PAGE_SIZE: i64 = 15;
const DEFAULT_CONFIG_FILE: &str = "gamedex.toml";

type ExtConfigBuilder = config::ConfigBuilder<config::builder::DefaultState>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
    #[error("unable to get user home directory")]
    NoUserHome,
    #[error("path is not utf8: {:?}", _0)]
    NonUtf8Path(PathBuf),
    #[error("invalid value for `{key}`: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which primary catalog to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Rawg,
    Mock,
}

impl FromStr for CatalogKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rawg" => Ok(CatalogKind::Rawg),
            "mock" => Ok(CatalogKind::Mock),
            _ => Err(ConfigError::InvalidValue {
                key: CATALOG_KEY,
                value: s.to_owned(),
            }),
        }
    }
}

impl CatalogKind {
    fn as_str(self) -> &'static str {
        match self {
            CatalogKind::Rawg => "rawg",
            CatalogKind::Mock => "mock",
        }
    }
}

/// Where store details and playtimes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentKind {
    /// Steam and HowLongToBeat over the network.
    Live,
    /// Canned values, no network.
    Mock,
}

impl FromStr for EnrichmentKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(EnrichmentKind::Live),
            "mock" => Ok(EnrichmentKind::Mock),
            _ => Err(ConfigError::InvalidValue {
                key: ENRICHMENT_KEY,
                value: s.to_owned(),
            }),
        }
    }
}

impl EnrichmentKind {
    fn as_str(self) -> &'static str {
        match self {
            EnrichmentKind::Live => "live",
            EnrichmentKind::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_dir: Utf8PathBuf,
    config_path: Option<Utf8PathBuf>,
    load_environment: bool,
    config_builder: ExtConfigBuilder,
}

fn camino_path(std_path: &Path) -> Result<&Utf8Path, ConfigError> {
    Utf8Path::from_path(std_path).ok_or_else(|| ConfigError::NonUtf8Path(std_path.to_path_buf()))
}

fn new_config_builder() -> ExtConfigBuilder {
    // unwraps are if our KEYs are not strings. These are statics, so its safe.
    config::Config::builder()
        .set_default(CATALOG_KEY, CatalogKind::Rawg.as_str())
        .unwrap()
        .set_default(ENRICHMENT_KEY, EnrichmentKind::Live.as_str())
        .unwrap()
        .set_default(RAWG_API_URL_KEY, crate::catalog::rawg::DEFAULT_API_URL)
        .unwrap()
        .set_default(RAWG_API_KEY_KEY, Option::<&str>::None)
        .unwrap()
        .set_default(RAWG_PAGE_SIZE_KEY, DEFAULT_RAWG_PAGE_SIZE)
        .unwrap()
        .set_default(STEAM_API_URL_KEY, enrichment::details::DEFAULT_API_URL)
        .unwrap()
        .set_default(HLTB_BASE_URL_KEY, enrichment::playtime::DEFAULT_BASE_URL)
        .unwrap()
        .set_default(USER_AGENT_KEY, enrichment::fetch::BROWSER_USER_AGENT)
        .unwrap()
        .set_default(
            REQUEST_TIMEOUT_KEY,
            enrichment::fetch::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        )
        .unwrap()
        .set_default(CACHE_TTL_KEY, enrichment::cache::DEFAULT_TTL.as_secs())
        .unwrap()
        .set_default(CACHE_MAX_ENTRIES_KEY, enrichment::cache::DEFAULT_MAX_ENTRIES)
        .unwrap()
}

impl ConfigBuilder {
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APP)
            .ok_or(ConfigError::NoUserHome)?;
        Self::with_config_dir(dirs.config_dir())
    }

    /// A builder that looks for `gamedex.toml` in `config_dir` instead of the
    /// user's config directory.
    pub fn with_config_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            load_environment: false,
            config_path: None,
            config_dir: camino_path(config_dir)?.to_path_buf(),
            config_builder: new_config_builder(),
        })
    }

    /// Should we load configuration from the environment?
    pub fn load_environment(mut self, load_environment: bool) -> Self {
        self.load_environment = load_environment;
        self
    }

    fn set_override<T: Into<config::Value>>(
        mut self,
        key: &str,
        value: Option<T>,
    ) -> Result<Self, ConfigError> {
        self.config_builder = self.config_builder.set_override_option(key, value)?;
        Ok(self)
    }

    pub fn config_file(mut self, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        self.config_path = config_file
            .map(|p| camino_path(p).map(|p| p.to_path_buf()))
            .transpose()?;
        Ok(self)
    }

    pub fn catalog(self, catalog: Option<CatalogKind>) -> Result<Self, ConfigError> {
        self.set_override(CATALOG_KEY, catalog.map(CatalogKind::as_str))
    }

    pub fn enrichment(self, enrichment: Option<EnrichmentKind>) -> Result<Self, ConfigError> {
        self.set_override(ENRICHMENT_KEY, enrichment.map(EnrichmentKind::as_str))
    }

    pub fn rawg_api_key(self, key: Option<&str>) -> Result<Self, ConfigError> {
        self.set_override(RAWG_API_KEY_KEY, key)
    }

    pub fn hltb_base_url(self, url: Option<&str>) -> Result<Self, ConfigError> {
        self.set_override(HLTB_BASE_URL_KEY, url)
    }

    pub fn steam_api_url(self, url: Option<&str>) -> Result<Self, ConfigError> {
        self.set_override(STEAM_API_URL_KEY, url)
    }

    pub fn request_timeout(self, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        self.set_override(REQUEST_TIMEOUT_KEY, timeout.map(|t| t.as_secs()))
    }

    pub fn build(mut self) -> Result<GamedexConfig, ConfigError> {
        let cfg_file = self
            .config_path
            .clone()
            .unwrap_or_else(|| self.config_dir.join(DEFAULT_CONFIG_FILE));

        if cfg_file.exists() {
            log::debug!("loading config file: {}", cfg_file);
            self.config_builder = self
                .config_builder
                .add_source(config::File::from(cfg_file.as_std_path()));
        } else if self.config_path.is_some() {
            log::warn!("config file {} does not exist, skipping", cfg_file);
        }

        if self.load_environment {
            self.config_builder = self
                .config_builder
                .add_source(config::Environment::with_prefix(APP_CAPS))
        }

        let gamedex_cfg = GamedexConfig {
            inner: self.config_builder.build()?,
        };
        log::trace!("{:#?}", gamedex_cfg);
        Ok(gamedex_cfg)
    }
}

#[derive(Debug, Clone)]
pub struct GamedexConfig {
    inner: config::Config,
}

impl GamedexConfig {
    fn get_u64(&self, key: &'static str) -> Result<u64, ConfigError> {
        let value = self.inner.get_int(key)?;
        u64::try_from(value).map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })
    }

    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.inner
            .get::<Option<String>>(key)
            .ok()
            .flatten()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn catalog(&self) -> Result<CatalogKind, ConfigError> {
        self.inner.get_string(CATALOG_KEY)?.parse()
    }

    pub fn enrichment(&self) -> Result<EnrichmentKind, ConfigError> {
        self.inner.get_string(ENRICHMENT_KEY)?.parse()
    }

    pub fn rawg_api_url(&self) -> Result<String, ConfigError> {
        Ok(self.inner.get_string(RAWG_API_URL_KEY)?)
    }

    /// RAWG key, if one is configured. Blank values count as missing.
    pub fn rawg_api_key(&self) -> Option<String> {
        self.get_non_empty(RAWG_API_KEY_KEY)
    }

    pub fn rawg_page_size(&self) -> Result<u64, ConfigError> {
        self.get_u64(RAWG_PAGE_SIZE_KEY)
    }

    pub fn steam_api_url(&self) -> Result<String, ConfigError> {
        Ok(self.inner.get_string(STEAM_API_URL_KEY)?)
    }

    pub fn hltb_base_url(&self) -> Result<String, ConfigError> {
        Ok(self.inner.get_string(HLTB_BASE_URL_KEY)?)
    }

    pub fn user_agent(&self) -> Result<String, ConfigError> {
        Ok(self.inner.get_string(USER_AGENT_KEY)?)
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        self.get_u64(REQUEST_TIMEOUT_KEY).map(Duration::from_secs)
    }

    pub fn cache_ttl(&self) -> Result<Duration, ConfigError> {
        self.get_u64(CACHE_TTL_KEY).map(Duration::from_secs)
    }

    pub fn cache_max_entries(&self) -> Result<u64, ConfigError> {
        self.get_u64(CACHE_MAX_ENTRIES_KEY)
    }
}
