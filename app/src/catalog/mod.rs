//! Primary catalog search, the source of the entries that get enriched.

use gamedex_core::CatalogEntry;

pub mod mock;
pub mod rawg;

pub use self::{mock::MockCatalog, rawg::RawgCatalog};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned status {status} for {query:?}")]
    Status { status: u16, query: String },
    #[error("unable to parse catalog response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogError>;
}
