pub mod app;
pub mod catalog;
pub mod search_manager;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] app::ConfigError),
    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),
    #[error(transparent)]
    Source(#[from] gamedex_core::SourceError),
}
