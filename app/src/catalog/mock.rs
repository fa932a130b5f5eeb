use gamedex_core::{CatalogEntry, SteamAppId};

use super::{CatalogError, CatalogSearch};

/// Fixed two-game catalog for running the pipeline without an API key.
#[derive(Debug, Default, Clone)]
pub struct MockCatalog;

fn entry(
    id: i64,
    title: &str,
    score: i32,
    year: &str,
    image: &str,
    genres: &[&str],
    app_id: u32,
) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_owned(),
        score: Some(score),
        release_year: Some(year.to_owned()),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        background_image: Some(image.to_owned()),
        store_url: Some(format!("https://store.steampowered.com/app/{}", app_id)),
        app_id: SteamAppId::new(app_id),
    }
}

#[async_trait::async_trait]
impl CatalogSearch for MockCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        log::info!("using mock catalog for {:?}", query);
        Ok(vec![
            entry(
                1,
                "The Witcher 3: Wild Hunt",
                92,
                "2015",
                "https://media.rawg.io/media/games/618/618c2031a07bbff6b4f611f10b6bcdbc.jpg",
                &["RPG", "Action"],
                292030,
            ),
            entry(
                2,
                "Cyberpunk 2077",
                86,
                "2020",
                "https://media.rawg.io/media/games/26d/26d4437715bee60138dab4a7c8c59c6b.jpg",
                &["RPG", "Action", "FPS"],
                1091500,
            ),
        ])
    }
}
