use std::time::Duration;

use gamedex_core::{CatalogEntry, SteamAppId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{CatalogError, CatalogSearch};

pub const DEFAULT_API_URL: &str = "https://api.rawg.io/api/games";
const UNKNOWN_YEAR: &str = "TBA";

static STEAM_APP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"store\.steampowered\.com/app/(\d+)").expect("static regex must compile")
});

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<RawgGame>>,
}

#[derive(Debug, Deserialize)]
struct RawgGame {
    id: i64,
    name: String,
    #[serde(default)]
    metacritic: Option<i32>,
    #[serde(default)]
    released: Option<String>,
    #[serde(default)]
    background_image: Option<String>,
    #[serde(default)]
    genres: Option<Vec<RawgGenre>>,
    #[serde(default)]
    stores: Option<Vec<RawgStoreLink>>,
}

#[derive(Debug, Deserialize)]
struct RawgGenre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawgStoreLink {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    store: Option<RawgStore>,
}

#[derive(Debug, Deserialize)]
struct RawgStore {
    #[serde(default)]
    name: Option<String>,
}

fn release_year(released: Option<&str>) -> String {
    match released {
        Some(date) if date.chars().count() >= 4 => date.chars().take(4).collect(),
        _ => UNKNOWN_YEAR.to_owned(),
    }
}

fn steam_app_id(stores: &[RawgStoreLink]) -> Option<SteamAppId> {
    stores
        .iter()
        .filter_map(|s| s.url.as_deref())
        .filter_map(|url| STEAM_APP_URL.captures(url))
        .find_map(|c| c[1].parse::<u32>().ok().and_then(SteamAppId::new))
}

fn into_entry(game: RawgGame) -> CatalogEntry {
    let stores = game.stores.unwrap_or_default();
    let store_url = stores
        .iter()
        .find(|s| {
            s.store
                .as_ref()
                .and_then(|st| st.name.as_deref())
                .map_or(false, |n| n.trim().eq_ignore_ascii_case("steam"))
        })
        .and_then(|s| s.url.clone());
    CatalogEntry {
        id: game.id,
        title: game.name,
        score: game.metacritic,
        release_year: Some(release_year(game.released.as_deref())),
        genres: game
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|g| g.name)
            .collect(),
        background_image: game.background_image,
        app_id: steam_app_id(&stores),
        store_url,
    }
}

/// Parse a RAWG `/games` search response.
pub fn parse_search_response(body: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp
        .results
        .unwrap_or_default()
        .into_iter()
        .map(into_entry)
        .collect())
}

#[derive(Debug, Clone)]
pub struct RawgCatalog {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    page_size: u64,
}

impl RawgCatalog {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        page_size: u64,
        timeout: Duration,
    ) -> Result<RawgCatalog, CatalogError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(RawgCatalog {
            http,
            api_url: api_url.into(),
            api_key,
            page_size,
        })
    }
}

#[async_trait::async_trait]
impl CatalogSearch for RawgCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
        let page_size = self.page_size.to_string();
        let mut params = vec![("search", query), ("page_size", page_size.as_str())];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        } else {
            log::warn!("no rawg api key configured, request will likely be rejected");
        }

        let resp = self.http.get(&self.api_url).query(&params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                query: query.to_owned(),
            });
        }
        let body = resp.text().await?;
        let entries = parse_search_response(&body)?;
        log::debug!("rawg returned {} results for {:?}", entries.len(), query);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use enrichment::test_util::{StubResponse, StubServer};

    use super::*;

    const WITCHER: &str = r#"{
        "count": 2,
        "results": [
            {
                "id": 3328,
                "name": "The Witcher 3: Wild Hunt",
                "metacritic": 92,
                "released": "2015-05-18",
                "background_image": "https://media.rawg.io/media/games/618/witcher.jpg",
                "genres": [{"id": 4, "name": "Action"}, {"id": 5, "name": "RPG"}],
                "stores": [
                    {"url": "https://www.gog.com/game/the_witcher_3", "store": {"name": "GOG"}},
                    {"url": "https://store.steampowered.com/app/292030/", "store": {"name": " Steam "}}
                ]
            },
            {
                "id": 99,
                "name": "Witcher Fan Game",
                "metacritic": null,
                "released": null,
                "genres": null,
                "stores": null
            }
        ]
    }"#;

    #[test]
    fn maps_results() {
        let entries = parse_search_response(WITCHER).unwrap();
        assert_eq!(entries.len(), 2);

        let witcher = &entries[0];
        assert_eq!(witcher.id, 3328);
        assert_eq!(witcher.score, Some(92));
        assert_eq!(witcher.release_year.as_deref(), Some("2015"));
        assert_eq!(witcher.genres, vec!["Action", "RPG"]);
        assert_eq!(
            witcher.store_url.as_deref(),
            Some("https://store.steampowered.com/app/292030/")
        );
        assert_eq!(witcher.app_id.map(|a| a.get()), Some(292030));

        let fan = &entries[1];
        assert_eq!(fan.score, None);
        assert_eq!(fan.release_year.as_deref(), Some("TBA"));
        assert!(fan.genres.is_empty());
        assert_eq!(fan.store_url, None);
        assert_eq!(fan.app_id, None);
    }

    #[test]
    fn app_id_comes_from_any_store_link() {
        let stores = vec![RawgStoreLink {
            url: Some("https://store.steampowered.com/app/1091500/Cyberpunk_2077/".to_owned()),
            store: None,
        }];
        assert_eq!(steam_app_id(&stores).map(|a| a.get()), Some(1091500));
        assert_eq!(steam_app_id(&[]), None);
    }

    #[test]
    fn unusable_app_id_moves_on_to_next_store() {
        let link = |url: &str| RawgStoreLink {
            url: Some(url.to_owned()),
            store: None,
        };
        let stores = vec![
            link("https://store.steampowered.com/app/99999999999/Broken/"),
            link("https://store.steampowered.com/app/0/"),
            link("https://store.steampowered.com/app/292030/"),
        ];
        assert_eq!(steam_app_id(&stores).map(|a| a.get()), Some(292030));
        assert_eq!(steam_app_id(&stores[..2]), None);
    }

    #[test]
    fn short_release_dates() {
        assert_eq!(release_year(Some("2020-12-10")), "2020");
        assert_eq!(release_year(Some("20")), "TBA");
        assert_eq!(release_year(None), "TBA");
    }

    #[test]
    fn empty_and_broken_responses() {
        assert!(parse_search_response(r#"{"count": 0}"#).unwrap().is_empty());
        assert!(matches!(
            parse_search_response("not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn search_sends_query_size_and_key() {
        let server = StubServer::start([("/api/games", StubResponse::ok(WITCHER))])
            .await
            .unwrap();
        let catalog = RawgCatalog::new(
            server.url("/api/games"),
            Some("secret".to_owned()),
            5,
            Duration::from_secs(5),
        )
        .unwrap();

        let entries = catalog.search("the witcher").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].app_id.map(|a| a.get()), Some(292030));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.path(), "/api/games");
        assert_eq!(req.query_param("search").as_deref(), Some("the witcher"));
        assert_eq!(req.query_param("page_size").as_deref(), Some("5"));
        assert_eq!(req.query_param("key").as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn search_without_key_omits_it() {
        let server = StubServer::start([("/api/games", StubResponse::ok(r#"{"results": []}"#))])
            .await
            .unwrap();
        let catalog =
            RawgCatalog::new(server.url("/api/games"), None, 10, Duration::from_secs(5)).unwrap();
        assert!(catalog.search("portal").await.unwrap().is_empty());
        assert_eq!(server.requests()[0].query_param("key"), None);
    }

    #[tokio::test]
    async fn error_status_is_reported_with_query() {
        let server = StubServer::start([(
            "/api/games",
            StubResponse::status(401, r#"{"error": "invalid key"}"#),
        )])
        .await
        .unwrap();
        let catalog = RawgCatalog::new(
            server.url("/api/games"),
            Some("bad".to_owned()),
            10,
            Duration::from_secs(5),
        )
        .unwrap();
        match catalog.search("portal").await {
            Err(CatalogError::Status { status, query }) => {
                assert_eq!(status, 401);
                assert_eq!(query, "portal");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
