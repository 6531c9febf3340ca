/// Steam Web API library provider
///
/// Fetches a user's owned games with playtime via
/// `IPlayerService/GetOwnedGames/v0001`. Private profiles come back as an empty
/// `response` object, which maps to an empty library.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::OwnedGame,
    services::providers::LibrarySource,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

const LIBRARY_CACHE_TTL: u64 = 86_400; // 1 day

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    #[serde(default)]
    response: OwnedGamesResponse,
}

#[derive(Debug, Default, Deserialize)]
struct OwnedGamesResponse {
    #[serde(default)]
    games: Vec<ApiOwnedGame>,
}

#[derive(Debug, Deserialize)]
struct ApiOwnedGame {
    appid: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    playtime_forever: u64,
    #[serde(default)]
    playtime_2weeks: u64,
}

impl From<ApiOwnedGame> for OwnedGame {
    fn from(game: ApiOwnedGame) -> Self {
        let game_id = game.appid.to_string();
        OwnedGame {
            title: game.name.unwrap_or_else(|| format!("App {}", game_id)),
            game_id,
            playtime_forever_minutes: game.playtime_forever,
            playtime_two_weeks_minutes: game.playtime_2weeks,
        }
    }
}

#[derive(Clone)]
pub struct SteamWebLibrary {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl SteamWebLibrary {
    pub fn new(cache: Cache, api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            cache,
        })
    }

    async fn call_api(&self, steam_id: &str) -> AppResult<Vec<OwnedGame>> {
        let url = format!("{}/IPlayerService/GetOwnedGames/v0001/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steam_id),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(
                steam_id = %steam_id,
                status = %status,
                "Steam owned games request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Steam Web API returned status {}",
                status
            )));
        }

        let envelope: OwnedGamesEnvelope = response.json().await?;
        let games: Vec<OwnedGame> = envelope
            .response
            .games
            .into_iter()
            .map(OwnedGame::from)
            .collect();

        tracing::info!(
            steam_id = %steam_id,
            games = games.len(),
            "Owned games fetched from Steam"
        );

        Ok(games)
    }
}

#[async_trait::async_trait]
impl LibrarySource for SteamWebLibrary {
    async fn fetch_owned_games(&self, steam_id: &str) -> AppResult<Vec<OwnedGame>> {
        cached!(
            self.cache,
            CacheKey::OwnedGames(steam_id.to_string()),
            LIBRARY_CACHE_TTL,
            self.call_api(steam_id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;
    use crate::services::providers::serve_locally;
    use axum::{routing::get, Json, Router};
    use serde_json::json;

    const STEAM_ID: &str = "76561197960287930";

    /// Cache whose Redis never answers; nothing listens on port 1
    fn unreachable_cache() -> (Cache, crate::db::CacheWriterHandle) {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        Cache::new(client)
    }

    #[test]
    fn test_owned_games_deserialization() {
        let json = r#"{
            "response": {
                "game_count": 2,
                "games": [
                    {"appid": 292030, "name": "The Witcher 3: Wild Hunt",
                     "playtime_forever": 10800, "playtime_2weeks": 900},
                    {"appid": 570, "name": "Dota 2", "playtime_forever": 42}
                ]
            }
        }"#;

        let envelope: OwnedGamesEnvelope = serde_json::from_str(json).unwrap();
        let games: Vec<OwnedGame> = envelope
            .response
            .games
            .into_iter()
            .map(OwnedGame::from)
            .collect();

        assert_eq!(
            games,
            vec![
                OwnedGame::new("292030", "The Witcher 3: Wild Hunt", 10800, 900),
                OwnedGame::new("570", "Dota 2", 42, 0),
            ]
        );
    }

    #[test]
    fn test_private_profile_is_empty_library() {
        let envelope: OwnedGamesEnvelope = serde_json::from_str(r#"{"response": {}}"#).unwrap();
        assert!(envelope.response.games.is_empty());
    }

    #[test]
    fn test_missing_name_gets_placeholder_title() {
        let game: OwnedGame = serde_json::from_str::<ApiOwnedGame>(r#"{"appid": 10}"#)
            .unwrap()
            .into();
        assert_eq!(game.title, "App 10");
        assert_eq!(game.playtime_forever_minutes, 0);
    }

    #[tokio::test]
    async fn test_redis_outage_falls_through_to_steam() {
        let router = Router::new().route(
            "/IPlayerService/GetOwnedGames/v0001/",
            get(|| async {
                Json(json!({
                    "response": {
                        "game_count": 1,
                        "games": [{"appid": 413150, "name": "Stardew Valley",
                                   "playtime_forever": 6000, "playtime_2weeks": 120}]
                    }
                }))
            }),
        );
        let api_url = serve_locally(router).await;

        let (cache, handle) = unreachable_cache();
        let library = SteamWebLibrary::new(
            cache,
            "test-key".to_string(),
            api_url,
            Duration::from_secs(5),
        )
        .unwrap();

        let games = library.fetch_owned_games(STEAM_ID).await.unwrap();
        assert_eq!(
            games,
            vec![OwnedGame::new("413150", "Stardew Valley", 6000, 120)]
        );

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_redis_outage_reports_the_steam_failure() {
        let (cache, handle) = unreachable_cache();
        let library = SteamWebLibrary::new(
            cache,
            "test-key".to_string(),
            "http://127.0.0.1:1".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();

        let error = library.fetch_owned_games(STEAM_ID).await.unwrap_err();
        assert!(
            matches!(error, AppError::HttpClient(_)),
            "expected a transport error, got {:?}",
            error
        );

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_steam_error_status_is_external_api_error() {
        let router = Router::new().route(
            "/IPlayerService/GetOwnedGames/v0001/",
            get(|| async { axum::http::StatusCode::SERVICE_UNAVAILABLE }),
        );
        let api_url = serve_locally(router).await;

        let (cache, handle) = unreachable_cache();
        let library =
            SteamWebLibrary::new(cache, "test-key".to_string(), api_url, Duration::from_secs(5))
                .unwrap();

        let error = library.fetch_owned_games(STEAM_ID).await.unwrap_err();
        assert!(matches!(error, AppError::ExternalApi(_)));

        handle.shutdown().await;
    }
}
