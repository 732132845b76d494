/// Steam Web API provider
///
/// Endpoints used:
/// 1. Library: /IPlayerService/GetOwnedGames/v1/
/// 2. Recent activity: /IPlayerService/GetRecentlyPlayedGames/v1/
/// 3. Social graph: /ISteamUser/GetFriendList/v1/
///
/// Private profiles answer the player endpoints with an empty body, which is
/// returned as an empty list. Responses are cached in Redis.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        steam::{ApiEnvelope, ApiFriendListResponse, ApiGameList},
        Friend, OwnedGame, RecentGame,
    },
    services::providers::SteamProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

const OWNED_CACHE_TTL: u64 = 3600; // 1 hour
const RECENT_CACHE_TTL: u64 = 600; // 10 minutes
const FRIENDS_CACHE_TTL: u64 = 3600; // 1 hour
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct SteamClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl SteamClient {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::InvalidInput("Missing Steam API key".to_string()));
        }

        let http_client = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Issues a GET against a Web API method and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{}/", self.api_url, method);

        let response = self
            .http_client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(method = %method, status = %status, "Steam API request failed");
            return Err(AppError::ExternalApi(format!(
                "Steam API {} returned status {}: {}",
                method, status, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                method = %method,
                error = %e,
                response = %response_text,
                "Failed to deserialize Steam response"
            );
            AppError::ExternalApi(format!("Failed to parse Steam response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl SteamProvider for SteamClient {
    async fn owned_games(&self, steam_id: &str) -> AppResult<Vec<OwnedGame>> {
        cached!(
            self.cache,
            CacheKey::OwnedGames(steam_id.to_string()),
            OWNED_CACHE_TTL,
            async move {
                let body: ApiEnvelope<ApiGameList<OwnedGame>> = self
                    .get_json(
                        "IPlayerService/GetOwnedGames/v1",
                        &[
                            ("steamid", steam_id.to_string()),
                            ("include_appinfo", "true".to_string()),
                            ("include_played_free_games", "true".to_string()),
                        ],
                    )
                    .await?;

                let games = body.response.map(|r| r.games).unwrap_or_default();
                tracing::info!(steam_id = %steam_id, games = games.len(), "Fetched owned games");
                Ok::<_, AppError>(games)
            }
        )
    }

    async fn recently_played(&self, steam_id: &str, count: u32) -> AppResult<Vec<RecentGame>> {
        cached!(
            self.cache,
            CacheKey::RecentGames {
                steam_id: steam_id.to_string(),
                count,
            },
            RECENT_CACHE_TTL,
            async move {
                let body: ApiEnvelope<ApiGameList<RecentGame>> = self
                    .get_json(
                        "IPlayerService/GetRecentlyPlayedGames/v1",
                        &[
                            ("steamid", steam_id.to_string()),
                            ("count", count.to_string()),
                        ],
                    )
                    .await?;

                let games = body.response.map(|r| r.games).unwrap_or_default();
                tracing::debug!(steam_id = %steam_id, games = games.len(), "Fetched recent games");
                Ok::<_, AppError>(games)
            }
        )
    }

    async fn friends(&self, steam_id: &str) -> AppResult<Vec<Friend>> {
        cached!(
            self.cache,
            CacheKey::Friends(steam_id.to_string()),
            FRIENDS_CACHE_TTL,
            async move {
                let body: ApiFriendListResponse = self
                    .get_json(
                        "ISteamUser/GetFriendList/v1",
                        &[
                            ("steamid", steam_id.to_string()),
                            ("relationship", "friend".to_string()),
                        ],
                    )
                    .await?;

                let friends = body.friendslist.map(|l| l.friends).unwrap_or_default();
                tracing::info!(steam_id = %steam_id, friends = friends.len(), "Fetched friend list");
                Ok::<_, AppError>(friends)
            }
        )
    }

    fn name(&self) -> &'static str {
        "steam"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_redis_client;

    #[tokio::test]
    async fn test_new_rejects_blank_api_key() {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client);

        let result = SteamClient::new(cache, "  ".to_string(), "https://example.com".to_string());
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_new_trims_trailing_slash() {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client);

        let steam = SteamClient::new(
            cache,
            "key".to_string(),
            "https://api.steampowered.com/".to_string(),
        )
        .unwrap();
        assert_eq!(steam.api_url, "https://api.steampowered.com");
        assert_eq!(steam.name(), "steam");

        drop(steam);
        handle.shutdown().await;
    }
}
