use serde::{Deserialize, Serialize};

use super::AppId;

// ============================================================================
// Steam Web API Types
// ============================================================================

/// Envelope used by the `IPlayerService` endpoints: `{"response": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default = "Option::default")]
    pub response: Option<T>,
}

/// `GetOwnedGames` / `GetRecentlyPlayedGames` body. Private profiles return `{}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiGameList<T> {
    #[serde(default = "Vec::new")]
    pub games: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedGame {
    pub appid: AppId,
    #[serde(default)]
    pub name: Option<String>,
    /// Lifetime playtime in minutes
    #[serde(default)]
    pub playtime_forever: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGame {
    pub appid: AppId,
    #[serde(default)]
    pub name: Option<String>,
    /// Playtime over the last two weeks in minutes
    #[serde(default)]
    pub playtime_2weeks: u64,
    #[serde(default)]
    pub playtime_forever: u64,
}

/// `GetFriendList` response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFriendListResponse {
    #[serde(default)]
    pub friendslist: Option<ApiFriendList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFriendList {
    #[serde(default)]
    pub friends: Vec<Friend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub steamid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_games_response() {
        let json = r#"{"response":{"game_count":2,"games":[
            {"appid":570,"name":"Dota 2","playtime_forever":1200},
            {"appid":730,"playtime_forever":0}
        ]}}"#;
        let parsed: ApiEnvelope<ApiGameList<OwnedGame>> = serde_json::from_str(json).unwrap();
        let games = parsed.response.unwrap().games;
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].name.as_deref(), Some("Dota 2"));
        assert_eq!(games[1].name, None);
    }

    #[test]
    fn test_private_profile_has_no_games() {
        let parsed: ApiEnvelope<ApiGameList<RecentGame>> =
            serde_json::from_str(r#"{"response":{}}"#).unwrap();
        assert!(parsed.response.unwrap().games.is_empty());
    }

    #[test]
    fn test_missing_response_key() {
        let parsed: ApiEnvelope<ApiGameList<RecentGame>> = serde_json::from_str("{}").unwrap();
        assert!(parsed.response.is_none());
    }

    #[test]
    fn test_friend_list_response() {
        let json = r#"{"friendslist":{"friends":[
            {"steamid":"76561197960265731","relationship":"friend","friend_since":0}
        ]}}"#;
        let parsed: ApiFriendListResponse = serde_json::from_str(json).unwrap();
        let friends = parsed.friendslist.unwrap().friends;
        assert_eq!(friends[0].steamid, "76561197960265731");
    }
}
