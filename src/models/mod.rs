use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod steam;

pub use steam::{Friend, OwnedGame, RecentGame};

/// Steam application id
pub type AppId = u64;

/// Raw catalog row as stored; every column is nullable in the store
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct CatalogRow {
    pub appid: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub genres: Option<String>,
}

/// A game in the catalog. Immutable once the index is built.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    pub id: AppId,
    pub name: String,
    pub description: String,
    /// Comma-joined genre tags
    pub genres: String,
}

impl CatalogItem {
    /// Text the term-vector space is fitted on
    pub fn text(&self) -> String {
        format!("{} {}", self.description, self.genres)
    }
}

/// One weighted activity row (e.g. normalized recent playtime)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub appid: AppId,
    pub weight: f64,
}

impl ActivityEntry {
    pub fn new(appid: AppId, weight: f64) -> Self {
        Self { appid, weight }
    }
}

/// A single ranked game returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub appid: AppId,
    pub name: String,
    pub score: f64,
}

/// Per-appid playtime aggregate for the user and their friends
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaytimeRow {
    pub appid: AppId,
    pub my_playtime: f64,
    pub friends_playtime: f64,
    pub friends_count: u32,
}

/// Bookkeeping from collecting friends' activity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureStats {
    pub friends_requested: usize,
    pub friends_accessible: usize,
    pub friends_with_recent: usize,
    pub friends_failed: usize,
    pub friend_rows: usize,
    pub my_recent_count: usize,
    pub friend_limit_effective: usize,
}

/// Feature-side metadata attached to Steam-backed recommendations
#[derive(Debug, Clone, Serialize)]
pub struct FeatureMeta {
    #[serde(flatten)]
    pub stats: FeatureStats,
    pub feats_rows: usize,
    pub used_library_fallback: bool,
    pub my_recent_rows: usize,
    pub friends_recent_rows: usize,
}

/// Summary of the signals computed for one scoring call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalMeta {
    pub candidate_count: usize,
    pub has_my_profile: bool,
    pub has_friends_profile: bool,
    pub friends_played_candidates: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureMeta>,
    pub signals: SignalMeta,
    pub generated_at: DateTime<Utc>,
}

/// Response body for both recommendation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub results: Vec<Recommendation>,
    pub meta: RecommendationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_text_joins_description_and_genres() {
        let item = CatalogItem {
            id: 10,
            name: "Counter-Strike".to_string(),
            description: "Team shooter".to_string(),
            genres: "Action,FPS".to_string(),
        };
        assert_eq!(item.text(), "Team shooter Action,FPS");
    }

    #[test]
    fn test_activity_entry_serde() {
        let entry: ActivityEntry = serde_json::from_str(r#"{"appid":570,"weight":0.5}"#).unwrap();
        assert_eq!(entry, ActivityEntry::new(570, 0.5));
    }

    #[test]
    fn test_feature_meta_flattens_stats() {
        let meta = FeatureMeta {
            stats: FeatureStats {
                friends_requested: 3,
                ..Default::default()
            },
            feats_rows: 2,
            used_library_fallback: true,
            my_recent_rows: 2,
            friends_recent_rows: 2,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["friends_requested"], 3);
        assert_eq!(json["used_library_fallback"], true);
    }
}
