use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{
    error::{AppError, AppResult},
    models::{AppId, FeatureStats, PlaytimeRow, RecentGame},
    services::providers::{SteamProvider, RECENT_GAMES_COUNT},
};

/// Per-appid playtime of the user and their friends over the last two weeks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaytimeFeatures {
    /// One row per appid seen in either side, sorted by appid
    pub rows: Vec<PlaytimeRow>,
    pub stats: FeatureStats,
}

/// Collects recent playtime for the user and up to `friend_limit` friends.
///
/// Friends are fetched concurrently with at most `max_workers` requests in
/// flight. A friend whose activity cannot be fetched is counted in
/// `friends_failed` and contributes nothing; only failures for the user's own
/// recent games are returned as errors.
pub async fn build_recent_playtime_features(
    provider: Arc<dyn SteamProvider>,
    steam_id: &str,
    friend_limit: usize,
    max_workers: usize,
) -> AppResult<PlaytimeFeatures> {
    let my_recent = provider.recently_played(steam_id, RECENT_GAMES_COUNT).await?;

    let friends = match provider.friends(steam_id).await {
        Ok(friends) => friends,
        Err(e) => {
            tracing::warn!(steam_id = %steam_id, error = %e, "Friend list unavailable, continuing without friends");
            Vec::new()
        }
    };

    let friend_ids: Vec<String> = friends
        .into_iter()
        .take(friend_limit)
        .map(|f| f.steamid)
        .collect();

    let mut stats = FeatureStats {
        friends_requested: friend_ids.len(),
        my_recent_count: my_recent.len(),
        friend_limit_effective: friend_limit,
        ..Default::default()
    };

    let friend_games = fetch_friends_recent(provider, friend_ids, max_workers, &mut stats).await;
    stats.friend_rows = friend_games.len();

    let mut rows: BTreeMap<AppId, PlaytimeRow> = BTreeMap::new();
    for game in &my_recent {
        let row = rows.entry(game.appid).or_insert_with(|| PlaytimeRow {
            appid: game.appid,
            ..Default::default()
        });
        row.my_playtime += game.playtime_2weeks as f64;
    }
    for game in &friend_games {
        let row = rows.entry(game.appid).or_insert_with(|| PlaytimeRow {
            appid: game.appid,
            ..Default::default()
        });
        row.friends_playtime += game.playtime_2weeks as f64;
        row.friends_count += 1;
    }

    tracing::info!(
        steam_id = %steam_id,
        rows = rows.len(),
        friends_requested = stats.friends_requested,
        friends_accessible = stats.friends_accessible,
        friends_failed = stats.friends_failed,
        "Built playtime features"
    );

    Ok(PlaytimeFeatures {
        rows: rows.into_values().collect(),
        stats,
    })
}

/// Fetches every friend's recent games through a semaphore-bounded task set
async fn fetch_friends_recent(
    provider: Arc<dyn SteamProvider>,
    friend_ids: Vec<String>,
    max_workers: usize,
    stats: &mut FeatureStats,
) -> Vec<RecentGame> {
    if friend_ids.is_empty() {
        return Vec::new();
    }

    let workers = max_workers.clamp(1, friend_ids.len());
    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    for friend_id in friend_ids {
        let provider = provider.clone();
        let permits = permits.clone();
        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            provider.recently_played(&friend_id, RECENT_GAMES_COUNT).await
        });
    }

    let mut games = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(recent)) => {
                stats.friends_accessible += 1;
                if !recent.is_empty() {
                    stats.friends_with_recent += 1;
                    games.extend(recent);
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Friend activity fetch failed");
                stats.friends_failed += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Friend activity task join error");
                stats.friends_failed += 1;
            }
        }
    }

    if stats.friends_failed > 0 {
        tracing::warn!(
            success_count = stats.friends_accessible,
            error_count = stats.friends_failed,
            "Partial friend activity fetch failure"
        );
    }

    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Friend, OwnedGame};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn recent(appid: AppId, minutes: u64) -> RecentGame {
        RecentGame {
            appid,
            name: None,
            playtime_2weeks: minutes,
            playtime_forever: minutes,
        }
    }

    /// In-memory provider; accounts missing from `recent` fail
    #[derive(Default)]
    struct FakeSteam {
        recent: HashMap<String, Vec<RecentGame>>,
        friends: Option<Vec<Friend>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SteamProvider for FakeSteam {
        async fn owned_games(&self, _steam_id: &str) -> AppResult<Vec<OwnedGame>> {
            Ok(vec![])
        }

        async fn recently_played(&self, steam_id: &str, _count: u32) -> AppResult<Vec<RecentGame>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.recent
                .get(steam_id)
                .cloned()
                .ok_or_else(|| AppError::ExternalApi("profile is private".to_string()))
        }

        async fn friends(&self, _steam_id: &str) -> AppResult<Vec<Friend>> {
            self.friends
                .clone()
                .ok_or_else(|| AppError::ExternalApi("friend list is private".to_string()))
        }

        fn name(&self) -> &'static str {
            "fake"
        }
    }

    fn friend(id: &str) -> Friend {
        Friend {
            steamid: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_merges_mine_and_friends() {
        let mut steam = FakeSteam::default();
        steam.recent.insert("me".into(), vec![recent(10, 60), recent(20, 30)]);
        steam.recent.insert("f1".into(), vec![recent(20, 100), recent(30, 5)]);
        steam.recent.insert("f2".into(), vec![recent(20, 50)]);
        steam.friends = Some(vec![friend("f1"), friend("f2")]);

        let features = build_recent_playtime_features(Arc::new(steam), "me", 30, 8)
            .await
            .unwrap();

        assert_eq!(
            features.rows,
            vec![
                PlaytimeRow { appid: 10, my_playtime: 60.0, friends_playtime: 0.0, friends_count: 0 },
                PlaytimeRow { appid: 20, my_playtime: 30.0, friends_playtime: 150.0, friends_count: 2 },
                PlaytimeRow { appid: 30, my_playtime: 0.0, friends_playtime: 5.0, friends_count: 1 },
            ]
        );
        assert_eq!(features.stats.friends_requested, 2);
        assert_eq!(features.stats.friends_accessible, 2);
        assert_eq!(features.stats.friends_with_recent, 2);
        assert_eq!(features.stats.friend_rows, 3);
        assert_eq!(features.stats.my_recent_count, 2);
    }

    #[tokio::test]
    async fn test_failed_friends_are_counted_not_fatal() {
        let mut steam = FakeSteam::default();
        steam.recent.insert("me".into(), vec![]);
        steam.recent.insert("ok".into(), vec![]);
        steam.friends = Some(vec![friend("ok"), friend("private")]);

        let features = build_recent_playtime_features(Arc::new(steam), "me", 30, 8)
            .await
            .unwrap();

        assert!(features.rows.is_empty());
        assert_eq!(features.stats.friends_accessible, 1);
        assert_eq!(features.stats.friends_with_recent, 0);
        assert_eq!(features.stats.friends_failed, 1);
    }

    #[tokio::test]
    async fn test_own_activity_failure_is_error() {
        let steam = FakeSteam::default();
        let result = build_recent_playtime_features(Arc::new(steam), "me", 30, 8).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_private_friend_list_means_no_friends() {
        let mut steam = FakeSteam::default();
        steam.recent.insert("me".into(), vec![recent(10, 60)]);

        let features =
            tokio_test::assert_ok!(build_recent_playtime_features(Arc::new(steam), "me", 30, 8).await);

        assert_eq!(features.stats.friends_requested, 0);
        assert_eq!(features.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_friend_limit_and_worker_bound() {
        let mut steam = FakeSteam::default();
        steam.recent.insert("me".into(), vec![]);
        let ids: Vec<String> = (0..10).map(|i| format!("f{}", i)).collect();
        for id in &ids {
            steam.recent.insert(id.clone(), vec![recent(1, 1)]);
        }
        steam.friends = Some(ids.iter().map(|id| friend(id)).collect());
        let steam = Arc::new(steam);

        let features = build_recent_playtime_features(steam.clone(), "me", 6, 2)
            .await
            .unwrap();

        assert_eq!(features.stats.friends_requested, 6);
        assert_eq!(features.stats.friend_limit_effective, 6);
        assert_eq!(features.rows[0].friends_count, 6);
        assert!(steam.max_in_flight.load(Ordering::SeqCst) <= 2);
    }
}
