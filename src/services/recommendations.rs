use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        ActivityEntry, AppId, FeatureMeta, OwnedGame, RecommendationMeta, RecommendationResponse,
    },
    services::{
        activity::build_recent_playtime_features,
        providers::SteamProvider,
        recommender::{BlendWeights, Recommender, ScoringRequest},
    },
};

/// Limits applied when collecting friends' activity
#[derive(Debug, Clone, Copy)]
pub struct FriendFetchSettings {
    pub friend_limit: usize,
    pub max_workers: usize,
}

/// Request-boundary inputs for a Steam-backed recommendation
#[derive(Debug, Clone)]
pub struct RecommendationParams {
    pub steam_id: String,
    /// Coerced to at least 1
    pub k: i64,
    /// Rescaled to sum to 1 before scoring when their total is positive
    pub weights: BlendWeights,
}

/// Rejects weights the blender cannot use meaningfully
pub fn validate_weights(weights: &BlendWeights) -> AppResult<()> {
    for (name, value) in [
        ("alpha", weights.alpha),
        ("beta", weights.beta),
        ("gamma", weights.gamma),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Weight {} must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

pub fn coerce_k(k: i64) -> usize {
    usize::try_from(k.max(1)).unwrap_or(usize::MAX)
}

/// Divides each value by the column maximum; all zeros when the maximum is not positive
fn normalize_by_max(values: impl Iterator<Item = f64> + Clone) -> Vec<f64> {
    let max = values.clone().fold(0.0_f64, f64::max);
    if max > 0.0 {
        values.map(|v| v / max).collect()
    } else {
        values.map(|_| 0.0).collect()
    }
}

/// Substitute profile from the library when there is no recent activity.
///
/// Games with lifetime playtime are weighted by `playtime_forever / max`. If
/// nothing in the library has been played, every owned game gets weight 1.
pub fn library_fallback(owned: &[OwnedGame]) -> Vec<ActivityEntry> {
    let mut seen = HashSet::new();
    let unique: Vec<&OwnedGame> = owned.iter().filter(|g| seen.insert(g.appid)).collect();

    let played: Vec<&OwnedGame> = unique
        .iter()
        .copied()
        .filter(|g| g.playtime_forever > 0)
        .collect();

    if played.is_empty() {
        return unique
            .iter()
            .map(|g| ActivityEntry::new(g.appid, 1.0))
            .collect();
    }

    let weights = normalize_by_max(played.iter().map(|g| g.playtime_forever as f64));
    played
        .iter()
        .zip(weights)
        .map(|(g, w)| ActivityEntry::new(g.appid, w))
        .collect()
}

/// Generates recommendations for a Steam account
///
/// Pipeline:
/// 1. Validate and rescale weights, coerce k
/// 2. Fetch the library (owned games are never recommended)
/// 3. Build recent playtime features for the user and their friends
/// 4. Fall back to lifetime playtime when the user has no recent activity
/// 5. Score and rank the remaining catalog
pub async fn get_recommendations(
    recommender: &Recommender,
    provider: Arc<dyn SteamProvider>,
    settings: FriendFetchSettings,
    params: RecommendationParams,
) -> AppResult<RecommendationResponse> {
    let start = Instant::now();

    validate_weights(&params.weights)?;
    let weights = params.weights.rescaled();
    let k = coerce_k(params.k);

    if params.steam_id.trim().is_empty() {
        return Err(AppError::InvalidInput("steam_id required".to_string()));
    }

    let owned_games = provider.owned_games(&params.steam_id).await?;
    let owned: HashSet<AppId> = owned_games.iter().map(|g| g.appid).collect();

    let features = build_recent_playtime_features(
        provider.clone(),
        &params.steam_id,
        settings.friend_limit,
        settings.max_workers,
    )
    .await?;

    let my_weights = normalize_by_max(features.rows.iter().map(|r| r.my_playtime));
    let friends_weights = normalize_by_max(features.rows.iter().map(|r| r.friends_playtime));

    let mut my_recent: Vec<ActivityEntry> = features
        .rows
        .iter()
        .zip(my_weights)
        .map(|(r, w)| ActivityEntry::new(r.appid, w))
        .collect();
    let friends_recent: Vec<ActivityEntry> = features
        .rows
        .iter()
        .zip(friends_weights)
        .map(|(r, w)| ActivityEntry::new(r.appid, w))
        .collect();

    let used_library_fallback = my_recent.iter().map(|e| e.weight).sum::<f64>() == 0.0;
    if used_library_fallback {
        tracing::info!(
            steam_id = %params.steam_id,
            owned = owned_games.len(),
            "No recent activity, using library playtime"
        );
        my_recent = library_fallback(&owned_games);
    }

    let scored = recommender.recommend(&ScoringRequest {
        owned: &owned,
        my_activity: &my_recent,
        friends_activity: &friends_recent,
        weights,
        k,
    });

    tracing::info!(
        steam_id = %params.steam_id,
        results = scored.results.len(),
        candidates = scored.signals.candidate_count,
        used_library_fallback,
        processing_time_ms = start.elapsed().as_millis(),
        "Recommendations generated"
    );

    Ok(RecommendationResponse {
        results: scored.results,
        meta: RecommendationMeta {
            features: Some(FeatureMeta {
                feats_rows: features.rows.len(),
                stats: features.stats,
                used_library_fallback,
                my_recent_rows: my_recent.len(),
                friends_recent_rows: friends_recent.len(),
            }),
            signals: scored.signals,
            generated_at: Utc::now(),
        },
    })
}

/// Scores caller-supplied activity directly. Weights are used as given.
pub fn score_activity(
    recommender: &Recommender,
    owned: &HashSet<AppId>,
    my_activity: &[ActivityEntry],
    friends_activity: &[ActivityEntry],
    weights: BlendWeights,
    k: i64,
) -> AppResult<RecommendationResponse> {
    validate_weights(&weights)?;

    let scored = recommender.recommend(&ScoringRequest {
        owned,
        my_activity,
        friends_activity,
        weights,
        k: coerce_k(k),
    });

    Ok(RecommendationResponse {
        results: scored.results,
        meta: RecommendationMeta {
            features: None,
            signals: scored.signals,
            generated_at: Utc::now(),
        },
    })
}
