use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ActivityEntry, AppId, RecommendationResponse},
    routes::AppState,
    services::{
        recommendations::{self, RecommendationParams},
        recommender::BlendWeights,
    },
};

const DEFAULT_K: i64 = 10;
const DEFAULT_W_CONTENT: f64 = 0.6;
const DEFAULT_W_PLAYTIME: f64 = 0.4;
const DEFAULT_W_SOCIAL: f64 = 0.0;

/// Raw query parameters; numbers are parsed by hand so bad input maps to `InvalidInput`
#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    steam_id: Option<String>,
    k: Option<String>,
    w_content: Option<String>,
    w_playtime: Option<String>,
    w_social: Option<String>,
}

fn parse_param<T: std::str::FromStr>(value: Option<&str>, default: T) -> AppResult<T> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::InvalidInput("Invalid numeric parameter.".to_string())),
    }
}

impl RecommendQuery {
    fn into_params(self) -> AppResult<RecommendationParams> {
        let steam_id = self
            .steam_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::InvalidInput("steam_id required".to_string()))?;

        Ok(RecommendationParams {
            steam_id,
            k: parse_param(self.k.as_deref(), DEFAULT_K)?,
            weights: BlendWeights::new(
                parse_param(self.w_content.as_deref(), DEFAULT_W_CONTENT)?,
                parse_param(self.w_playtime.as_deref(), DEFAULT_W_PLAYTIME)?,
                parse_param(self.w_social.as_deref(), DEFAULT_W_SOCIAL)?,
            ),
        })
    }
}

/// Handler for Steam-backed recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let params = query.into_params()?;

    tracing::info!(
        request_id = %request_id,
        steam_id = %params.steam_id,
        k = params.k,
        provider = state.steam.name(),
        "Processing recommendation request"
    );

    let response = recommendations::get_recommendations(
        &state.recommender,
        state.steam.clone(),
        state.friend_fetch,
        params,
    )
    .await?;

    Ok(Json(response))
}

fn default_k() -> i64 {
    DEFAULT_K
}

/// Activity supplied directly by the caller
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub owned: Vec<AppId>,
    #[serde(default)]
    pub my_activity: Vec<ActivityEntry>,
    #[serde(default)]
    pub friends_activity: Vec<ActivityEntry>,
    #[serde(default = "default_k")]
    pub k: i64,
    #[serde(default)]
    pub weights: BlendWeights,
}

/// Handler that scores caller-supplied activity without calling Steam
pub async fn score(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    tracing::info!(
        request_id = %request_id,
        my_activity = request.my_activity.len(),
        friends_activity = request.friends_activity.len(),
        owned = request.owned.len(),
        "Processing score request"
    );

    let owned: HashSet<AppId> = request.owned.into_iter().collect();
    let response = recommendations::score_activity(
        &state.recommender,
        &owned,
        &request.my_activity,
        &request.friends_activity,
        request.weights,
        request.k,
    )?;

    Ok(Json(response))
}
