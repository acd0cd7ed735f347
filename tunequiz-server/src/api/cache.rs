//! Song cache maintenance endpoint

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::required_param;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub songs_loaded: usize,
}

/// GET /refreshCache?lang=
///
/// Replaces the cached batch unconditionally. A curation failure leaves the
/// previous batch in place and answers 502.
pub async fn refresh_cache(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> ApiResult<Json<RefreshResponse>> {
    let language = required_param(params.lang, "lang")?.to_lowercase();
    tracing::info!(language = %language, "Song cache refresh requested");

    let songs_loaded = state.song_cache.refresh(&language).await?;

    Ok(Json(RefreshResponse {
        status: "cache refreshed".to_string(),
        songs_loaded,
    }))
}

/// Build cache routes
pub fn cache_routes() -> Router<AppState> {
    Router::new().route("/refreshCache", get(refresh_cache))
}
