//! Round endpoints: start, status, clip, guess, reveal
//!
//! `start` resolves a song before the round exists, so it may take as long
//! as the resolution tiers do. Clip preparation continues in the background
//! and clients poll `status` until it reports ready or an error.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use super::required_param;
use crate::error::{ApiError, ApiResult};
use crate::models::{ClipState, RoundStatus};
use crate::services::{guess, ClipJob};
use crate::AppState;

pub const DEFAULT_CLIP_LENGTH: u32 = 30;
pub const MIN_CLIP_LENGTH: u32 = 1;
pub const MAX_CLIP_LENGTH: u32 = 300;

#[derive(Debug, Deserialize)]
pub struct StartParams {
    pub lang: Option<String>,
    #[serde(rename = "clipLength")]
    pub clip_length: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub id: String,
    pub clip_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RoundParams {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub id: Option<String>,
    #[serde(default)]
    pub guess: String,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct RevealResponse {
    pub title: String,
    pub artist: String,
    pub youtube: String,
}

/// Requested clip length: default when absent, clamped when numeric
pub fn parse_clip_length(raw: Option<&str>) -> ApiResult<u32> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(DEFAULT_CLIP_LENGTH),
        Some(raw) => raw,
    };
    let seconds: i64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("clipLength must be a number, got {:?}", raw)))?;
    Ok(seconds.clamp(MIN_CLIP_LENGTH as i64, MAX_CLIP_LENGTH as i64) as u32)
}

/// GET /start?lang=&clipLength=
pub async fn start_round(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> ApiResult<Json<StartResponse>> {
    let language = required_param(params.lang, "lang")?.to_lowercase();
    let clip_length = parse_clip_length(params.clip_length.as_deref())?;

    tracing::info!(language = %language, clip_length, "Starting round");
    let song = state.pipeline.resolve(&language, clip_length).await;

    let id = state
        .rounds
        .create(song.title, song.artist, song.source_ref.clone(), clip_length)
        .await;
    state.preparer.spawn(ClipJob {
        round_id: id.clone(),
        source_ref: song.source_ref,
        clip_length_seconds: clip_length,
    });

    tracing::info!(round_id = %id, tier = song.tier, "Round started");
    Ok(Json(StartResponse {
        clip_url: format!("/clip?id={}", id),
        id,
    }))
}

/// GET /status?id=
pub async fn round_status(
    State(state): State<AppState>,
    Query(params): Query<RoundParams>,
) -> ApiResult<Json<RoundStatus>> {
    let id = required_param(params.id, "id")?;
    let round = state.rounds.get(&id).await?;
    Ok(Json(round.status()))
}

/// GET /clip?id=
///
/// Never waits for preparation: 503 while pending, 500 with the diagnostic
/// once failed.
pub async fn round_clip(
    State(state): State<AppState>,
    Query(params): Query<RoundParams>,
) -> ApiResult<Response> {
    let id = required_param(params.id, "id")?;
    let round = state.rounds.get(&id).await?;

    let clip_path = match round.state() {
        ClipState::Pending => return Err(ApiError::NotReady("clip not ready".to_string())),
        ClipState::Failed { detail } => return Err(ApiError::ClipFailed(detail.clone())),
        ClipState::Ready { clip_path } => clip_path.clone(),
    };

    let file = tokio::fs::File::open(&clip_path).await?;
    let body = axum::body::Body::from_stream(ReaderStream::new(file));
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], body).into_response())
}

/// POST /guess
pub async fn submit_guess(
    State(state): State<AppState>,
    Json(request): Json<GuessRequest>,
) -> ApiResult<Json<GuessResponse>> {
    let id = required_param(request.id, "id")?;
    let round = state.rounds.get(&id).await?;

    let correct = guess::evaluate(&request.guess, &round.title, &round.artist);
    tracing::debug!(round_id = %id, correct, "Guess evaluated");
    Ok(Json(GuessResponse { correct }))
}

/// GET /reveal?id=
pub async fn reveal_round(
    State(state): State<AppState>,
    Query(params): Query<RoundParams>,
) -> ApiResult<Json<RevealResponse>> {
    let id = required_param(params.id, "id")?;
    let round = state.rounds.get(&id).await?;

    Ok(Json(RevealResponse {
        title: round.title,
        artist: round.artist,
        youtube: round.source_ref,
    }))
}

/// Build round routes
pub fn round_routes() -> Router<AppState> {
    Router::new()
        .route("/start", get(start_round))
        .route("/status", get(round_status))
        .route("/clip", get(round_clip))
        .route("/guess", post(submit_guess))
        .route("/reveal", get(reveal_round))
}
