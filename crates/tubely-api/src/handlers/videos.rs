//! Video record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use tubely_models::{VideoId, VideoRecord};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Maximum title length.
const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
}

/// Parse a video ID path segment.
pub(crate) fn parse_video_id(raw: &str) -> ApiResult<VideoId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid video ID"))
}

/// Create a draft video record owned by the caller.
pub async fn create_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVideoRequest>,
) -> ApiResult<(StatusCode, Json<VideoRecord>)> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }

    let record = VideoRecord::new(user.user_id, title, request.description);
    state.videos.create_video(&record).await?;

    info!(video_id = %record.id, user_id = %user.user_id, "Created video record");

    Ok((StatusCode::CREATED, Json(record)))
}

/// Get one of the caller's videos.
///
/// Videos owned by someone else are reported as missing.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = parse_video_id(&video_id)?;

    let record = state
        .videos
        .get_video(&video_id)
        .await?
        .filter(|r| r.is_owned_by(&user.user_id))
        .ok_or_else(|| ApiError::not_found(format!("Video {}", video_id)))?;

    Ok(Json(record))
}

/// List the caller's videos, newest first.
pub async fn list_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<VideoListResponse>> {
    let videos = state.videos.list_videos(&user.user_id).await?;
    Ok(Json(VideoListResponse { videos }))
}
