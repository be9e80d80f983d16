//! Video upload handler.

use std::io;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use futures_util::TryStreamExt;
use tracing::info;

use tubely_ingest::IngestRequest;
use tubely_media::UploadBody;
use tubely_models::VideoRecord;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::videos::parse_video_id;
use crate::state::AppState;

/// Multipart field carrying the video.
pub const UPLOAD_FIELD: &str = "video";

/// Upload the media for an existing video record.
///
/// The `video` field is streamed straight to disk; the response is the
/// record with its `video_url` set.
pub async fn upload_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    user: Result<AuthUser, ApiError>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<VideoRecord>> {
    let video_id = parse_video_id(&video_id)?;
    let user = user?;
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let body = UploadBody::new(content_type, field.map_err(io::Error::other));

        let committed = state
            .ingest
            .ingest(IngestRequest {
                video_id,
                caller: user.user_id,
                body,
            })
            .await?;

        info!(
            video_id = %video_id,
            key = %committed.key,
            orientation = %committed.descriptor.orientation,
            "Video uploaded"
        );

        return Ok(Json(committed.record));
    }

    Err(ApiError::bad_request(format!("Missing '{}' field", UPLOAD_FIELD)))
}
