//! Ingest error types.

use thiserror::Error;

use tubely_db::DbError;
use tubely_media::MediaError;
use tubely_models::{StorageKey, UserId, VideoId};
use tubely_storage::{KeyError, StorageError};

pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Video not found: {0}")]
    VideoNotFound(VideoId),

    #[error("User {user_id} does not own video {video_id}")]
    NotOwner { video_id: VideoId, user_id: UserId },

    #[error("Metadata lookup failed: {0}")]
    Lookup(#[source] DbError),

    #[error("Staging failed: {0}")]
    Staging(#[source] MediaError),

    #[error("Remux failed: {0}")]
    Remux(#[source] MediaError),

    #[error("Probe failed: {0}")]
    Probe(#[source] MediaError),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(#[from] KeyError),

    #[error("Upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("Metadata update failed after upload, object {key} is orphaned: {source}")]
    Commit {
        key: StorageKey,
        #[source]
        source: DbError,
    },
}

impl IngestError {
    /// True if the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        match self {
            IngestError::InvalidContentType(_)
            | IngestError::UnsupportedMediaType(_)
            | IngestError::VideoNotFound(_)
            | IngestError::NotOwner { .. } => true,
            IngestError::Staging(e) => e.is_body_read(),
            _ => false,
        }
    }

    /// Key of an uploaded object no record points at, if this failure left one.
    pub fn orphaned_key(&self) -> Option<&StorageKey> {
        match self {
            IngestError::Commit { key, .. } => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tubely_models::Orientation;

    #[test]
    fn test_client_errors() {
        assert!(IngestError::UnsupportedMediaType("image/png".into()).is_client_error());
        assert!(IngestError::VideoNotFound(VideoId::new()).is_client_error());
        assert!(IngestError::Staging(MediaError::BodyRead(io::Error::other("reset"))).is_client_error());

        assert!(!IngestError::Staging(MediaError::Io(io::Error::other("disk full"))).is_client_error());
        assert!(!IngestError::Remux(MediaError::NoStreams).is_client_error());
    }

    #[test]
    fn test_orphaned_key() {
        let key = StorageKey::for_video(Orientation::Landscape, "tok");
        let err = IngestError::Commit {
            key: key.clone(),
            source: DbError::request_failed("db down"),
        };

        assert_eq!(err.orphaned_key(), Some(&key));
        assert!(err.to_string().contains("video/landscape/tok.mp4"));
        assert!(IngestError::Upload(StorageError::upload_failed("503")).orphaned_key().is_none());
    }
}
