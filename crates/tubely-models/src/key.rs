//! Object storage key model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media::Orientation;

/// Key prefix for ingested videos.
pub const VIDEO_KEY_PREFIX: &str = "video";

/// File extension of ingested videos.
pub const VIDEO_KEY_EXTENSION: &str = "mp4";

/// Key identifying an uploaded object in the destination bucket.
///
/// Format: `video/{orientation}/{token}.mp4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Build a video key from an orientation and an already-encoded token.
    pub fn for_video(orientation: Orientation, token: &str) -> Self {
        Self(format!(
            "{}/{}/{}.{}",
            VIDEO_KEY_PREFIX,
            orientation.as_str(),
            token,
            VIDEO_KEY_EXTENSION
        ))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
