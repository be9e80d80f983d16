//! Ingest configuration.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// The only content type accepted for upload.
pub const ACCEPTED_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Ingest pipeline configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Destination bucket
    pub bucket: String,
    /// Region of the destination bucket
    pub region: String,
    /// Directory for staged uploads and remux output
    pub staging_dir: PathBuf,
    /// FFprobe binary
    pub ffprobe_path: String,
    /// FFmpeg binary
    pub ffmpeg_path: String,
    /// Upper bound on a single probe or remux run
    pub tool_timeout: Duration,
}

impl IngestConfig {
    /// Config with defaults for everything but the destination.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            staging_dir: std::env::temp_dir(),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            tool_timeout: Duration::from_secs(600),
        }
    }

    /// Set the staging directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bucket = std::env::var("S3_BUCKET").map_err(|_| ConfigError::Missing("S3_BUCKET"))?;
        let region = std::env::var("S3_REGION").map_err(|_| ConfigError::Missing("S3_REGION"))?;

        let mut config = Self::new(bucket, region);

        if let Ok(dir) = std::env::var("STAGING_DIR") {
            config.staging_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("FFPROBE_PATH") {
            config.ffprobe_path = path;
        }
        if let Ok(path) = std::env::var("FFMPEG_PATH") {
            config.ffmpeg_path = path;
        }
        if let Ok(value) = std::env::var("TOOL_TIMEOUT_SECS") {
            let secs: u64 = value.parse().map_err(|_| ConfigError::Invalid {
                name: "TOOL_TIMEOUT_SECS",
                value: value.clone(),
            })?;
            config.tool_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
