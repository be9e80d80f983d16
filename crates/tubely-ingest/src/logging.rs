//! Structured ingest logging.
//!
//! Every line an upload emits carries the video id and the caller, so one
//! upload can be followed through the pipeline.

use tracing::{error, info, warn, Span};

use tubely_models::{UserId, VideoId};

use crate::state::IngestPhase;

/// Logger bound to a single upload.
#[derive(Debug, Clone)]
pub struct IngestLogger {
    video_id: String,
    user_id: String,
}

impl IngestLogger {
    pub fn new(video_id: &VideoId, user_id: &UserId) -> Self {
        Self {
            video_id: video_id.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Log the start of an upload.
    pub fn log_start(&self) {
        info!(
            video_id = %self.video_id,
            user_id = %self.user_id,
            "Ingest started"
        );
    }

    /// Log that the pipeline reached a phase.
    pub fn log_phase(&self, phase: IngestPhase) {
        info!(
            video_id = %self.video_id,
            user_id = %self.user_id,
            phase = phase.as_str(),
            "Ingest progress: {}", phase
        );
    }

    /// Log a rejected or failed upload.
    ///
    /// Client faults are warnings, everything else is an error.
    pub fn log_failure(&self, phase: IngestPhase, message: &str, client_fault: bool) {
        if client_fault {
            warn!(
                video_id = %self.video_id,
                user_id = %self.user_id,
                phase = phase.as_str(),
                "Ingest rejected: {}", message
            );
        } else {
            error!(
                video_id = %self.video_id,
                user_id = %self.user_id,
                phase = phase.as_str(),
                "Ingest failed: {}", message
            );
        }
    }

    /// Log the completion of an upload.
    pub fn log_completion(&self, key: &str, elapsed_ms: u128) {
        info!(
            video_id = %self.video_id,
            user_id = %self.user_id,
            key = %key,
            elapsed_ms = elapsed_ms as u64,
            "Ingest completed"
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Create a tracing span for this upload.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "ingest",
            video_id = %self.video_id,
            user_id = %self.user_id
        )
    }
}
