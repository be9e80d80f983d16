//! Ingest orchestrator.
//!
//! Runs one upload through the state machine in [`crate::state`]. Each
//! transition is a separate method so it can be driven and tested on its
//! own through [`IngestOrchestrator::advance`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, Instrument};

use tubely_db::VideoStore;
use tubely_media::{
    remux_output_path, CommandTool, Inspector, MediaTool, Remuxer, StagingStore,
};
use tubely_storage::{object_url, KeyDeriver, ObjectStore};

use crate::config::{IngestConfig, ACCEPTED_CONTENT_TYPE};
use crate::error::{IngestError, IngestResult};
use crate::logging::IngestLogger;
use crate::metrics;
use crate::state::{
    Committed, Failed, IngestContext, IngestRequest, IngestState, Inspected, KeyDerived, Received,
    Remuxed, Staged, Uploaded, Validated,
};

/// Drives uploads from request body to committed record.
pub struct IngestOrchestrator {
    config: IngestConfig,
    videos: Arc<dyn VideoStore>,
    objects: Arc<dyn ObjectStore>,
    staging: StagingStore,
    remuxer: Remuxer,
    inspector: Inspector,
    keys: KeyDeriver,
}

impl IngestOrchestrator {
    /// Create an orchestrator using the configured FFmpeg and FFprobe binaries.
    pub fn new(
        config: IngestConfig,
        videos: Arc<dyn VideoStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        let ffmpeg: Arc<dyn MediaTool> =
            Arc::new(CommandTool::new(&config.ffmpeg_path).with_timeout(config.tool_timeout));
        let ffprobe: Arc<dyn MediaTool> =
            Arc::new(CommandTool::new(&config.ffprobe_path).with_timeout(config.tool_timeout));

        Self {
            staging: StagingStore::new(&config.staging_dir),
            remuxer: Remuxer::new(ffmpeg),
            inspector: Inspector::new(ffprobe),
            keys: KeyDeriver::default(),
            config,
            videos,
            objects,
        }
    }

    /// Replace the remuxer.
    pub fn with_remuxer(mut self, remuxer: Remuxer) -> Self {
        self.remuxer = remuxer;
        self
    }

    /// Replace the inspector.
    pub fn with_inspector(mut self, inspector: Inspector) -> Self {
        self.inspector = inspector;
        self
    }

    /// Replace the key deriver.
    pub fn with_key_deriver(mut self, keys: KeyDeriver) -> Self {
        self.keys = keys;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run one upload to completion.
    ///
    /// Every local file created along the way is gone by the time this
    /// returns, on success and on failure alike.
    pub async fn ingest(&self, request: IngestRequest<'_>) -> IngestResult<Committed> {
        let logger = IngestLogger::new(&request.video_id, &request.caller);
        let span = logger.create_span();

        async move {
            let start = Instant::now();
            logger.log_start();

            let mut state = IngestState::new(request);
            loop {
                state = match self.advance(state).await {
                    IngestState::Committed(committed) => {
                        let elapsed = start.elapsed();
                        metrics::record_ingest_success(elapsed);
                        logger.log_completion(committed.key.as_str(), elapsed.as_millis());
                        return Ok(committed);
                    }
                    IngestState::Failed(Failed { phase, error }) => {
                        let client_fault = error.is_client_error();
                        metrics::record_ingest_failure(phase, client_fault);
                        logger.log_failure(phase, &error.to_string(), client_fault);
                        return Err(error);
                    }
                    next => {
                        logger.log_phase(next.phase());
                        next
                    }
                };
            }
        }
        .instrument(span)
        .await
    }

    /// Perform a single transition. Terminal states are returned unchanged.
    pub async fn advance<'a>(&self, state: IngestState<'a>) -> IngestState<'a> {
        let Some(target) = state.phase().next() else {
            return state;
        };

        let next = match state {
            IngestState::Received(s) => self.validate(s).await.map(IngestState::Validated),
            IngestState::Validated(s) => self.stage(s).await.map(IngestState::Staged),
            IngestState::Staged(s) => self.remux(s).await.map(IngestState::Remuxed),
            IngestState::Remuxed(s) => self.inspect(s).await.map(IngestState::Inspected),
            IngestState::Inspected(s) => self.derive_key(s).map(IngestState::KeyDerived),
            IngestState::KeyDerived(s) => self.upload(s).await.map(IngestState::Uploaded),
            IngestState::Uploaded(s) => self.commit(s).await.map(IngestState::Committed),
            terminal @ (IngestState::Committed(_) | IngestState::Failed(_)) => return terminal,
        };

        next.unwrap_or_else(|error| {
            IngestState::Failed(Failed {
                phase: target,
                error,
            })
        })
    }

    async fn validate<'a>(&self, s: Received<'a>) -> IngestResult<Validated<'a>> {
        let IngestRequest {
            video_id,
            caller,
            body,
        } = s.request;

        let content_type = body
            .content_type()
            .ok_or_else(|| IngestError::InvalidContentType("missing".to_string()))?
            .to_string();
        let essence = media_type_essence(&content_type)?;
        if essence != ACCEPTED_CONTENT_TYPE {
            return Err(IngestError::UnsupportedMediaType(essence));
        }

        let record = self
            .videos
            .get_video(&video_id)
            .await
            .map_err(IngestError::Lookup)?
            .ok_or(IngestError::VideoNotFound(video_id))?;

        if !record.is_owned_by(&caller) {
            return Err(IngestError::NotOwner {
                video_id,
                user_id: caller,
            });
        }

        Ok(Validated {
            ctx: IngestContext {
                record,
                content_type,
            },
            body,
        })
    }

    async fn stage<'a>(&self, s: Validated<'a>) -> IngestResult<Staged> {
        let staged = self
            .staging
            .stage(s.body.into_stream())
            .await
            .map_err(IngestError::Staging)?;

        metrics::record_staged_bytes(staged.size());
        debug!("Staged {} bytes at {}", staged.size(), staged.path().display());

        Ok(Staged { ctx: s.ctx, staged })
    }

    async fn remux(&self, s: Staged) -> IngestResult<Remuxed> {
        let Staged { ctx, mut staged } = s;

        // Track before running so a partial output is removed too.
        staged.track(remux_output_path(staged.path()));
        let output = self
            .remuxer
            .remux(staged.path())
            .await
            .map_err(IngestError::Remux)?;
        let remuxed = staged.track(output);

        Ok(Remuxed {
            ctx,
            staged,
            remuxed,
        })
    }

    async fn inspect(&self, s: Remuxed) -> IngestResult<Inspected> {
        let descriptor = self
            .inspector
            .inspect(&s.remuxed)
            .await
            .map_err(IngestError::Probe)?;

        debug!(
            "Inspected {}: {}x{} {}",
            s.remuxed.display(),
            descriptor.width,
            descriptor.height,
            descriptor.orientation
        );

        Ok(Inspected {
            ctx: s.ctx,
            staged: s.staged,
            remuxed: s.remuxed,
            descriptor,
        })
    }

    fn derive_key(&self, s: Inspected) -> IngestResult<KeyDerived> {
        let key = self.keys.derive(s.descriptor.orientation)?;

        Ok(KeyDerived {
            ctx: s.ctx,
            staged: s.staged,
            remuxed: s.remuxed,
            descriptor: s.descriptor,
            key,
        })
    }

    async fn upload(&self, s: KeyDerived) -> IngestResult<Uploaded> {
        self.objects
            .put_object(
                &self.config.bucket,
                s.key.as_str(),
                &s.remuxed,
                &s.ctx.content_type,
            )
            .await
            .map_err(IngestError::Upload)?;

        debug!("Uploaded {} to bucket {}", s.key, self.config.bucket);

        Ok(Uploaded {
            ctx: s.ctx,
            staged: s.staged,
            descriptor: s.descriptor,
            key: s.key,
        })
    }

    async fn commit(&self, s: Uploaded) -> IngestResult<Committed> {
        let Uploaded {
            ctx,
            mut staged,
            descriptor,
            key,
        } = s;

        let url = object_url(&self.config.bucket, &self.config.region, &key);
        let record = ctx.record.with_video_url(url);

        if let Err(source) = self.videos.update_video(&record).await {
            metrics::record_orphaned_object();
            error!(
                bucket = %self.config.bucket,
                key = %key,
                "Metadata update failed after upload, object is orphaned: {}", source
            );
            return Err(IngestError::Commit { key, source });
        }

        staged.release().await;

        Ok(Committed {
            record,
            key,
            descriptor,
        })
    }
}

/// Lowercased `type/subtype` of a declared content type, parameters dropped.
pub fn media_type_essence(content_type: &str) -> IngestResult<String> {
    let invalid = || IngestError::InvalidContentType(content_type.to_string());

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let (kind, subtype) = essence.split_once('/').ok_or_else(invalid)?;
    let is_token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    if !is_token(kind) || !is_token(subtype) {
        return Err(invalid());
    }

    Ok(essence)
}
