//! Ingest state machine.
//!
//! Each state owns exactly what the next transition needs. From `Staged`
//! onward that includes the [`StagedFile`] guard, so every local file the
//! pipeline creates is removed when the state is dropped, whichever way the
//! pipeline ends.

use std::fmt;
use std::path::PathBuf;

use tubely_media::{StagedFile, UploadBody};
use tubely_models::{MediaDescriptor, StorageKey, UserId, VideoId, VideoRecord};

use crate::error::IngestError;

/// One upload as it arrives from the caller.
#[derive(Debug)]
pub struct IngestRequest<'a> {
    pub video_id: VideoId,
    /// Authenticated caller
    pub caller: UserId,
    pub body: UploadBody<'a>,
}

/// What the pipeline carries forward once the request is validated.
#[derive(Debug, Clone)]
pub struct IngestContext {
    /// Record as read from the store
    pub record: VideoRecord,
    /// Content type as declared by the caller
    pub content_type: String,
}

#[derive(Debug)]
pub struct Received<'a> {
    pub request: IngestRequest<'a>,
}

#[derive(Debug)]
pub struct Validated<'a> {
    pub ctx: IngestContext,
    pub body: UploadBody<'a>,
}

#[derive(Debug)]
pub struct Staged {
    pub ctx: IngestContext,
    pub staged: StagedFile,
}

#[derive(Debug)]
pub struct Remuxed {
    pub ctx: IngestContext,
    pub staged: StagedFile,
    /// Fast-start output, tracked by `staged`
    pub remuxed: PathBuf,
}

#[derive(Debug)]
pub struct Inspected {
    pub ctx: IngestContext,
    pub staged: StagedFile,
    pub remuxed: PathBuf,
    pub descriptor: MediaDescriptor,
}

#[derive(Debug)]
pub struct KeyDerived {
    pub ctx: IngestContext,
    pub staged: StagedFile,
    pub remuxed: PathBuf,
    pub descriptor: MediaDescriptor,
    pub key: StorageKey,
}

#[derive(Debug)]
pub struct Uploaded {
    pub ctx: IngestContext,
    pub staged: StagedFile,
    pub descriptor: MediaDescriptor,
    pub key: StorageKey,
}

/// Successful end of the pipeline.
#[derive(Debug, Clone)]
pub struct Committed {
    /// Record as written, `video_url` set
    pub record: VideoRecord,
    pub key: StorageKey,
    pub descriptor: MediaDescriptor,
}

/// Failed end of the pipeline.
#[derive(Debug)]
pub struct Failed {
    /// Phase the pipeline failed to reach
    pub phase: IngestPhase,
    pub error: IngestError,
}

/// Pipeline state. `Committed` and `Failed` are terminal.
#[derive(Debug)]
pub enum IngestState<'a> {
    Received(Received<'a>),
    Validated(Validated<'a>),
    Staged(Staged),
    Remuxed(Remuxed),
    Inspected(Inspected),
    KeyDerived(KeyDerived),
    Uploaded(Uploaded),
    Committed(Committed),
    Failed(Failed),
}

impl<'a> IngestState<'a> {
    pub fn new(request: IngestRequest<'a>) -> Self {
        IngestState::Received(Received { request })
    }

    pub fn phase(&self) -> IngestPhase {
        match self {
            IngestState::Received(_) => IngestPhase::Received,
            IngestState::Validated(_) => IngestPhase::Validated,
            IngestState::Staged(_) => IngestPhase::Staged,
            IngestState::Remuxed(_) => IngestPhase::Remuxed,
            IngestState::Inspected(_) => IngestPhase::Inspected,
            IngestState::KeyDerived(_) => IngestPhase::KeyDerived,
            IngestState::Uploaded(_) => IngestPhase::Uploaded,
            IngestState::Committed(_) => IngestPhase::Committed,
            IngestState::Failed(_) => IngestPhase::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }
}

/// Fieldless mirror of [`IngestState`] for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestPhase {
    Received,
    Validated,
    Staged,
    Remuxed,
    Inspected,
    KeyDerived,
    Uploaded,
    Committed,
    Failed,
}

impl IngestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestPhase::Received => "received",
            IngestPhase::Validated => "validated",
            IngestPhase::Staged => "staged",
            IngestPhase::Remuxed => "remuxed",
            IngestPhase::Inspected => "inspected",
            IngestPhase::KeyDerived => "key_derived",
            IngestPhase::Uploaded => "uploaded",
            IngestPhase::Committed => "committed",
            IngestPhase::Failed => "failed",
        }
    }

    /// Phase the next transition leads to, `None` for terminal phases.
    pub fn next(&self) -> Option<IngestPhase> {
        match self {
            IngestPhase::Received => Some(IngestPhase::Validated),
            IngestPhase::Validated => Some(IngestPhase::Staged),
            IngestPhase::Staged => Some(IngestPhase::Remuxed),
            IngestPhase::Remuxed => Some(IngestPhase::Inspected),
            IngestPhase::Inspected => Some(IngestPhase::KeyDerived),
            IngestPhase::KeyDerived => Some(IngestPhase::Uploaded),
            IngestPhase::Uploaded => Some(IngestPhase::Committed),
            IngestPhase::Committed | IngestPhase::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for IngestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
