//! Temporary staging of upload bodies.
//!
//! A [`StagedFile`] owns the temp copy of an upload plus every file derived
//! from it (the remux output). All of them are deleted when the staged file is
//! released or dropped, whichever comes first, so every exit path of an ingest
//! (success, error, or a cancelled request future) cleans up after itself.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Prefix of staged file names.
pub const STAGED_PREFIX: &str = "tubely-upload-";

/// Suffix of staged file names.
pub const STAGED_SUFFIX: &str = ".mp4";

/// Read-once upload body with its declared content type.
pub struct UploadBody<'a> {
    content_type: Option<String>,
    stream: BoxStream<'a, io::Result<Bytes>>,
}

impl<'a> UploadBody<'a> {
    /// Wrap a byte stream.
    pub fn new<S>(content_type: Option<String>, stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'a,
    {
        Self {
            content_type,
            stream: stream.boxed(),
        }
    }

    /// Body backed by an in-memory buffer.
    pub fn from_bytes(content_type: Option<String>, data: impl Into<Bytes>) -> UploadBody<'static> {
        UploadBody::new(content_type, stream::iter([Ok(data.into())]))
    }

    /// Content type declared by the client.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Take the byte stream.
    pub fn into_stream(self) -> BoxStream<'a, io::Result<Bytes>> {
        self.stream
    }
}

impl fmt::Debug for UploadBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadBody")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Creates staged files in a directory.
#[derive(Debug, Clone)]
pub struct StagingStore {
    dir: PathBuf,
}

impl StagingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding staged files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy a whole stream into a new, uniquely named temp file.
    ///
    /// The file is flushed, synced and closed before this returns. If the
    /// stream fails, or this future is dropped mid-copy, the partial file is
    /// removed.
    pub async fn stage(&self, mut body: BoxStream<'_, io::Result<Bytes>>) -> MediaResult<StagedFile> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let named = tempfile::Builder::new()
            .prefix(STAGED_PREFIX)
            .suffix(STAGED_SUFFIX)
            .tempfile_in(&self.dir)?;
        let (file, temp_path) = named.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(MediaError::BodyRead)?;
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let path = temp_path.keep().map_err(|e| MediaError::Io(e.error))?;
        debug!(size, "Staged upload at {}", path.display());

        Ok(StagedFile::new(path, size))
    }
}

/// Exclusively owned temp file plus the files derived from it.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    derived: Vec<PathBuf>,
    size: u64,
    released: bool,
}

impl StagedFile {
    fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            derived: Vec::new(),
            size,
            released: false,
        }
    }

    /// Path of the staged upload.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes copied in.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Register a derived file for deletion on release.
    ///
    /// Register before the file is created so a partial write is cleaned too.
    pub fn track(&mut self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        if !self.derived.contains(&path) {
            self.derived.push(path.clone());
        }
        path
    }

    /// Derived files registered so far.
    pub fn derived(&self) -> &[PathBuf] {
        &self.derived
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete the staged file and every derived file.
    ///
    /// Best effort: failures are logged, never returned. Calling this more
    /// than once is a no-op.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }

        for path in self.derived.iter().chain(std::iter::once(&self.path)) {
            log_removal(path, tokio::fs::remove_file(path).await);
        }
        self.released = true;
    }
}

impl Drop for StagedFile {
    // Synchronous fallback for files never released, e.g. a failed or
    // cancelled ingest.
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for path in self.derived.iter().chain(std::iter::once(&self.path)) {
            log_removal(path, std::fs::remove_file(path));
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove temp file {}: {}", path.display(), e),
    }
}
