//! Fast-start remuxing.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::tool::MediaTool;

/// Suffix appended to the input path to name the remuxed output.
pub const REMUX_SUFFIX: &str = ".processing";

/// Output path for a remux of `input`.
pub fn remux_output_path(input: &Path) -> PathBuf {
    let mut os: OsString = input.as_os_str().to_os_string();
    os.push(REMUX_SUFFIX);
    PathBuf::from(os)
}

/// Rewrites an MP4 so its index precedes the payload, copying streams unchanged.
#[derive(Clone)]
pub struct Remuxer {
    tool: Arc<dyn MediaTool>,
}

impl Remuxer {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// FFmpeg command for a fast-start remux of `input`.
    pub fn command(input: &Path) -> FfmpegCommand {
        FfmpegCommand::new(input, remux_output_path(input))
            .stream_copy()
            .movflags("faststart")
            .format("mp4")
            .log_level("error")
    }

    /// Remux `input` and return the path of the new file.
    ///
    /// The input is left untouched. On failure a partial output may remain at
    /// [`remux_output_path`]; removing it is the caller's job.
    pub async fn remux(&self, input: impl AsRef<Path>) -> MediaResult<PathBuf> {
        let input = input.as_ref();
        let cmd = Self::command(input);

        self.tool.run(&cmd.build_args()).await?;

        let output = cmd.output().to_path_buf();
        if !tokio::fs::try_exists(&output).await? {
            return Err(MediaError::MissingOutput(output));
        }

        info!("Remuxed {} for fast start", input.display());
        Ok(output)
    }
}
