//! External media tool capability.
//!
//! The probe and remux steps never spawn processes directly; they go through
//! [`MediaTool`], so tests can substitute fakes for `ffprobe` and `ffmpeg`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Maximum stderr bytes kept on a tool failure.
const MAX_STDERR_BYTES: usize = 4096;

/// A one-shot external media tool.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Name of the tool, for logs and errors.
    fn program(&self) -> &str;

    /// Run the tool to completion and return its stdout.
    ///
    /// A non-zero exit status is an error.
    async fn run(&self, args: &[String]) -> MediaResult<Vec<u8>>;
}

/// Runs a binary as a subprocess.
///
/// The child is killed if the future is dropped, so an aborted request never
/// leaves an orphaned `ffmpeg` behind.
#[derive(Debug, Clone)]
pub struct CommandTool {
    program: PathBuf,
    name: String,
    timeout: Option<Duration>,
}

impl CommandTool {
    /// Create a tool for a binary name or path.
    pub fn new(program: impl AsRef<Path>) -> Self {
        let program = program.as_ref().to_path_buf();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| program.to_string_lossy().to_string());
        Self {
            program,
            name,
            timeout: None,
        }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the binary, failing if it is not installed.
    pub fn check(&self) -> MediaResult<PathBuf> {
        which::which(&self.program).map_err(|_| MediaError::ToolNotFound(self.name.clone()))
    }
}

#[async_trait]
impl MediaTool for CommandTool {
    fn program(&self) -> &str {
        &self.name
    }

    async fn run(&self, args: &[String]) -> MediaResult<Vec<u8>> {
        let program = self.check()?;
        debug!("Running {}: {}", self.name, args.join(" "));

        let start = Instant::now();
        let child = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(MediaError::Timeout {
                        program: self.name.clone(),
                        secs: timeout.as_secs(),
                    })
                }
            },
            None => child.await?,
        };

        histogram!("tubely_tool_duration_seconds", "tool" => self.name.clone())
            .record(start.elapsed().as_secs_f64());

        if !output.status.success() {
            return Err(MediaError::tool_failed(
                &self.name,
                "exited with non-zero status",
                Some(truncate_stderr(&output.stderr)),
                output.status.code(),
            ));
        }

        Ok(output.stdout)
    }
}

fn truncate_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= MAX_STDERR_BYTES {
        return text.to_string();
    }
    let mut end = MAX_STDERR_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
