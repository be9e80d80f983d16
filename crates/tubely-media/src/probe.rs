//! FFprobe stream inspection.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use tubely_models::MediaDescriptor;

use crate::error::{MediaError, MediaResult};
use crate::tool::MediaTool;

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Derives a [`MediaDescriptor`] from a local file using an FFprobe-compatible tool.
#[derive(Clone)]
pub struct Inspector {
    tool: Arc<dyn MediaTool>,
}

impl Inspector {
    pub fn new(tool: Arc<dyn MediaTool>) -> Self {
        Self { tool }
    }

    /// FFprobe arguments requesting JSON stream-level output.
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_streams".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Probe a file and classify its geometry.
    pub async fn inspect(&self, path: impl AsRef<Path>) -> MediaResult<MediaDescriptor> {
        let path = path.as_ref();
        let stdout = self.tool.run(&Self::probe_args(path)).await?;
        let descriptor = parse_probe_output(&stdout)?;

        debug!(
            width = descriptor.width,
            height = descriptor.height,
            orientation = %descriptor.orientation,
            "Probed {}",
            path.display()
        );
        Ok(descriptor)
    }
}

/// Parse FFprobe JSON output.
///
/// The first reported stream is authoritative; files whose first stream is
/// audio or carries no geometry classify as `Other`.
pub fn parse_probe_output(stdout: &[u8]) -> MediaResult<MediaDescriptor> {
    let probe: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| MediaError::malformed(e.to_string()))?;

    let stream = probe.streams.first().ok_or(MediaError::NoStreams)?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            warn!(
                codec_type = stream.codec_type.as_deref().unwrap_or("unknown"),
                "First stream has no geometry"
            );
            (0, 0)
        }
    };

    Ok(MediaDescriptor::new(width, height))
}
