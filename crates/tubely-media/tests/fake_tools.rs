//! Inspector and remuxer behavior against scripted tools.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use tubely_media::{Inspector, MediaError, MediaResult, MediaTool, Remuxer};
use tubely_models::Orientation;

/// What a scripted tool does when run.
enum Script {
    /// Print this to stdout and exit 0.
    Stdout(&'static str),
    /// Copy the `-i` input to the last argument and exit 0.
    CopyInputToOutput,
    /// Exit 0 without writing anything.
    Nothing,
    /// Exit 1.
    Fail,
}

struct ScriptedTool {
    script: Script,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTool {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTool for ScriptedTool {
    fn program(&self) -> &str {
        "scripted"
    }

    async fn run(&self, args: &[String]) -> MediaResult<Vec<u8>> {
        self.calls.lock().unwrap().push(args.to_vec());
        match self.script {
            Script::Stdout(out) => Ok(out.as_bytes().to_vec()),
            Script::CopyInputToOutput => {
                let input = args
                    .iter()
                    .position(|a| a == "-i")
                    .map(|i| PathBuf::from(&args[i + 1]))
                    .unwrap();
                let output = PathBuf::from(args.last().unwrap());
                std::fs::copy(input, output)?;
                Ok(Vec::new())
            }
            Script::Nothing => Ok(Vec::new()),
            Script::Fail => Err(MediaError::tool_failed(
                "scripted",
                "exited with non-zero status",
                Some("moov atom not found".to_string()),
                Some(1),
            )),
        }
    }
}

#[tokio::test]
async fn inspector_classifies_first_stream() {
    let tool = ScriptedTool::new(Script::Stdout(
        r#"{"streams":[{"codec_type":"video","width":1920,"height":1080}]}"#,
    ));
    let inspector = Inspector::new(tool.clone());

    let descriptor = inspector.inspect("/tmp/video.mp4").await.unwrap();

    assert_eq!(descriptor.orientation, Orientation::Landscape);
    assert_eq!(tool.calls().len(), 1);
    assert_eq!(tool.calls()[0].last().unwrap(), "/tmp/video.mp4");
}

#[tokio::test]
async fn inspector_propagates_tool_failure() {
    let inspector = Inspector::new(ScriptedTool::new(Script::Fail));

    let err = inspector.inspect("/tmp/video.mp4").await.unwrap_err();
    assert!(matches!(err, MediaError::ToolFailed { exit_code: Some(1), .. }));
}

#[tokio::test]
async fn remuxer_writes_next_to_input_and_keeps_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("upload.mp4");
    std::fs::write(&input, b"mp4 bytes").unwrap();

    let tool = ScriptedTool::new(Script::CopyInputToOutput);
    let output = Remuxer::new(tool.clone()).remux(&input).await.unwrap();

    assert_eq!(output, dir.path().join("upload.mp4.processing"));
    assert_eq!(std::fs::read(&output).unwrap(), b"mp4 bytes");
    assert_eq!(std::fs::read(&input).unwrap(), b"mp4 bytes");

    let args = &tool.calls()[0];
    assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    assert!(args.windows(2).any(|w| w[0] == "-movflags" && w[1] == "faststart"));
}

#[tokio::test]
async fn remuxer_requires_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("upload.mp4");
    std::fs::write(&input, b"mp4 bytes").unwrap();

    let err = Remuxer::new(ScriptedTool::new(Script::Nothing))
        .remux(&input)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::MissingOutput(path) if path == dir.path().join("upload.mp4.processing")));
}

#[tokio::test]
async fn remuxer_propagates_tool_failure() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("upload.mp4");
    std::fs::write(&input, b"mp4 bytes").unwrap();

    let err = Remuxer::new(ScriptedTool::new(Script::Fail))
        .remux(&input)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::ToolFailed { .. }));
}
