//! Fakes for driving the ingest pipeline without FFmpeg, S3 or a database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use tubely_db::{DbError, DbResult, VideoStore};
use tubely_ingest::{IngestConfig, IngestOrchestrator, IngestRequest};
use tubely_media::{Inspector, MediaError, MediaResult, MediaTool, Remuxer, UploadBody};
use tubely_models::{UserId, VideoId, VideoRecord};
use tubely_storage::{
    KeyDeriver, KeyError, ObjectStore, StorageError, StorageResult, TokenSource,
};

pub const BUCKET: &str = "tubely-test";
pub const REGION: &str = "us-east-2";

/// Token produced by [`FixedTokenSource`]: 32 bytes of 0xff.
pub const TOKEN: &str = "__________________________________________8";

pub const LANDSCAPE_PROBE: &str =
    r#"{"streams":[{"index":0,"codec_type":"video","width":1920,"height":1080}]}"#;
pub const PORTRAIT_PROBE: &str =
    r#"{"streams":[{"index":0,"codec_type":"video","width":1080,"height":1920}]}"#;
pub const SQUARE_PROBE: &str =
    r#"{"streams":[{"index":0,"codec_type":"video","width":1080,"height":1080}]}"#;
pub const EMPTY_PROBE: &str = r#"{"streams":[]}"#;

pub const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake mp4 payload";

/// What a fake tool does when run.
#[derive(Clone, Copy)]
pub enum Script {
    /// Print this to stdout and exit 0.
    Stdout(&'static str),
    /// Copy the `-i` input to the last argument and exit 0.
    CopyInputToOutput,
    /// Exit 0 without writing anything.
    Nothing,
    /// Exit 1.
    Fail,
}

pub struct FakeTool {
    name: &'static str,
    script: Script,
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTool {
    pub fn new(name: &'static str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name,
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTool for FakeTool {
    fn program(&self) -> &str {
        self.name
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
                tokio::fs::copy(input, output).await?;
                Ok(Vec::new())
            }
            Script::Nothing => Ok(Vec::new()),
            Script::Fail => Err(MediaError::tool_failed(
                self.name,
                "exited with non-zero status",
                Some("Invalid data found when processing input".to_string()),
                Some(1),
            )),
        }
    }
}

/// Always yields 0xff bytes.
pub struct FixedTokenSource;

impl TokenSource for FixedTokenSource {
    fn fill(&self, buf: &mut [u8]) -> Result<(), KeyError> {
        buf.fill(0xff);
        Ok(())
    }
}

/// One recorded `put_object` call, with the file contents at upload time.
#[derive(Debug, Clone)]
pub struct PutCall {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct FakeObjectStore {
    pub fail: bool,
    puts: Mutex<Vec<PutCall>>,
}

impl FakeObjectStore {
    pub fn puts(&self) -> Vec<PutCall> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()> {
        if self.fail {
            return Err(StorageError::upload_failed("503 Slow Down"));
        }
        let body = tokio::fs::read(path).await?;
        self.puts.lock().unwrap().push(PutCall {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeVideoStore {
    pub fail_update: bool,
    records: Mutex<HashMap<VideoId, VideoRecord>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeVideoStore {
    pub fn insert(&self, record: VideoRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    pub fn record(&self, id: &VideoId) -> Option<VideoRecord> {
        self.records.lock().unwrap().get(id).cloned()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoStore for FakeVideoStore {
    async fn get_video(&self, id: &VideoId) -> DbResult<Option<VideoRecord>> {
        self.calls.lock().unwrap().push("get_video");
        Ok(self.records.lock().unwrap().get(id).cloned())
    }

    async fn update_video(&self, record: &VideoRecord) -> DbResult<()> {
        self.calls.lock().unwrap().push("update_video");
        if self.fail_update {
            return Err(DbError::request_failed("connection refused"));
        }
        self.records.lock().unwrap().insert(record.id, record.clone());
        Ok(())
    }

    async fn create_video(&self, record: &VideoRecord) -> DbResult<()> {
        self.calls.lock().unwrap().push("create_video");
        self.records.lock().unwrap().insert(record.id, record.clone());
        Ok(())
    }

    async fn list_videos(&self, user_id: &UserId) -> DbResult<Vec<VideoRecord>> {
        self.calls.lock().unwrap().push("list_videos");
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.is_owned_by(user_id))
            .cloned()
            .collect())
    }
}

pub struct Options {
    pub ffmpeg: Script,
    pub ffprobe: Script,
    pub fail_upload: bool,
    pub fail_update: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ffmpeg: Script::CopyInputToOutput,
            ffprobe: Script::Stdout(LANDSCAPE_PROBE),
            fail_upload: false,
            fail_update: false,
        }
    }
}

/// An orchestrator wired to fakes, with one video owned by `owner`.
pub struct Harness {
    pub dir: TempDir,
    pub videos: Arc<FakeVideoStore>,
    pub objects: Arc<FakeObjectStore>,
    pub ffmpeg: Arc<FakeTool>,
    pub ffprobe: Arc<FakeTool>,
    pub orchestrator: IngestOrchestrator,
    pub owner: UserId,
    pub record: VideoRecord,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(Options::default())
    }

    pub fn with(options: Options) -> Self {
        let dir = TempDir::new().unwrap();
        let config = IngestConfig::new(BUCKET, REGION).with_staging_dir(dir.path().join("staging"));

        let owner = UserId::new();
        let record = VideoRecord::new(owner, "Boots demo", "Boots in the wild");

        let videos = Arc::new(FakeVideoStore {
            fail_update: options.fail_update,
            ..Default::default()
        });
        videos.insert(record.clone());

        let objects = Arc::new(FakeObjectStore {
            fail: options.fail_upload,
            ..Default::default()
        });

        let ffmpeg = FakeTool::new("ffmpeg", options.ffmpeg);
        let ffprobe = FakeTool::new("ffprobe", options.ffprobe);

        let orchestrator = IngestOrchestrator::new(config, videos.clone(), objects.clone())
            .with_remuxer(Remuxer::new(ffmpeg.clone()))
            .with_inspector(Inspector::new(ffprobe.clone()))
            .with_key_deriver(KeyDeriver::new(Arc::new(FixedTokenSource)));

        Self {
            dir,
            videos,
            objects,
            ffmpeg,
            ffprobe,
            orchestrator,
            owner,
            record,
        }
    }

    pub fn request(&self, content_type: Option<&str>) -> IngestRequest<'static> {
        self.request_as(self.owner, content_type)
    }

    pub fn request_as(&self, caller: UserId, content_type: Option<&str>) -> IngestRequest<'static> {
        IngestRequest {
            video_id: self.record.id,
            caller,
            body: UploadBody::from_bytes(content_type.map(str::to_string), VIDEO_BYTES),
        }
    }

    /// Files left in the staging directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.dir.path().join("staging")) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => panic!("cannot list staging dir: {e}"),
        }
    }
}

/// A body that yields one chunk and then fails.
pub fn broken_body() -> UploadBody<'static> {
    UploadBody::new(
        Some("video/mp4".to_string()),
        futures_util::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset")),
        ]),
    )
}
