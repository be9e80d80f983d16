//! Video record repositories.

use std::collections::HashMap;

use async_trait::async_trait;
use metrics::counter;
use tokio::sync::RwLock;
use tracing::info;

use tubely_models::{UserId, VideoId, VideoRecord};

use crate::error::{DbError, DbResult};

/// Metadata store for video records.
///
/// Implementations provide their own concurrency control; concurrent updates
/// of the same record are last-writer-wins.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Get a video by ID.
    async fn get_video(&self, id: &VideoId) -> DbResult<Option<VideoRecord>>;

    /// Replace an existing record.
    async fn update_video(&self, record: &VideoRecord) -> DbResult<()>;

    /// Insert a new record.
    async fn create_video(&self, record: &VideoRecord) -> DbResult<()>;

    /// List a user's videos, newest first.
    async fn list_videos(&self, user_id: &UserId) -> DbResult<Vec<VideoRecord>>;
}

/// Process-local video store.
#[derive(Debug, Default)]
pub struct InMemoryVideoStore {
    videos: RwLock<HashMap<VideoId, VideoRecord>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get_video(&self, id: &VideoId) -> DbResult<Option<VideoRecord>> {
        counter!("tubely_db_reads_total").increment(1);
        Ok(self.videos.read().await.get(id).cloned())
    }

    async fn update_video(&self, record: &VideoRecord) -> DbResult<()> {
        counter!("tubely_db_writes_total").increment(1);
        let mut videos = self.videos.write().await;
        match videos.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(DbError::not_found(record.id.to_string())),
        }
    }

    async fn create_video(&self, record: &VideoRecord) -> DbResult<()> {
        counter!("tubely_db_writes_total").increment(1);
        let mut videos = self.videos.write().await;
        if videos.contains_key(&record.id) {
            return Err(DbError::AlreadyExists(record.id.to_string()));
        }
        videos.insert(record.id, record.clone());
        info!("Created video record: {}", record.id);
        Ok(())
    }

    async fn list_videos(&self, user_id: &UserId) -> DbResult<Vec<VideoRecord>> {
        counter!("tubely_db_reads_total").increment(1);
        let mut videos: Vec<VideoRecord> = self
            .videos
            .read()
            .await
            .values()
            .filter(|v| v.is_owned_by(user_id))
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}
