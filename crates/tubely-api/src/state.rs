//! Application state.

use std::sync::Arc;

use tubely_db::{InMemoryVideoStore, VideoStore};
use tubely_ingest::{IngestConfig, IngestOrchestrator};
use tubely_storage::{ObjectStore, S3Client};

use crate::auth::JwtVerifier;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub videos: Arc<dyn VideoStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub ingest: Arc<IngestOrchestrator>,
    pub jwt: Arc<JwtVerifier>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let ingest_config = IngestConfig::from_env()?;
        let storage = S3Client::from_env().await?;

        let videos: Arc<dyn VideoStore> = Arc::new(InMemoryVideoStore::new());
        let objects: Arc<dyn ObjectStore> = Arc::new(storage);
        let ingest = IngestOrchestrator::new(ingest_config, Arc::clone(&videos), Arc::clone(&objects));

        Ok(Self::from_parts(config, videos, objects, ingest))
    }

    /// Assemble state from already-built components.
    pub fn from_parts(
        config: ApiConfig,
        videos: Arc<dyn VideoStore>,
        objects: Arc<dyn ObjectStore>,
        ingest: IngestOrchestrator,
    ) -> Self {
        let jwt = JwtVerifier::new(&config.jwt_secret);

        Self {
            config,
            videos,
            objects,
            ingest: Arc::new(ingest),
            jwt: Arc::new(jwt),
        }
    }

    /// Bucket uploads are written to.
    pub fn bucket(&self) -> &str {
        &self.ingest.config().bucket
    }
}
