//! Storage key derivation.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use thiserror::Error;

use tubely_models::{Orientation, StorageKey};

/// Random bytes per storage key token.
pub const TOKEN_BYTES: usize = 32;

/// The random source could not produce a token.
#[derive(Debug, Error)]
#[error("Random source unavailable: {0}")]
pub struct KeyError(pub String);

/// Source of cryptographically secure random bytes.
pub trait TokenSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), KeyError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenSource;

impl TokenSource for OsTokenSource {
    fn fill(&self, buf: &mut [u8]) -> Result<(), KeyError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| KeyError(e.to_string()))
    }
}

/// Maps an orientation to a fresh, collision-resistant storage key.
#[derive(Clone)]
pub struct KeyDeriver {
    source: Arc<dyn TokenSource>,
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new(Arc::new(OsTokenSource))
    }
}

impl KeyDeriver {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self { source }
    }

    /// Derive `video/{orientation}/{token}.mp4` with a token drawn for this call only.
    pub fn derive(&self, orientation: Orientation) -> Result<StorageKey, KeyError> {
        let mut buf = [0u8; TOKEN_BYTES];
        self.source.fill(&mut buf)?;
        Ok(StorageKey::for_video(orientation, &URL_SAFE_NO_PAD.encode(buf)))
    }
}

/// Public URL of an object in a virtual-hosted S3 bucket.
pub fn object_url(bucket: &str, region: &str, key: &StorageKey) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}
