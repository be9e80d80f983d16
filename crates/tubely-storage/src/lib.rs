//! S3 object storage.
//!
//! This crate provides:
//! - The `ObjectStore` contract the ingest pipeline uploads through
//! - An S3 implementation backed by the AWS SDK
//! - Storage key derivation from orientation plus a random token
//! - Public object URL construction

pub mod client;
pub mod error;
pub mod key;

pub use client::{ObjectStore, S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use key::{object_url, KeyDeriver, KeyError, OsTokenSource, TokenSource, TOKEN_BYTES};
