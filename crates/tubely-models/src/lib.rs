//! Shared data models for the Tubely backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and the identifiers that address them
//! - Media descriptors and orientation classification
//! - Object storage keys

pub mod key;
pub mod media;
pub mod video;

// Re-export common types
pub use key::StorageKey;
pub use media::{MediaDescriptor, Orientation};
pub use video::{IdParseError, UserId, VideoId, VideoRecord};
