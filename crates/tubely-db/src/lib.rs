//! Video metadata store.
//!
//! This crate provides:
//! - The `VideoStore` contract the ingest pipeline reads and commits through
//! - An in-memory repository for development and tests

pub mod error;
pub mod repos;

pub use error::{DbError, DbResult};
pub use repos::{InMemoryVideoStore, VideoStore};
