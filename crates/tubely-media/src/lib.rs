#![deny(unreachable_patterns)]
//! FFmpeg CLI wrappers for the ingest pipeline.
//!
//! This crate provides:
//! - A `MediaTool` capability over external media binaries
//! - FFprobe stream inspection and orientation classification
//! - Fast-start remuxing with FFmpeg (stream copy, no re-encode)
//! - Temporary staging of upload bodies with guaranteed cleanup

pub mod command;
pub mod error;
pub mod probe;
pub mod remux;
pub mod staging;
pub mod tool;

pub use command::FfmpegCommand;
pub use error::{MediaError, MediaResult};
pub use probe::{parse_probe_output, Inspector};
pub use remux::{remux_output_path, Remuxer, REMUX_SUFFIX};
pub use staging::{StagedFile, StagingStore, UploadBody};
pub use tool::{CommandTool, MediaTool};
