//! Video ingest pipeline.
//!
//! Drives one upload from the HTTP body to a committed video record:
//! validate → stage → remux → inspect → derive key → upload → commit.
//! The pipeline is an explicit state machine ([`IngestState`]) advanced one
//! transition at a time by [`IngestOrchestrator::advance`].

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod state;

pub use config::{ConfigError, IngestConfig, ACCEPTED_CONTENT_TYPE};
pub use error::{IngestError, IngestResult};
pub use logging::IngestLogger;
pub use orchestrator::{media_type_essence, IngestOrchestrator};
pub use state::{
    Committed, Failed, IngestContext, IngestPhase, IngestRequest, IngestState, Inspected,
    KeyDerived, Received, Remuxed, Staged, Uploaded, Validated,
};
