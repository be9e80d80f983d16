//! Axum HTTP API server.
//!
//! This crate provides:
//! - The multipart video upload endpoint driving the ingest pipeline
//! - Video record create/read endpoints
//! - Bearer JWT authentication
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{AuthUser, JwtVerifier};
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
