//! Liveness and readiness endpoints.

use std::fmt::Display;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Always answers while the process is serving.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub storage: CheckStatus,
}

/// Outcome of one dependency check.
#[derive(Serialize)]
pub struct CheckStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

impl CheckStatus {
    fn from_result<E: Display>(result: Result<(), E>, started: Instant) -> Self {
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => Self { status: "ok", error: None, latency_ms },
            Err(e) => Self { status: "error", error: Some(e.to_string()), latency_ms },
        }
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Ready once the upload bucket answers; 503 with the failing check otherwise.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let started = Instant::now();
    let storage = CheckStatus::from_result(
        state.objects.check_connectivity(state.bucket()).await,
        started,
    );

    let (code, status) = if storage.is_ok() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks { storage },
        }),
    )
}
