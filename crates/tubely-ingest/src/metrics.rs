//! Ingest metrics.

use std::time::Duration;

use metrics::{counter, histogram};

use crate::state::IngestPhase;

pub fn record_ingest_success(duration: Duration) {
    counter!("tubely_ingest_total", "outcome" => "success").increment(1);
    histogram!("tubely_ingest_duration_seconds").record(duration.as_secs_f64());
}

/// Record a failed upload. `phase` is the phase the pipeline failed to reach.
pub fn record_ingest_failure(phase: IngestPhase, client_fault: bool) {
    let outcome = if client_fault { "rejected" } else { "failed" };
    counter!("tubely_ingest_total", "outcome" => outcome).increment(1);
    counter!("tubely_ingest_failures_total", "phase" => phase.as_str()).increment(1);
}

pub fn record_staged_bytes(bytes: u64) {
    histogram!("tubely_ingest_bytes").record(bytes as f64);
}

pub fn record_orphaned_object() {
    counter!("tubely_orphaned_objects_total").increment(1);
}
