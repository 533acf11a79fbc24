use std::collections::BTreeMap;

use serde::Serialize;

use super::{Hundredths, LatencyPercentiles, Tenths};

/// Status histogram key used when no response was received.
pub const NO_RESPONSE_STATUS: &str = "no-response";

/// Result of one request attempt.
///
/// `success` means a response arrived, whatever its status code. When it is
/// false, `status_code` is 0 and `error_label` names the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub success: bool,
    pub status_code: u16,
    pub response_time_ms: u64,
    pub size_bytes: u64,
    pub error_label: Option<String>,
}

impl RequestOutcome {
    #[must_use]
    pub const fn response(status_code: u16, response_time_ms: u64, size_bytes: u64) -> Self {
        Self {
            success: true,
            status_code,
            response_time_ms,
            size_bytes,
            error_label: None,
        }
    }

    #[must_use]
    pub fn failure(label: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            success: false,
            status_code: 0,
            response_time_ms,
            size_bytes: 0,
            error_label: Some(label.into()),
        }
    }
}

/// Live progress of a run, published after every recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
    pub percentage: Tenths,
    pub success_count: u64,
    pub fail_count: u64,
    pub avg_response_time: Hundredths,
    #[serde(rename = "currentRPS")]
    pub current_rps: Hundredths,
    #[serde(rename = "elapsedTime")]
    pub elapsed_ms: u64,
}

/// Final statistics of a run. Latencies are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_time_ms: u64,
    pub requested_requests: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub success_rate: Hundredths,
    pub avg_response_time: Hundredths,
    pub min_response_time: u64,
    pub max_response_time: u64,
    pub percentiles: LatencyPercentiles,
    pub requests_per_second: Hundredths,
    pub total_bytes: u64,
    pub status_codes: BTreeMap<String, u64>,
    pub errors: BTreeMap<String, u64>,
    pub stopped: bool,
}
