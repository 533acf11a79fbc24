use std::collections::BTreeMap;

use super::{
    Hundredths, LatencyPercentiles, NO_RESPONSE_STATUS, ProgressSnapshot, RequestOutcome,
    RunSummary, Tenths,
};

const MAX_PREALLOCATED_OUTCOMES: u64 = 65_536;

/// Folds request outcomes into running totals.
///
/// Running sums are updated in O(1) per record; percentiles are only
/// computed by [`StatsAccumulator::finalize`], which sorts a copy of the
/// recorded response times.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    total: u64,
    outcomes: Vec<RequestOutcome>,
    success_count: u64,
    failure_count: u64,
    response_time_sum_ms: u128,
    min_response_time_ms: Option<u64>,
    max_response_time_ms: u64,
    total_bytes: u64,
}

impl StatsAccumulator {
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            outcomes: Vec::with_capacity(
                usize::try_from(total.min(MAX_PREALLOCATED_OUTCOMES)).unwrap_or(0),
            ),
            success_count: 0,
            failure_count: 0,
            response_time_sum_ms: 0,
            min_response_time_ms: None,
            max_response_time_ms: 0,
            total_bytes: 0,
        }
    }

    pub fn record(&mut self, outcome: RequestOutcome) {
        if outcome.success {
            self.success_count = self.success_count.saturating_add(1);
        } else {
            self.failure_count = self.failure_count.saturating_add(1);
        }
        let latency = outcome.response_time_ms;
        self.response_time_sum_ms = self
            .response_time_sum_ms
            .saturating_add(u128::from(latency));
        self.min_response_time_ms = Some(
            self.min_response_time_ms
                .map_or(latency, |current| current.min(latency)),
        );
        self.max_response_time_ms = self.max_response_time_ms.max(latency);
        self.total_bytes = self.total_bytes.saturating_add(outcome.size_bytes);
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        u64::try_from(self.outcomes.len()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn success_count(&self) -> u64 {
        self.success_count
    }

    #[must_use]
    pub const fn failure_count(&self) -> u64 {
        self.failure_count
    }

    #[must_use]
    pub fn outcomes(&self) -> &[RequestOutcome] {
        &self.outcomes
    }

    fn avg_response_time(&self) -> Hundredths {
        Hundredths::ratio(self.response_time_sum_ms, u128::from(self.completed()))
    }

    fn requests_per_second(&self, elapsed_ms: u64) -> Hundredths {
        Hundredths::ratio(
            u128::from(self.completed()).saturating_mul(1000),
            u128::from(elapsed_ms),
        )
    }

    #[must_use]
    pub fn snapshot(&self, elapsed_ms: u64) -> ProgressSnapshot {
        let completed = self.completed();
        ProgressSnapshot {
            completed,
            total: self.total,
            percentage: Tenths::percent(completed, self.total),
            success_count: self.success_count,
            fail_count: self.failure_count,
            avg_response_time: self.avg_response_time(),
            current_rps: self.requests_per_second(elapsed_ms),
            elapsed_ms,
        }
    }

    /// Builds the final summary. Pure with respect to `self`, so repeated
    /// calls with the same arguments produce identical summaries.
    #[must_use]
    pub fn finalize(&self, total_elapsed_ms: u64, stopped: bool) -> RunSummary {
        let mut sorted: Vec<u64> = self
            .outcomes
            .iter()
            .map(|outcome| outcome.response_time_ms)
            .collect();
        sorted.sort_unstable();

        let mut status_codes: BTreeMap<String, u64> = BTreeMap::new();
        let mut errors: BTreeMap<String, u64> = BTreeMap::new();
        for outcome in &self.outcomes {
            let status_key = if outcome.status_code == 0 {
                NO_RESPONSE_STATUS.to_owned()
            } else {
                outcome.status_code.to_string()
            };
            let count = status_codes.entry(status_key).or_insert(0);
            *count = count.saturating_add(1);

            if let Some(label) = outcome.error_label.as_deref()
                && !label.is_empty()
            {
                let error_count = errors.entry(label.to_owned()).or_insert(0);
                *error_count = error_count.saturating_add(1);
            }
        }

        let completed = self.completed();
        RunSummary {
            total_time_ms: total_elapsed_ms,
            requested_requests: self.total,
            total_requests: completed,
            successful_requests: self.success_count,
            failed_requests: self.failure_count,
            success_rate: Hundredths::percent(self.success_count, completed),
            avg_response_time: self.avg_response_time(),
            min_response_time: self.min_response_time_ms.unwrap_or(0),
            max_response_time: self.max_response_time_ms,
            percentiles: LatencyPercentiles::from_sorted(&sorted),
            requests_per_second: self.requests_per_second(total_elapsed_ms),
            total_bytes: self.total_bytes,
            status_codes,
            errors,
            stopped,
        }
    }
}
