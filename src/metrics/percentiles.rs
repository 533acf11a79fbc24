use serde::Serialize;

const PERCENTILE_P50: u64 = 50;
const PERCENTILE_P90: u64 = 90;
const PERCENTILE_P95: u64 = 95;
const PERCENTILE_P99: u64 = 99;
const PERCENT_DIVISOR: u128 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LatencyPercentiles {
    pub p50: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

impl LatencyPercentiles {
    /// Reads percentiles from response times already sorted ascending.
    #[must_use]
    pub fn from_sorted(sorted: &[u64]) -> Self {
        Self {
            p50: percentile(sorted, PERCENTILE_P50),
            p90: percentile(sorted, PERCENTILE_P90),
            p95: percentile(sorted, PERCENTILE_P95),
            p99: percentile(sorted, PERCENTILE_P99),
        }
    }
}

/// `floor(len * percentile / 100)`, clamped to the last valid index.
pub(crate) fn percentile_index(len: usize, percentile: u64) -> Option<usize> {
    let last = len.checked_sub(1)?;
    let len_u128 = u128::from(u64::try_from(len).unwrap_or(u64::MAX));
    let raw = len_u128
        .saturating_mul(u128::from(percentile))
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let index = usize::try_from(raw).unwrap_or(last);
    Some(index.min(last))
}

fn percentile(sorted: &[u64], percentile: u64) -> u64 {
    percentile_index(sorted.len(), percentile)
        .and_then(|index| sorted.get(index))
        .copied()
        .unwrap_or(0)
}
