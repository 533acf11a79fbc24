//! Per-request outcomes, streaming aggregation and run summaries.
mod accumulator;
mod fixed;
mod percentiles;
mod types;


pub use accumulator::StatsAccumulator;
pub use fixed::{Hundredths, Tenths};
pub use percentiles::LatencyPercentiles;
pub use types::{NO_RESPONSE_STATUS, ProgressSnapshot, RequestOutcome, RunSummary};
