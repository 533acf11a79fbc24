use crate::metrics::{ProgressSnapshot, RunSummary};

/// Lifecycle notifications emitted by a run, in order: one `Started`, one
/// `Progress` per recorded outcome, one `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { total: u64, concurrency: usize },
    Progress(ProgressSnapshot),
    Finished(RunSummary),
}
