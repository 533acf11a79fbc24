use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("A load test is already running.")]
    AlreadyRunning,
    #[error("No active load test.")]
    NoActiveRun,
    #[error("Load tests must be started from within a Tokio runtime: {source}")]
    NoRuntime {
        #[source]
        source: tokio::runtime::TryCurrentError,
    },
    #[error("Run driver task failed: {source}")]
    DriverFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}
