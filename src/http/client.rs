use std::time::Duration;

use reqwest::Client;
use tracing::error;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};

/// Builds the shared HTTP client used by every worker slot.
///
/// # Errors
///
/// Returns an error when the underlying client cannot be constructed
/// (for example when the TLS backend fails to initialize).
pub fn build_client(timeout: Duration, max_idle_per_host: usize) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(max_idle_per_host)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::http(HttpError::BuildClientFailed { source: err })
        })
}
