use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Method, RequestBuilder, Url, header::HeaderMap};
use tokio::time::Instant;
use tracing::debug;

use crate::error::AppResult;
use crate::metrics::RequestOutcome;

use super::build_client;

const TIMEOUT_LABEL: &str = "timeout";

/// A fully validated request, reused for every attempt of a run.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Sends one request and reports what happened. Implementations never fail:
/// transport problems are folded into the returned [`RequestOutcome`].
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &RequestSpec) -> RequestOutcome;
}

#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Creates an executor with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(timeout: Duration, max_idle_per_host: usize) -> AppResult<Self> {
        Ok(Self {
            client: build_client(timeout, max_idle_per_host)?,
        })
    }

    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn prepare(&self, request: &RequestSpec) -> RequestBuilder {
        let builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout);
        match request.body.as_ref() {
            Some(body) => builder.body(body.clone()),
            None => builder,
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &RequestSpec) -> RequestOutcome {
        let builder = self.prepare(request);
        let start = Instant::now();
        let result = tokio::time::timeout(request.timeout, send_and_drain(builder)).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(Ok((status, size_bytes))) => {
                RequestOutcome::response(status, elapsed_ms, size_bytes)
            }
            Ok(Err(err)) => {
                debug!("Request to {} failed: {}", request.url, err);
                RequestOutcome::failure(classify_error(&err), elapsed_ms)
            }
            Err(_elapsed) => {
                debug!("Request to {} timed out", request.url);
                RequestOutcome::failure(TIMEOUT_LABEL, elapsed_ms)
            }
        }
    }
}

async fn send_and_drain(builder: RequestBuilder) -> Result<(u16, u64), reqwest::Error> {
    let response = builder.send().await?;
    let status = response.status().as_u16();
    let size_bytes = drain_response_body(response).await?;
    Ok((status, size_bytes))
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

/// Maps a transport error to a stable, machine-readable label.
pub(super) fn classify_error(err: &reqwest::Error) -> &'static str {
    if err.is_timeout() {
        return TIMEOUT_LABEL;
    }
    if let Some(label) = error_chain(err).find_map(|source| {
        source
            .downcast_ref::<std::io::Error>()
            .and_then(|io| label_for_io_kind(io.kind()))
    }) {
        return label;
    }
    if error_chain(err).any(is_dns_message) {
        return "dns";
    }
    if err.is_connect() {
        "connect"
    } else if err.is_redirect() {
        "redirect"
    } else if err.is_body() || err.is_decode() {
        "body"
    } else if err.is_request() || err.is_builder() {
        "request"
    } else {
        "transport"
    }
}

pub(super) fn label_for_io_kind(kind: ErrorKind) -> Option<&'static str> {
    if kind == ErrorKind::ConnectionRefused {
        Some("connection_refused")
    } else if matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    ) {
        Some("connection_reset")
    } else if kind == ErrorKind::TimedOut {
        Some(TIMEOUT_LABEL)
    } else {
        None
    }
}

fn error_chain<'err>(
    err: &'err (dyn StdError + 'static),
) -> impl Iterator<Item = &'err (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&current| current.source())
}

fn is_dns_message(source: &(dyn StdError + 'static)) -> bool {
    let message = source.to_string().to_ascii_lowercase();
    message.contains("dns error") || message.contains("failed to lookup address")
}
