use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::args::{HttpMethod, PositiveU64, PositiveUsize, TesterArgs};
use crate::error::ValidationError;
use crate::http::RequestSpec;

/// Parameters of one load test. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub total_requests: PositiveU64,
    pub concurrency: PositiveUsize,
    pub timeout: Duration,
}

impl RunConfig {
    /// Builds a run configuration from parsed CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingUrl`] when no URL was given, or any
    /// error produced by [`RunConfig::request_spec`].
    pub fn from_args(args: &TesterArgs) -> Result<Self, ValidationError> {
        let endpoint = args.url.clone().ok_or(ValidationError::MissingUrl)?;
        let config = Self {
            endpoint,
            method: args.method,
            headers: args.headers.iter().cloned().collect(),
            body: args.data.clone(),
            total_requests: args.requests,
            concurrency: args.concurrency,
            timeout: args.request_timeout,
        };
        config.request_spec()?;
        Ok(config)
    }

    /// Number of worker slots actually spawned: never more than the number
    /// of requests.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        let total = usize::try_from(self.total_requests.get()).unwrap_or(usize::MAX);
        self.concurrency.get().min(total)
    }

    /// Validates the configuration and produces the request every slot sends.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint is empty, not an absolute
    /// http/https URL, when a header name or value is invalid, or when the
    /// timeout is below one millisecond.
    pub fn request_spec(&self) -> Result<RequestSpec, ValidationError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ValidationError::EmptyEndpoint);
        }
        let url = Url::parse(endpoint).map_err(|source| ValidationError::InvalidUrl {
            url: endpoint.to_owned(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme {
                scheme: url.scheme().to_owned(),
            });
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ValidationError::UrlMissingHost);
        }
        if self.timeout.as_millis() == 0 {
            return Err(ValidationError::TimeoutTooSmall);
        }

        Ok(RequestSpec {
            method: self.method.into(),
            url,
            headers: build_header_map(&self.headers)?,
            body: self.body.clone(),
            timeout: self.timeout,
        })
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ValidationError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|source| {
            ValidationError::InvalidHeaderName {
                header: name.clone(),
                source,
            }
        })?;
        let header_value = HeaderValue::from_str(value.trim()).map_err(|source| {
            ValidationError::InvalidHeaderValue {
                header: name.clone(),
                source,
            }
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
