use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, parse_duration_arg};
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(alias = "endpoint")]
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub headers: Option<Vec<String>>,
    #[serde(alias = "body")]
    pub data: Option<String>,
    #[serde(alias = "total_requests")]
    pub requests: Option<u64>,
    pub concurrency: Option<usize>,
    #[serde(alias = "timeout_ms")]
    pub timeout: Option<DurationValue>,
    pub report_dir: Option<String>,
    pub no_report: Option<bool>,
    pub no_progress: Option<bool>,
    pub no_color: Option<bool>,
}

/// Either a bare number of milliseconds or a string with a unit suffix.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Millis(0) => Err(ValidationError::DurationZero),
            DurationValue::Millis(millis) => Ok(Duration::from_millis(*millis)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
