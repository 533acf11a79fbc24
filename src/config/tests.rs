use super::{
    apply_config, load_config_file,
    types::{ConfigFile, DurationValue},
};
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{HttpMethod, TesterArgs};
use crate::error::AppResult;

fn parse_with_matches(raw: &[&str]) -> AppResult<(TesterArgs, clap::ArgMatches)> {
    let matches = TesterArgs::command().try_get_matches_from(raw.iter().copied())?;
    let args = TesterArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.toml");
    let content = r#"
url = "http://localhost:3000/health"
method = "post"
headers = ["Accept: application/json"]
data = "{}"
requests = 500
concurrency = 20
timeout = "2s"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("http://localhost:3000/health") {
        return Err("Unexpected url".to_owned());
    }
    if config.method != Some(HttpMethod::Post) {
        return Err("Unexpected method".to_owned());
    }
    if config.requests != Some(500) || config.concurrency != Some(20) {
        return Err("Unexpected requests/concurrency".to_owned());
    }
    if config.timeout != Some(DurationValue::Text("2s".to_owned())) {
        return Err(format!("Unexpected timeout: {:?}", config.timeout));
    }
    Ok(())
}

#[test]
fn parse_json_config_with_aliases() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.json");
    let content = r#"{
  "endpoint": "http://localhost:3000",
  "total_requests": 40,
  "concurrency": 4,
  "timeout_ms": 750,
  "body": "payload"
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("http://localhost:3000") {
        return Err("Unexpected url".to_owned());
    }
    if config.requests != Some(40) {
        return Err("Unexpected requests".to_owned());
    }
    if config.data.as_deref() != Some("payload") {
        return Err("Unexpected body".to_owned());
    }
    let timeout = config
        .timeout
        .as_ref()
        .ok_or_else(|| "Expected timeout".to_owned())?
        .to_duration()
        .map_err(|err| err.to_string())?;
    if timeout != Duration::from_millis(750) {
        return Err(format!("Unexpected timeout: {:?}", timeout));
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.yaml");
    std::fs::write(&path, "url: x").map_err(|err| format!("write failed: {}", err))?;
    if load_config_file(&path).is_ok() {
        return Err("Expected yaml config to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn apply_config_respects_cli_overrides() -> Result<(), String> {
    let (mut args, matches) =
        parse_with_matches(&["volley", "-c", "3"]).map_err(|err| err.to_string())?;
    let config = ConfigFile {
        url: Some("http://localhost:9000".to_owned()),
        requests: Some(12),
        concurrency: Some(8),
        timeout: Some(DurationValue::Millis(1500)),
        headers: Some(vec!["X-Env: staging".to_owned()]),
        ..ConfigFile::default()
    };

    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.url.as_deref() != Some("http://localhost:9000") {
        return Err("Expected url from config".to_owned());
    }
    if args.requests.get() != 12 {
        return Err("Expected requests from config".to_owned());
    }
    if args.concurrency.get() != 3 {
        return Err("Expected CLI concurrency to win".to_owned());
    }
    if args.request_timeout != Duration::from_millis(1500) {
        return Err("Expected timeout from config".to_owned());
    }
    if args.headers != vec![("X-Env".to_owned(), "staging".to_owned())] {
        return Err(format!("Unexpected headers: {:?}", args.headers));
    }
    Ok(())
}

#[test]
fn apply_config_rejects_zero_concurrency() -> Result<(), String> {
    let (mut args, matches) =
        parse_with_matches(&["volley", "-u", "http://localhost"]).map_err(|err| err.to_string())?;
    let config = ConfigFile {
        concurrency: Some(0),
        ..ConfigFile::default()
    };
    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err("Expected zero concurrency to be rejected".to_owned());
    }
    Ok(())
}
