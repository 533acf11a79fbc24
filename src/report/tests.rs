use super::*;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, TimeZone};

use crate::args::{HttpMethod, PositiveU64, PositiveUsize};
use crate::error::ReportError;
use crate::http::{RequestExecutor, RequestSpec};
use crate::metrics::{RequestOutcome, RunSummary, StatsAccumulator};
use crate::progress::ObserverRegistry;
use crate::run::{RunConfig, RunController};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn sample_config() -> Result<RunConfig, String> {
    Ok(RunConfig {
        endpoint: "http://localhost:8080/api".to_owned(),
        method: HttpMethod::Post,
        headers: BTreeMap::from([("Content-Type".to_owned(), "application/json".to_owned())]),
        body: Some("{\"a\":1}".to_owned()),
        total_requests: PositiveU64::try_from(4).map_err(|err| err.to_string())?,
        concurrency: PositiveUsize::try_from(2).map_err(|err| err.to_string())?,
        timeout: Duration::from_millis(5000),
    })
}

fn sample_summary(with_errors: bool) -> RunSummary {
    let mut stats = StatsAccumulator::new(4);
    stats.record(RequestOutcome::response(200, 10, 100));
    stats.record(RequestOutcome::response(200, 20, 100));
    stats.record(RequestOutcome::response(404, 30, 50));
    if with_errors {
        stats.record(RequestOutcome::failure("timeout", 40));
    } else {
        stats.record(RequestOutcome::response(200, 40, 100));
    }
    stats.finalize(1000, false)
}

fn fixed_time(second: u32) -> Result<chrono::DateTime<Local>, String> {
    Local
        .with_ymd_and_hms(2026, 3, 14, 9, 26, second)
        .single()
        .ok_or_else(|| "Ambiguous local time".to_owned())
}

struct InstantExecutor;

#[async_trait]
impl RequestExecutor for InstantExecutor {
    async fn execute(&self, _request: &RequestSpec) -> RequestOutcome {
        RequestOutcome::response(200, 1, 2)
    }
}

#[test]
fn report_contains_every_section() -> Result<(), String> {
    let report = render_report(&sample_config()?, &sample_summary(true), fixed_time(0)?)
        .map_err(|err| err.to_string())?;

    for expected in [
        "# Load Test Report",
        "Generated: 2026-03-14 09:26:00",
        "## Configuration",
        "| Endpoint | http://localhost:8080/api |",
        "| Method | POST |",
        "| Concurrency | 2 |",
        "| Timeout | 5000ms |",
        "| Headers | Content-Type |",
        "| Body | 7 bytes |",
        "## Performance Metrics",
        "| Completed Requests | 4 / 4 |",
        "| Requests per Second | 4.00 |",
        "| Average Response Time | 25.00ms |",
        "## Response Time Percentiles",
        "| P50 | 30ms |",
        "| P99 | 40ms |",
        "## Success Rate",
        "| Successful | 3 | 75.00% |",
        "| Failed | 1 | 25.00% |",
        "## Status Codes",
        "| 200 | 2 |",
        "| 404 | 1 |",
        "| no-response | 1 |",
        "## Errors",
        "| timeout | 1 |",
    ] {
        if !report.contains(expected) {
            return Err(format!("Report missing '{}':\n{}", expected, report));
        }
    }
    Ok(())
}

#[test]
fn error_table_is_omitted_without_errors() -> Result<(), String> {
    let report = render_report(&sample_config()?, &sample_summary(false), fixed_time(0)?)
        .map_err(|err| err.to_string())?;
    if report.contains("## Errors") {
        return Err("Expected no error table".to_owned());
    }
    if !report.contains("| Failed | 0 | 0.00% |") {
        return Err(format!("Unexpected success table:\n{}", report));
    }
    Ok(())
}

#[test]
fn save_latest_requires_a_completed_run() -> Result<(), String> {
    run_async_test(async {
        let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
        let store = ReportStore::new(dir.path().join("reports"));
        let controller = RunController::new(
            Arc::new(InstantExecutor),
            Arc::new(ObserverRegistry::new()),
        );

        match store.save_latest(&controller) {
            Err(ReportError::NoCompletedRun) => {}
            other => return Err(format!("Expected NoCompletedRun, got {:?}", other)),
        }

        let handle = controller
            .start(sample_config()?)
            .map_err(|err| err.to_string())?;
        controller
            .await_result(handle)
            .await
            .map_err(|err| err.to_string())?;

        let path = store
            .save_latest(&controller)
            .map_err(|err| err.to_string())?;
        let content = std::fs::read_to_string(&path).map_err(|err| err.to_string())?;
        if !content.contains("| Completed Requests | 4 / 4 |") {
            return Err(format!("Unexpected report content:\n{}", content));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !name.starts_with(REPORT_FILE_PREFIX) || !name.ends_with(".md") {
            return Err(format!("Unexpected report name: {}", name));
        }
        Ok(())
    })
}

#[test]
fn list_returns_newest_first_and_ignores_other_files() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let store = ReportStore::new(dir.path());
    let config = sample_config()?;
    let summary = sample_summary(false);

    let older = store
        .save_at(&config, &summary, fixed_time(1)?)
        .map_err(|err| err.to_string())?;
    std::thread::sleep(Duration::from_millis(20));
    let newer = store
        .save_at(&config, &summary, fixed_time(2)?)
        .map_err(|err| err.to_string())?;
    std::fs::write(dir.path().join("notes.txt"), "ignore me").map_err(|err| err.to_string())?;

    let entries = store.list().map_err(|err| err.to_string())?;
    let paths: Vec<_> = entries.iter().map(|entry| entry.path.clone()).collect();
    if paths != vec![newer, older] {
        return Err(format!("Unexpected listing order: {:?}", paths));
    }
    if entries.iter().any(|entry| entry.size_bytes == 0) {
        return Err("Expected non-empty report files".to_owned());
    }
    Ok(())
}

#[test]
fn saving_twice_at_the_same_instant_keeps_both() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let store = ReportStore::new(dir.path());
    let config = sample_config()?;
    let summary = sample_summary(true);
    let at = fixed_time(3)?;

    let first = store
        .save_at(&config, &summary, at)
        .map_err(|err| err.to_string())?;
    let second = store
        .save_at(&config, &summary, at)
        .map_err(|err| err.to_string())?;
    if first == second {
        return Err("Expected distinct report paths".to_owned());
    }
    let listed = store.list().map_err(|err| err.to_string())?;
    if listed.len() != 2 {
        return Err(format!("Expected 2 reports, found {}", listed.len()));
    }
    Ok(())
}

#[test]
fn existing_report_is_never_overwritten() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let store = ReportStore::new(dir.path());
    let config = sample_config()?;
    let summary = sample_summary(false);
    let at = fixed_time(4)?;

    let first = store
        .save_at(&config, &summary, at)
        .map_err(|err| err.to_string())?;
    std::fs::write(&first, "keep").map_err(|err| err.to_string())?;

    let second = store
        .save_at(&config, &summary, at)
        .map_err(|err| err.to_string())?;
    if second == first {
        return Err("Second report reused the first path".to_owned());
    }
    let kept = std::fs::read_to_string(&first).map_err(|err| err.to_string())?;
    if kept != "keep" {
        return Err("Existing report was overwritten".to_owned());
    }
    Ok(())
}

#[test]
fn exhausted_names_fail_instead_of_overwriting() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let store = ReportStore::new(dir.path());
    let config = sample_config()?;
    let summary = sample_summary(false);
    let at = fixed_time(5)?;

    let first = store
        .save_at(&config, &summary, at)
        .map_err(|err| err.to_string())?;
    std::fs::write(&first, "keep").map_err(|err| err.to_string())?;
    let base = first
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("Report name is not valid UTF-8")?
        .to_owned();
    for attempt in 1..super::store::MAX_NAME_ATTEMPTS {
        let taken = dir.path().join(format!("{}-{}.md", base, attempt));
        std::fs::write(taken, "taken").map_err(|err| err.to_string())?;
    }

    match store.save_at(&config, &summary, at) {
        Err(ReportError::NamesExhausted { attempts, .. })
            if attempts == super::store::MAX_NAME_ATTEMPTS => {}
        other => return Err(format!("Expected exhausted names, got {:?}", other)),
    }
    let kept = std::fs::read_to_string(&first).map_err(|err| err.to_string())?;
    if kept != "keep" {
        return Err("Existing report was overwritten".to_owned());
    }
    Ok(())
}

#[test]
fn missing_directory_lists_nothing() -> Result<(), String> {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let store = ReportStore::new(dir.path().join("does-not-exist"));
    let entries = store.list().map_err(|err| err.to_string())?;
    if !entries.is_empty() {
        return Err("Expected empty listing".to_owned());
    }
    Ok(())
}
