use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::error::ReportError;
use crate::metrics::{Hundredths, RunSummary};
use crate::run::RunConfig;

fn write_line(output: &mut String, line: &str) -> Result<(), ReportError> {
    writeln!(output, "{}", line).map_err(|err| ReportError::WriteLine { source: err })
}

fn write_row(output: &mut String, cells: &[&str]) -> Result<(), ReportError> {
    write_line(output, &format!("| {} |", cells.join(" | ")))
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}

/// Renders the markdown report for one finished run.
///
/// # Errors
///
/// Returns [`ReportError::WriteLine`] if formatting into the buffer fails.
pub fn render_report(
    config: &RunConfig,
    summary: &RunSummary,
    generated_at: DateTime<Local>,
) -> Result<String, ReportError> {
    let mut out = String::new();
    write_line(&mut out, "# Load Test Report")?;
    write_line(&mut out, "")?;
    write_line(
        &mut out,
        &format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
    )?;
    write_line(&mut out, "")?;

    write_configuration(&mut out, config)?;
    write_performance(&mut out, summary)?;
    write_percentiles(&mut out, summary)?;
    write_success_rate(&mut out, summary)?;
    write_status_codes(&mut out, summary)?;
    if !summary.errors.is_empty() {
        write_errors(&mut out, summary)?;
    }
    Ok(out)
}

fn write_configuration(out: &mut String, config: &RunConfig) -> Result<(), ReportError> {
    write_line(out, "## Configuration")?;
    write_line(out, "")?;
    write_row(out, &["Setting", "Value"])?;
    write_row(out, &["---", "---"])?;
    write_row(out, &["Endpoint", &escape_cell(&config.endpoint)])?;
    write_row(out, &["Method", config.method.as_str()])?;
    write_row(out, &["Total Requests", &config.total_requests.get().to_string()])?;
    write_row(out, &["Concurrency", &config.concurrency.get().to_string()])?;
    write_row(
        out,
        &["Timeout", &format!("{}ms", config.timeout.as_millis())],
    )?;
    let headers = if config.headers.is_empty() {
        "none".to_owned()
    } else {
        escape_cell(
            &config
                .headers
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    };
    write_row(out, &["Headers", &headers])?;
    let body = config
        .body
        .as_ref()
        .map_or_else(|| "none".to_owned(), |body| format!("{} bytes", body.len()));
    write_row(out, &["Body", &body])?;
    write_line(out, "")
}

fn write_performance(out: &mut String, summary: &RunSummary) -> Result<(), ReportError> {
    write_line(out, "## Performance Metrics")?;
    write_line(out, "")?;
    write_row(out, &["Metric", "Value"])?;
    write_row(out, &["---", "---"])?;
    write_row(out, &["Total Time", &format!("{}ms", summary.total_time_ms)])?;
    write_row(
        out,
        &[
            "Completed Requests",
            &format!(
                "{} / {}",
                summary.total_requests, summary.requested_requests
            ),
        ],
    )?;
    write_row(
        out,
        &["Requests per Second", &summary.requests_per_second.to_string()],
    )?;
    write_row(
        out,
        &[
            "Average Response Time",
            &format!("{}ms", summary.avg_response_time),
        ],
    )?;
    write_row(
        out,
        &[
            "Min Response Time",
            &format!("{}ms", summary.min_response_time),
        ],
    )?;
    write_row(
        out,
        &[
            "Max Response Time",
            &format!("{}ms", summary.max_response_time),
        ],
    )?;
    write_row(
        out,
        &["Data Received", &format!("{} bytes", summary.total_bytes)],
    )?;
    write_row(
        out,
        &["Stopped Early", if summary.stopped { "yes" } else { "no" }],
    )?;
    write_line(out, "")
}

fn write_percentiles(out: &mut String, summary: &RunSummary) -> Result<(), ReportError> {
    let percentiles = &summary.percentiles;
    write_line(out, "## Response Time Percentiles")?;
    write_line(out, "")?;
    write_row(out, &["Percentile", "Response Time"])?;
    write_row(out, &["---", "---"])?;
    for (label, value) in [
        ("P50", percentiles.p50),
        ("P90", percentiles.p90),
        ("P95", percentiles.p95),
        ("P99", percentiles.p99),
    ] {
        write_row(out, &[label, &format!("{}ms", value)])?;
    }
    write_line(out, "")
}

fn write_success_rate(out: &mut String, summary: &RunSummary) -> Result<(), ReportError> {
    let failure_rate = Hundredths::percent(summary.failed_requests, summary.total_requests);
    write_line(out, "## Success Rate")?;
    write_line(out, "")?;
    write_row(out, &["Outcome", "Count", "Percentage"])?;
    write_row(out, &["---", "---", "---"])?;
    write_row(
        out,
        &[
            "Successful",
            &summary.successful_requests.to_string(),
            &format!("{}%", summary.success_rate),
        ],
    )?;
    write_row(
        out,
        &[
            "Failed",
            &summary.failed_requests.to_string(),
            &format!("{}%", failure_rate),
        ],
    )?;
    write_line(out, "")
}

fn write_status_codes(out: &mut String, summary: &RunSummary) -> Result<(), ReportError> {
    write_line(out, "## Status Codes")?;
    write_line(out, "")?;
    write_row(out, &["Status", "Count"])?;
    write_row(out, &["---", "---"])?;
    for (status, count) in &summary.status_codes {
        write_row(out, &[status.as_str(), &count.to_string()])?;
    }
    write_line(out, "")
}

fn write_errors(out: &mut String, summary: &RunSummary) -> Result<(), ReportError> {
    write_line(out, "## Errors")?;
    write_line(out, "")?;
    write_row(out, &["Error", "Count"])?;
    write_row(out, &["---", "---"])?;
    for (label, count) in &summary.errors {
        write_row(out, &[&escape_cell(label), &count.to_string()])?;
    }
    write_line(out, "")
}
