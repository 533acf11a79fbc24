use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::default_report_dir;
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize,
};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List persisted reports, newest first
    Reports(ReportsArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ReportsArgs {
    /// Directory holding persisted reports
    #[arg(long = "report-dir", default_value_t = default_report_dir())]
    pub report_dir: String,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator with bounded concurrency and persisted reports."
)]
pub struct TesterArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Target URL for the load test
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body sent with every request
    #[arg(long, short)]
    pub data: Option<String>,

    /// Total number of requests to issue
    #[arg(
        long = "requests",
        short = 'n',
        default_value = "100",
        value_parser = parse_positive_u64
    )]
    pub requests: PositiveU64,

    /// Number of requests kept in flight
    #[arg(
        long = "concurrency",
        short = 'c',
        default_value = "10",
        value_parser = parse_positive_usize
    )]
    pub concurrency: PositiveUsize,

    /// Per-request timeout (supports ms/s/m/h, bare numbers are ms)
    #[arg(
        long = "timeout",
        default_value = "5000ms",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Directory where reports are written
    #[arg(long = "report-dir", default_value_t = default_report_dir())]
    pub report_dir: String,

    /// Skip writing a report after the run
    #[arg(long = "no-report")]
    pub no_report: bool,

    /// Disable the live progress line
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by VOLLEY_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./volley.toml or ./volley.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}
