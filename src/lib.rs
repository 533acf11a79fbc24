//! Core library for the `volley` load generator.
//!
//! The engine lives in [`run`]: a [`run::RunController`] validates a
//! [`run::RunConfig`], drives a bounded pool of workers through a
//! [`http::RequestExecutor`], folds every outcome into a
//! [`metrics::StatsAccumulator`] and publishes [`progress::ProgressEvent`]s.
//! [`report`] renders and stores the final summary. The `volley` binary wires
//! these to the CLI, the terminal and the process signals.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod progress;
pub mod report;
pub mod run;
