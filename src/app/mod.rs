mod progress;
mod reports;
mod runner;
mod summary;

pub(crate) use reports::list_reports;
pub(crate) use runner::run_load_test;
