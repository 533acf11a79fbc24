//! Markdown reports for finished runs and their on-disk store.
mod render;
mod store;

#[cfg(test)]
mod tests;

pub use render::render_report;
pub use store::{REPORT_FILE_PREFIX, ReportEntry, ReportStore};
