use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::metrics::RunSummary;
use crate::run::{RunConfig, RunController};

use super::render_report;

pub const REPORT_FILE_PREFIX: &str = "load-test-report-";
const REPORT_FILE_EXTENSION: &str = "md";
pub(super) const MAX_NAME_ATTEMPTS: u32 = 1000;

/// A persisted report as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub name: String,
    pub path: PathBuf,
    pub created: Option<DateTime<Local>>,
    pub size_bytes: u64,
}

/// Directory of timestamped markdown reports.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists the report of the controller's most recent finished run.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::NoCompletedRun`] when no run has finished yet,
    /// or an I/O error from [`ReportStore::save`].
    pub fn save_latest(&self, controller: &RunController) -> Result<PathBuf, ReportError> {
        let latest = controller.latest().ok_or(ReportError::NoCompletedRun)?;
        self.save(&latest.config, &latest.summary)
    }

    /// Renders and writes a report stamped with the current local time.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or file cannot be written.
    pub fn save(&self, config: &RunConfig, summary: &RunSummary) -> Result<PathBuf, ReportError> {
        self.save_at(config, summary, Local::now())
    }

    /// Renders and writes a report stamped with `generated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or file cannot be written.
    pub fn save_at(
        &self,
        config: &RunConfig,
        summary: &RunSummary,
        generated_at: DateTime<Local>,
    ) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(&self.dir).map_err(|err| ReportError::CreateDir {
            path: self.dir.clone(),
            source: err,
        })?;
        let content = render_report(config, summary, generated_at)?;
        let (path, mut file) = self.create_report_file(generated_at)?;
        file.write_all(content.as_bytes())
            .map_err(|err| ReportError::WriteReport {
                path: path.clone(),
                source: err,
            })?;
        info!("Report written to {}", path.display());
        Ok(path)
    }

    /// Lists persisted reports, newest first. A missing directory yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::ReadDir`] when the directory cannot be read.
    pub fn list(&self) -> Result<Vec<ReportEntry>, ReportError> {
        if !self.dir.exists() {
            debug!("Report directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }
        let read_dir = std::fs::read_dir(&self.dir).map_err(|err| ReportError::ReadDir {
            path: self.dir.clone(),
            source: err,
        })?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|err| ReportError::ReadDir {
                path: self.dir.clone(),
                source: err,
            })?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if !is_report_name(&name) {
                continue;
            }
            let Ok(metadata) = dir_entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .ok()
                .map(DateTime::<Local>::from);
            entries.push(ReportEntry {
                name,
                path: dir_entry.path(),
                created,
                size_bytes: metadata.len(),
            });
        }

        entries.sort_by(|left, right| {
            right
                .created
                .cmp(&left.created)
                .then_with(|| right.name.cmp(&left.name))
        });
        Ok(entries)
    }

    /// Creates the first free report file, adding a `-N` suffix on
    /// collision. Existing files are never opened for writing.
    fn create_report_file(
        &self,
        generated_at: DateTime<Local>,
    ) -> Result<(PathBuf, File), ReportError> {
        let stamp = generated_at.format("%Y-%m-%dT%H-%M-%S-%3f");
        let base = format!("{}{}", REPORT_FILE_PREFIX, stamp);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{}.{}", base, REPORT_FILE_EXTENSION)
            } else {
                format!("{}-{}.{}", base, attempt, REPORT_FILE_EXTENSION)
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!("Report name {} is taken", path.display());
                }
                Err(err) => return Err(ReportError::WriteReport { path, source: err }),
            }
        }
        Err(ReportError::NamesExhausted {
            base,
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

fn is_report_name(name: &str) -> bool {
    name.starts_with(REPORT_FILE_PREFIX)
        && Path::new(name)
            .extension()
            .is_some_and(|ext| ext == REPORT_FILE_EXTENSION)
}
