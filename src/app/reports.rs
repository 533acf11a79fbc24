use volley::error::{AppError, AppResult};
use volley::report::ReportStore;

pub(crate) fn list_reports(report_dir: &str) -> AppResult<()> {
    let store = ReportStore::new(report_dir);
    let entries = store.list().map_err(AppError::report)?;
    if entries.is_empty() {
        println!("No reports found in {}", store.dir().display());
        return Ok(());
    }

    println!("Reports in {}:", store.dir().display());
    for entry in entries {
        let created = entry.created.map_or_else(
            || "unknown".to_owned(),
            |created| created.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        println!("  {}  {}  {} bytes", created, entry.name, entry.size_bytes);
    }
    Ok(())
}
