use crate::app_dirs::AppDirs;
use crate::engine::SessionSummary;
use chrono::Local;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Append-only CSV log of finished sessions, one record per stop.
/// Best-effort on the caller's side; a missing log never blocks stopping.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::history_path()
            .unwrap_or_else(|| PathBuf::from("pausa_history.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, summary: &SessionSummary) -> Result<(), csv::Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(["date", "work_minutes", "elapsed_secs", "overdue_secs"])?;
        }

        writer.write_record([
            Local::now().format("%c").to_string(),
            (summary.work_duration.as_secs() / 60).to_string(),
            summary.elapsed.as_secs().to_string(),
            summary
                .overdue
                .map(|d| d.as_secs())
                .unwrap_or(0)
                .to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}
