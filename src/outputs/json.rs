//! JSON run report.
//!
//! Each run's [`ScrapeOutcome`] is written under a directory for its UTC date,
//! named after the time the run finished:
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     └── 14-30-05.json
//! ```
//!
//! Two runs finishing in the same second overwrite each other.

use crate::models::ScrapeOutcome;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Report path for a run finished at `at`: `{dir}/{YYYY-MM-DD}/{HH-MM-SS}.json`.
pub fn report_path(json_output_dir: &str, at: DateTime<Utc>) -> PathBuf {
    Path::new(json_output_dir)
        .join(at.format("%Y-%m-%d").to_string())
        .join(format!("{}.json", at.format("%H-%M-%S")))
}

/// Write `outcome` as pretty JSON and return the file's path.
///
/// # Errors
///
/// Fails if the dated directory cannot be created or the file cannot be written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    outcome: &ScrapeOutcome,
    json_output_dir: &str,
    at: DateTime<Utc>,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(outcome)?;
    let path = report_path(json_output_dir, at);

    if let Some(dir) = path.parent() {
        info!(dir = %dir.display(), "Ensuring report directory exists");
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(&path, json).await?;
    info!(path = %path.display(), count = outcome.count, "Wrote run report");
    Ok(path)
}
