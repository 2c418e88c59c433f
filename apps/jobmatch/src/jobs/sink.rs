//! Tabular sink: `title,company,location,date_posted`, UTF-8, one row per posting.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::JobPosting;

pub const CSV_HEADER: [&str; 4] = ["title", "company", "location", "date_posted"];

/// Renders the CSV in memory. The header is always present, even with no rows.
pub fn render_postings_csv(postings: &[JobPosting]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    writer.write_record(CSV_HEADER)?;
    for posting in postings {
        let date_posted = posting.date_posted.to_string();
        writer.write_record([
            posting.title.as_str(),
            posting.company.as_str(),
            posting.location.as_str(),
            date_posted.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Per-query sink file: `jobs.csv` + "Rust Engineer" → `jobs_Rust_Engineer.csv`,
/// in the same directory. Runs for different queries never share a file.
pub fn path_for_query(base: &Path, query: &str) -> PathBuf {
    let slug: String = query
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "jobs".to_string());
    let file_name = match base.extension() {
        Some(ext) => format!("{stem}_{slug}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{slug}"),
    };
    base.with_file_name(file_name)
}

/// Writes to a sibling temp file, then renames it over `path`. A failed write
/// leaves any previous file at `path` untouched.
pub async fn write_postings_csv(path: &Path, postings: &[JobPosting]) -> Result<(), AppError> {
    let sink_error = |reason: String| AppError::SinkWrite {
        path: path.display().to_string(),
        reason,
    };

    let bytes = render_postings_csv(postings).map_err(|e| sink_error(e.to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| sink_error(e.to_string()))?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| sink_error("path has no file name".to_string()))?;
    let tmp_path = path.with_file_name(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        Uuid::new_v4()
    ));

    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| sink_error(e.to_string()))?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            warn!("Failed to remove temp sink file {}: {}", tmp_path.display(), cleanup);
        }
        return Err(sink_error(e.to_string()));
    }

    info!("Saved {} jobs to {}", postings.len(), path.display());
    Ok(())
}
