//! JSON report files for downstream tooling.
//!
//! The file body is exactly the report served by `GET /get_news`, including
//! the `company` field, so saved runs can be diffed against API responses.

use crate::models::InsightReport;
use crate::utils::slugify_title;
use chrono::Utc;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `report` to `{json_output_dir}/{company-slug}_{UTC timestamp}.json`.
///
/// # Arguments
///
/// * `report` - The finished report to serialize
/// * `json_output_dir` - Directory to write into; created if missing
///
/// # Returns
///
/// The path of the file written.
///
/// # Errors
///
/// Fails if the directory cannot be created, the report cannot be
/// serialized, or the file cannot be written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir.display()))]
pub async fn write_report(
    report: &InsightReport,
    json_output_dir: &Path,
) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = json_output_dir.join(report_file_name(&report.company));
    info!(path = %path.display(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");

    Ok(path)
}

fn report_file_name(company: &str) -> String {
    let slug = match slugify_title(company) {
        s if s.is_empty() => "report".to_string(),
        s => s,
    };
    format!("{}_{}.json", slug, Utc::now().format("%Y%m%dT%H%M%SZ"))
}
