//! Small string and file system helpers shared across the crate.
//!
//! - String truncation and slugification for logging, file names, and anchors
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("static regex"));

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and byte count
/// indicator appended. The cut always lands on a character boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Convert a title or company name to a URL and file-name friendly slug.
///
/// Lowercases the text, drops punctuation, and joins words with single
/// hyphens.
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("Acme Corp."), "acme-corp");
/// ```
pub fn slugify_title(title: &str) -> String {
    let raw = title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && !c.is_whitespace() && c != '-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    HYPHEN_RUNS
        .replace_all(&raw, "-")
        .trim_matches('-')
        .to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
///
/// # Errors
///
/// Returns the underlying IO error if the directory cannot be created or is
/// not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
