//! Durable storage for generated speech digests.
//!
//! Files live flat in one directory and are named
//! `{label-slug}_{UTC timestamp}_{random hex}.mp3`, so concurrent runs for
//! the same company never collide. Retrieval only accepts bare file names;
//! anything that could address a path outside the store is reported as not
//! found.

use crate::error::{ArtifactNotFound, SpeechError};
use crate::models::AudioArtifact;
use crate::utils::{ensure_writable_dir, slugify_title};
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

const EXTENSION: &str = "mp3";
const FALLBACK_LABEL: &str = "digest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed and check that it is writable.
    pub async fn ensure_ready(&self) -> io::Result<()> {
        ensure_writable_dir(&self.dir).await
    }

    /// Pick a fresh file name for a digest about `label`.
    pub fn allocate(&self, label: &str) -> AudioArtifact {
        let slug = match slugify_title(label) {
            s if s.is_empty() => FALLBACK_LABEL.to_string(),
            s => s,
        };
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let nonce: u32 = rand::random();
        let file_name = format!("{slug}_{stamp}_{nonce:08x}.{EXTENSION}");
        AudioArtifact {
            path: self.dir.join(&file_name),
            file_name,
        }
    }

    /// Write `bytes` to a newly allocated file. Never overwrites.
    ///
    /// # Arguments
    ///
    /// * `label` - Human label, slugified into the file name
    /// * `bytes` - Encoded audio
    ///
    /// # Returns
    ///
    /// The artifact whose `file_name` can later be passed to [`Self::open`].
    ///
    /// # Errors
    ///
    /// [`SpeechError::Io`] if the directory or file cannot be written.
    #[instrument(level = "info", skip(self, bytes), fields(len = bytes.len()))]
    pub async fn store(&self, label: &str, bytes: &[u8]) -> Result<AudioArtifact, SpeechError> {
        fs::create_dir_all(&self.dir).await?;
        let artifact = self.allocate(label);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&artifact.path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        info!(file = %artifact.file_name, "Stored audio digest");
        Ok(artifact)
    }

    /// Read back a stored digest by its file name.
    ///
    /// # Arguments
    ///
    /// * `reference` - Bare file name returned by [`Self::store`]
    ///
    /// # Errors
    ///
    /// [`ArtifactNotFound`] when the file is missing, unreadable, or the
    /// name contains a path separator or `..`.
    pub async fn open(&self, reference: &str) -> Result<Vec<u8>, ArtifactNotFound> {
        let path = self
            .resolve(reference)
            .ok_or_else(|| ArtifactNotFound(reference.to_string()))?;
        fs::read(&path).await.map_err(|e| {
            debug!(%reference, error = %e, "Audio lookup failed");
            ArtifactNotFound(reference.to_string())
        })
    }

    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let unsafe_name = reference.is_empty()
            || reference.starts_with('.')
            || reference.contains(['/', '\\', '\0'])
            || reference.contains("..");
        if unsafe_name {
            return None;
        }
        Some(self.dir.join(reference))
    }

    /// Delete digests whose modification time is older than `max_age`.
    ///
    /// Only `.mp3` files are considered. Errors on individual files are
    /// logged and skipped, and a missing directory prunes nothing.
    ///
    /// # Returns
    ///
    /// How many files were removed.
    #[instrument(level = "info", skip(self), fields(dir = %self.dir.display()))]
    pub async fn prune_older_than(&self, max_age: Duration) -> usize {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "Audio directory not readable; nothing to prune");
                return 0;
            }
        };
        let now = SystemTime::now();
        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(t) => t,
                Err(_) => continue,
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age <= max_age {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to prune audio file"),
            }
        }
        if removed > 0 {
            info!(removed, "Pruned old audio digests");
        }
        removed
    }
}
