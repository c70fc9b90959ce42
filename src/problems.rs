//! The problems log: the user-visible diagnostic surface.
//!
//! Append-only within a run, entries separated by blank lines. Logging a
//! problem never fails the pipeline; a write error is downgraded to a
//! tracing warning.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

use crate::cache::CacheDir;

#[derive(Debug, Clone)]
pub struct ProblemLog {
    path: PathBuf,
}

impl ProblemLog {
    pub fn new(cache: &CacheDir) -> Self {
        Self {
            path: cache.problems_path(),
        }
    }

    /// Starts a fresh log. Full pipeline runs call this once up front;
    /// single-stage runs append to whatever is already there.
    pub fn truncate(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, "")
            .with_context(|| format!("Failed to truncate {}", self.path.display()))
    }

    pub fn append(&self, entry: impl AsRef<str>) {
        let entry = entry.as_ref();
        warn!(problem = entry, "problem recorded");

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}\n", entry));

        if let Err(e) = result {
            warn!(
                path = %self.path.display(),
                error = %e,
                "failed to append to problems log"
            );
        }
    }
}
