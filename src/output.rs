//! Output writer for the overlay text source.
//!
//! Renders each poll outcome to exactly one line and atomically replaces
//! the destination file, so overlay software never observes a truncated
//! or mixed record.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::PollOutcome;

/// Writes the one-line rank record consumed by the overlay.
pub struct OutputWriter {
    path: PathBuf,
}

impl OutputWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render the single-line record for a poll outcome.
    pub fn render(outcome: &PollOutcome) -> String {
        match outcome {
            PollOutcome::Found(entry) => match entry.status {
                Some(status) => {
                    format!("Rank: [{status}] {} | Level: {}", entry.rank, entry.level)
                }
                None => format!("Rank: {} | Level: {}", entry.rank, entry.level),
            },
            PollOutcome::NotFound => "Character not found".to_string(),
            PollOutcome::Failed(err) => format!("Error: {err}"),
        }
    }

    /// Atomically replace the output file with the rendered record.
    ///
    /// Writes a sibling temp file first and renames it over the target, so
    /// an interruption mid-write never leaves the destination empty or
    /// partially written.
    pub fn write(&self, outcome: &PollOutcome) -> Result<()> {
        let content = Self::render(outcome);
        let tmp = self.path.with_extension("tmp");

        std::fs::write(&tmp, &content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), content = %content, "Output updated");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
