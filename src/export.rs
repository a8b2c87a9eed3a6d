//! Writes rendered reports to the exports directory and rotates old ones.

use crate::render::Format;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;
use tracing::debug;

/// Prefix for exported reconciliation reports.
pub const REPORT: &str = "recon";

/// Prefix for exported category catalogs.
pub const CATEGORIES: &str = "categories";

/// Manages export file creation and rotation.
///
/// Create a new instance via `Config::exporter()` or `Exports::new()`.
#[derive(Debug, Clone)]
pub struct Exports {
    dir: PathBuf,
    copies: u32,
}

impl Exports {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.exports().to_path_buf(),
            copies: config.export_copies(),
        }
    }

    /// Writes `contents` to `{prefix}.YYYY-MM-DD-NNN.{ext}`, where NNN is the next free sequence
    /// number for today and `ext` comes from `format`. Only the newest `copies` files with the
    /// same prefix and extension are kept.
    ///
    /// Returns the path to the created file.
    pub async fn save(&self, prefix: &str, format: Format, contents: &str) -> Result<PathBuf> {
        utils::make_dir(&self.dir).await?;
        let extension = format.extension();
        let date = today();
        let seq = self.next_sequence_number(prefix, &date, extension).await?;
        let path = self
            .dir
            .join(format!("{prefix}.{date}-{seq:03}.{extension}"));

        utils::write(&path, contents).await?;
        self.rotate(prefix, extension).await?;

        Ok(path)
    }

    async fn next_sequence_number(&self, prefix: &str, date: &str, extension: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date, extension) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Deletes the oldest export files with the given prefix and extension beyond `copies`.
    async fn rotate(&self, prefix: &str, extension: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, (String, u32))> = Vec::new();

        let mut dir = utils::read_dir(&self.dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(key) = parse_export_name(&name, prefix, extension) {
                files.push((entry.path(), key));
            }
        }

        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            debug!("Removing old export {}", path.display());
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from an export filename of the form `{prefix}.{date}-{NNN}.{ext}`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str, extension: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{extension}"))?
        .parse()
        .ok()
}

/// Splits an export filename with the given prefix and extension into its date and sequence
/// number. Returns `None` for any other file.
fn parse_export_name(filename: &str, prefix: &str, extension: &str) -> Option<(String, u32)> {
    let rest = filename
        .strip_prefix(prefix)?
        .strip_prefix('.')?
        .strip_suffix(&format!(".{extension}"))?;
    // What remains must be `YYYY-MM-DD-NNN`.
    let date = rest.get(..10)?;
    let sequence = rest.get(10..)?.strip_prefix('-')?;
    if sequence.is_empty() || !sequence.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((date.to_string(), sequence.parse().ok()?))
}
