//! Rotating file backups taken before each ledger overwrite.
//!
//! Every write replaces the whole backing file, so a copy of the previous
//! contents is kept first. Filenames are `{name}.YYYY-MM-DD-NNN` where NNN
//! is a per-day sequence number; only the newest `copies` files per ledger
//! are retained.

use crate::Result;
use anyhow::{anyhow, Context};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Manages backup snapshot creation and rotation for the ledger files.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            copies,
        }
    }

    /// Copies `source` into the backups directory, then rotates old copies.
    ///
    /// A missing source (nothing written yet) is not an error, and setting
    /// `copies` to zero disables snapshots entirely.
    pub fn snapshot(&self, source: &Path) -> Result<()> {
        if self.copies == 0 || !source.is_file() {
            return Ok(());
        }

        let name = source
            .file_name()
            .ok_or_else(|| anyhow!("backup source {} has no file name", source.display()))?
            .to_string_lossy()
            .to_string();
        let date = today();
        let seq = self.next_sequence_number(&name, &date)?;
        let target = self.backups_dir.join(format!("{name}.{date}-{seq:03}"));

        std::fs::copy(source, &target).with_context(|| {
            format!(
                "Unable to copy {} to backup {}",
                source.display(),
                target.display()
            )
        })?;
        tracing::debug!("backup written to {}", target.display());

        self.rotate(&name)
    }

    /// Scans the backups directory for files with the given prefix and date
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;
        for entry in self.read_backups_dir()? {
            let entry = entry.context("Failed to read directory entry")?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Deletes the oldest backups with the given prefix, keeping `copies`.
    fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();
        for entry in self.read_backups_dir()? {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(&format!("{prefix}.")) {
                files.push((entry.path(), name));
            }
        }

        // The filename format sorts by date and sequence number.
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            std::fs::remove_file(&path)
                .with_context(|| format!("Unable to delete old backup {}", path.display()))?;
        }
        Ok(())
    }

    fn read_backups_dir(&self) -> Result<std::fs::ReadDir> {
        std::fs::read_dir(&self.backups_dir).with_context(|| {
            format!(
                "Unable to read backups directory {}",
                self.backups_dir.display()
            )
        })
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename; `None` when the name
/// does not match `{prefix}.{date}-{NNN}`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let expected_start = format!("{prefix}.{date}-");
    filename.strip_prefix(&expected_start)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("gastos.csv.2024-05-20-001", "gastos.csv", "2024-05-20"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("gastos.csv.2024-05-20-042", "gastos.csv", "2024-05-20"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("despesas.csv.2024-05-20-001", "gastos.csv", "2024-05-20"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("gastos.csv.2024-05-19-001", "gastos.csv", "2024-05-20"),
            None
        );
    }

    #[test]
    fn test_snapshot_and_rotate() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join("backups");
        std::fs::create_dir(&backups).unwrap();
        let source = dir.path().join("gastos.csv");
        std::fs::write(&source, "data").unwrap();

        let backup = Backup::new(&backups, 2);
        for _ in 0..4 {
            backup.snapshot(&source).unwrap();
        }

        let count = std::fs::read_dir(&backups).unwrap().count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_snapshot_missing_source_is_ok() {
        let dir = TempDir::new().unwrap();
        let backup = Backup::new(dir.path(), 3);
        backup.snapshot(&dir.path().join("nope.csv")).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_zero_copies_disables_snapshots() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("gastos.csv");
        std::fs::write(&source, "data").unwrap();

        let backup = Backup::new(dir.path(), 0);
        backup.snapshot(&source).unwrap();
        // Only the source file itself.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
