use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub(crate) fn create_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)
        .with_context(|| format!("Unable to create directory {}", path.display()))
}

/// Replaces the whole file through a temporary sibling plus rename, so an
/// interrupted write never leaves a truncated table behind.
pub(crate) fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    std::fs::write(&tmp, contents).with_context(|| format!("Unable to write to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Unable to move {} into place", tmp.display()))
}

pub(crate) fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).with_context(|| format!("Unable to read file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.csv");

        write_atomic(&path, "first").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "first");

        write_atomic(&path, "second").unwrap();
        assert_eq!(read_to_string(&path).unwrap(), "second");

        // No temporary file left behind.
        assert!(!dir.path().join("table.csv.tmp").exists());
    }
}
