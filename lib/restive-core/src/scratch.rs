//! Best-effort scratch storage for diagnostics.

use std::fmt::Debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

/// A place where diagnostic payloads can be dropped.
///
/// Implementations must not overwrite unrelated files; names only need to be
/// unique per second, the last writer wins on collision.
pub trait ScratchStorage: Debug + Send + Sync {
    /// Write `bytes` under a name starting with `prefix`, returning where it landed.
    fn write_unique(&self, prefix: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes `<prefix>-<yyyyMMdd_HHmmss>.json` files into a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempDirStorage {
    dir: PathBuf,
}

impl TempDirStorage {
    /// Store files into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for `prefix` at the current local time.
    #[must_use]
    pub fn file_name(prefix: &str) -> String {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        format!("{prefix}-{timestamp}.json")
    }
}

impl Default for TempDirStorage {
    /// The system temporary directory.
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ScratchStorage for TempDirStorage {
    fn write_unique(&self, prefix: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        let target = self.dir.join(Self::file_name(prefix));

        // written next to the target then renamed, so readers never see a partial file
        let mut file = tempfile::NamedTempFile::new_in(&self.dir)?;
        file.write_all(bytes)?;
        file.persist(&target).map_err(|err| err.error)?;

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_pattern() {
        let name = TempDirStorage::file_name("DecodeFailed");
        let stamp = name
            .strip_prefix("DecodeFailed-")
            .and_then(|rest| rest.strip_suffix(".json"))
            .expect("prefix and extension");

        assert_eq!(stamp.len(), "yyyyMMdd_HHmmss".len());
        assert_eq!(stamp.chars().nth(8), Some('_'));
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn write_unique_creates_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = TempDirStorage::new(dir.path());

        let path = storage
            .write_unique("DecodeFailed", br#"{"id": 7}"#)
            .expect("write");

        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(std::fs::read(&path).expect("read back"), br#"{"id": 7}"#);
    }

    #[test]
    fn write_unique_reports_missing_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = TempDirStorage::new(dir.path().join("missing"));

        assert!(storage.write_unique("DecodeFailed", b"{}").is_err());
    }

    #[test]
    fn default_uses_system_temp_dir() {
        assert_eq!(TempDirStorage::default().dir(), std::env::temp_dir());
    }
}
