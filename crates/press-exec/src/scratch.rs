//! Per-request scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::ExecError;

/// Temporary directory owned by a single conversion.
///
/// Removed on drop on every exit path. A failed removal is logged and
/// otherwise ignored.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory under the system temp dir.
    pub fn new(prefix: &str) -> Result<Self, ExecError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|source| ExecError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let path = dir.path().to_path_buf();
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `name` inside the directory.
    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Write `contents` to `name` and return its path.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf, ExecError> {
        let path = self.file(name);
        std::fs::write(&path, contents).map_err(|source| ExecError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Read `name` back, or `None` if it was never produced.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>, ExecError> {
        let path = self.file(name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ExecError::Io { path, source }),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take()
            && let Err(e) = dir.close()
        {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove scratch directory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_and_read() {
        let scratch = ScratchDir::new("press-test-").unwrap();
        let path = scratch.write("input.md", "# Hello").unwrap();
        assert!(path.starts_with(scratch.path()));
        assert_eq!(scratch.read("input.md").unwrap(), Some(b"# Hello".to_vec()));
    }

    #[test]
    fn test_read_missing_is_none() {
        let scratch = ScratchDir::new("press-test-").unwrap();
        assert_eq!(scratch.read("never-written.pdf").unwrap(), None);
    }

    #[test]
    fn test_removed_on_drop() {
        let scratch = ScratchDir::new("press-test-").unwrap();
        scratch.write("a.txt", "a").unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_removed_on_error_path() {
        fn failing(path: &mut PathBuf) -> Result<(), ExecError> {
            let scratch = ScratchDir::new("press-test-")?;
            *path = scratch.path().to_path_buf();
            scratch.write("partial.png", [0u8; 4])?;
            Err(ExecError::Timeout {
                program: "mmdc".to_owned(),
                timeout: std::time::Duration::from_secs(1),
            })
        }

        let mut path = PathBuf::new();
        assert!(failing(&mut path).is_err());
        assert!(!path.as_os_str().is_empty());
        assert!(!path.exists());
    }
}
