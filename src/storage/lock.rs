//! Single-writer lock for the data directory
//!
//! Mutating commands hold a `.lock` file for the duration of their
//! load-mutate-save cycle. The file is created with create-new semantics, so a
//! second invocation fails fast with `Locked` instead of interleaving writes.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};

/// Held lock; the lock file is removed on drop
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
}

impl LedgerLock {
    /// Acquire the lock at `path`
    pub fn acquire(path: &Path) -> LedgerResult<Self> {
        let file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(LedgerError::Locked(format!(
                    "{} exists; another command is running or a previous one crashed \
                     (remove the file if no other command is running)",
                    path.display()
                )));
            }
            Err(e) => {
                return Err(LedgerError::Io(format!(
                    "Failed to create lock file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Self::stamp(path, file)
    }

    /// Record the owner pid in a freshly created lock file
    ///
    /// The guard exists before the write, so a failed write still removes
    /// the file on drop.
    fn stamp<W: Write>(path: &Path, mut owner: W) -> LedgerResult<Self> {
        let lock = Self {
            path: path.to_path_buf(),
        };
        writeln!(owner, "{}", std::process::id())?;
        log::debug!("acquired {}", path.display());
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("failed to remove lock {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lock");

        let lock = LedgerLock::acquire(&path).unwrap();
        assert!(matches!(
            LedgerLock::acquire(&path),
            Err(LedgerError::Locked(_))
        ));

        drop(lock);
        assert!(!path.exists());
        assert!(LedgerLock::acquire(&path).is_ok());
    }

    struct BrokenDisk;

    impl Write for BrokenDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_pid_write_releases_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".lock");
        std::fs::write(&path, "").unwrap();

        let err = LedgerLock::stamp(&path, BrokenDisk).unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
        assert!(!path.exists());

        let lock = LedgerLock::acquire(&path).unwrap();
        assert!(lock.path().exists());
    }
}
