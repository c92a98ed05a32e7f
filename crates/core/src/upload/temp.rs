//! Scoped removal of temporary upload files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Removes a temporary file when dropped.
///
/// Dropping runs on every exit path, including a cancelled request future.
#[derive(Debug)]
pub struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    /// Guard `path`; `None` guards nothing.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Guarded path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temp upload file"),
        }
    }
}
