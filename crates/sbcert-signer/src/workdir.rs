//! Scoped change of the process working directory.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::warn;

/// Serialises every scoped change; the working directory is process-global.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Holds the process in `dir` until dropped, then restores the previous
/// working directory.
pub(crate) struct ScopedWorkingDir {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedWorkingDir {
    pub(crate) fn enter(dir: &Path) -> io::Result<Self> {
        let lock = CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self {
            previous,
            _lock: lock,
        })
    }
}

impl Drop for ScopedWorkingDir {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            warn!(
                "cannot restore working directory {}: {e}",
                self.previous.display()
            );
        }
    }
}
