//! Working-directory scope
//!
//! Some kernels resolve input and output files against the process working
//! directory. Calls into them run inside a `WorkingDirGuard`, which switches
//! to the simulation directory and switches back when dropped, on success
//! and failure alike.
//!
//! The working directory is process-wide state. Guards serialise on one
//! process-wide lock, so at most one path-sensitive call sequence is in
//! flight per process. Guards must not be nested.

use crate::error::XmiResult;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Restores the previous working directory on drop
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
    // Released after the directory is restored (fields drop after `drop`).
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    /// Switch to `dir`, remembering the current directory
    pub fn enter(dir: &Path) -> XmiResult<Self> {
        let lock = CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        tracing::trace!(from = %previous.display(), to = %dir.display(), "entered working directory");
        Ok(Self {
            previous,
            _lock: lock,
        })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::error!(
                dir = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

/// Run `f` with `dir` as the working directory
pub fn with_working_dir<T>(dir: &Path, f: impl FnOnce() -> XmiResult<T>) -> XmiResult<T> {
    let _guard = WorkingDirGuard::enter(dir)?;
    f()
}
