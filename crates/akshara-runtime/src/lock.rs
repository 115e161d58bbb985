use crate::context::Context;
use crate::RuntimeError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Advisory lock on one project identity, shared across processes.
///
/// Lifecycle operations hold it so two managers pointing at the same compose
/// project cannot tear each other's containers down mid-start.
pub struct ProjectLock {
    lock_file: File,
    path: PathBuf,
}

impl ProjectLock {
    /// Acquire the lock for `project`, waiting while `ctx` is live.
    pub fn acquire(lock_dir: &Path, project: &str, ctx: &Context) -> Result<Self, RuntimeError> {
        let path = lock_path(lock_dir, project);
        let mut logged = false;
        loop {
            if let Some(lock) = Self::try_acquire_path(&path)? {
                return Ok(lock);
            }
            if !logged {
                debug!("waiting for project lock {}", path.display());
                logged = true;
            }
            ctx.sleep(RETRY_INTERVAL)?;
        }
    }

    pub fn try_acquire(lock_dir: &Path, project: &str) -> Result<Option<Self>, RuntimeError> {
        Self::try_acquire_path(&lock_path(lock_dir, project))
    }

    fn try_acquire_path(path: &Path) -> Result<Option<Self>, RuntimeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RuntimeError::Lock(format!("{}: {e}", parent.display())))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| RuntimeError::Lock(format!("{}: {e}", path.display())))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                lock_file: file,
                path: path.to_path_buf(),
            })),
            Err(_) => Ok(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
    }
}

/// `$TMPDIR/akshara-locks`.
pub fn default_lock_dir() -> PathBuf {
    std::env::temp_dir().join("akshara-locks")
}

fn lock_path(lock_dir: &Path, project: &str) -> PathBuf {
    let safe: String = project
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    lock_dir.join(format!("{safe}.lock"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CancelReason;

    #[test]
    fn lock_acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        {
            let lock = ProjectLock::acquire(dir.path(), "aksharamukha", &Context::background())
                .unwrap();
            assert!(lock.path().exists());
        }
        assert!(ProjectLock::try_acquire(dir.path(), "aksharamukha")
            .unwrap()
            .is_some());
    }

    #[test]
    fn try_acquire_returns_none_when_held() {
        let dir = tempfile::tempdir().unwrap();
        let _lock = ProjectLock::try_acquire(dir.path(), "p").unwrap().unwrap();
        assert!(ProjectLock::try_acquire(dir.path(), "p").unwrap().is_none());
        assert!(ProjectLock::try_acquire(dir.path(), "other").unwrap().is_some());
    }

    #[test]
    fn acquire_honours_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let _held = ProjectLock::try_acquire(dir.path(), "p").unwrap().unwrap();
        let ctx = Context::background().with_timeout(Duration::from_millis(100));
        let err = ProjectLock::acquire(dir.path(), "p", &ctx).err().unwrap();
        assert!(matches!(
            err,
            RuntimeError::Canceled(CancelReason::DeadlineExceeded)
        ));
    }

    #[test]
    fn acquire_waits_for_release() {
        let dir = tempfile::tempdir().unwrap();
        let held = ProjectLock::try_acquire(dir.path(), "p").unwrap().unwrap();
        let releaser = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            drop(held);
        });
        let lock = ProjectLock::acquire(dir.path(), "p", &Context::background());
        assert!(lock.is_ok());
        releaser.join().unwrap();
    }

    #[test]
    fn project_names_are_sanitized() {
        let path = lock_path(Path::new("/locks"), "a/b c");
        assert_eq!(path, Path::new("/locks/a_b_c.lock"));
    }
}
