//! Service backends and process plumbing for Akshara.
//!
//! This crate implements the execution layer: the `ServiceBackend` trait with a
//! docker-compose backend and an in-memory mock, the cancellable `Context`
//! threaded through every blocking call, cross-process project locks, pull
//! progress parsing, container log forwarding, and prerequisite checking.

pub mod backend;
pub mod compose;
pub mod context;
pub mod lock;
pub mod logs;
pub mod mock;
pub mod prereq;
mod process;
pub mod progress;

pub use backend::{
    select_backend, ProgressFn, ServiceBackend, ServiceSpec, ServiceState, ServiceStatus,
    StartOptions,
};
pub use compose::ComposeBackend;
pub use context::{CancelHandle, CancelReason, Context};
pub use lock::{default_lock_dir, ProjectLock};
pub use logs::LogFollower;
pub use mock::{MockBackend, MockCalls};
pub use prereq::{check_compose_prereqs, format_missing, MissingPrereq};
pub use progress::{parse_progress_line, PullProgress};

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend '{0}' is not available on this system")]
    BackendUnavailable(String),
    #[error("command `{command}` failed{}: {stderr}", code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("compose file not found: {}", .0.display())]
    ComposeFileMissing(PathBuf),
    #[error("project '{project}' did not become ready within {waited:?}")]
    NotReady { project: String, waited: Duration },
    #[error("{0}")]
    Canceled(#[from] CancelReason),
    #[error("failed to parse backend output: {0}")]
    Parse(String),
    #[error("project lock error: {0}")]
    Lock(String),
}
