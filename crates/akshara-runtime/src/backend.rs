use crate::context::Context;
use crate::logs::LogFollower;
use crate::prereq::MissingPrereq;
use crate::RuntimeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Download progress callback: `(current_bytes, total_bytes, status)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64, &str) + Send + Sync>;

/// Everything a backend needs to address one project instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceSpec {
    pub project: String,
    pub compose_dir: PathBuf,
    pub compose_file: String,
    pub remote_repo: String,
    pub services: Vec<String>,
    pub ready_marker: Option<String>,
    pub endpoint: String,
}

impl ServiceSpec {
    pub fn compose_path(&self) -> PathBuf {
        self.compose_dir.join(&self.compose_file)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    pub build: bool,
    pub pull_latest: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceState {
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
}

impl ServiceState {
    pub fn is_running(&self) -> bool {
        self.state.eq_ignore_ascii_case("running")
    }

    /// Running, and healthy if the service declares a healthcheck.
    pub fn is_ready(&self) -> bool {
        self.is_running()
            && self
                .health
                .as_deref()
                .is_none_or(|h| h.is_empty() || h.eq_ignore_ascii_case("healthy"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStatus {
    pub project: String,
    pub services: Vec<ServiceState>,
    pub running: bool,
}

impl ServiceStatus {
    /// Build a status where `running` means every required service runs.
    pub fn new(project: &str, services: Vec<ServiceState>, required: &[String]) -> Self {
        let running = !services.is_empty()
            && required.iter().all(|name| {
                services
                    .iter()
                    .any(|s| &s.name == name && s.is_running())
            });
        Self {
            project: project.to_owned(),
            services,
            running,
        }
    }

    pub fn all_ready(&self, required: &[String]) -> bool {
        required.iter().all(|name| {
            self.services
                .iter()
                .any(|s| &s.name == name && s.is_ready())
        })
    }
}

/// Lifecycle operations on one containerized service project.
///
/// Every blocking method takes a [`Context`] and returns
/// [`RuntimeError::Canceled`] promptly once it ends.
pub trait ServiceBackend: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    /// Host tools this backend needs that are not installed.
    fn missing_prereqs(&self) -> Vec<MissingPrereq> {
        Vec::new()
    }

    /// Make sure the compose definition exists locally, fetching the latest
    /// revision when `update` is set.
    fn prepare(&self, spec: &ServiceSpec, update: bool, ctx: &Context) -> Result<(), RuntimeError>;

    /// Bring the project up detached. Attaches when it is already up.
    fn start(
        &self,
        spec: &ServiceSpec,
        opts: StartOptions,
        ctx: &Context,
    ) -> Result<(), RuntimeError>;

    /// Block until every required service is ready, or fail after `timeout`.
    fn wait_ready(
        &self,
        spec: &ServiceSpec,
        timeout: Duration,
        ctx: &Context,
    ) -> Result<(), RuntimeError>;

    /// Halt containers without removing them.
    fn stop(&self, spec: &ServiceSpec, ctx: &Context) -> Result<(), RuntimeError>;

    /// Tear down the project's containers and networks.
    fn remove(&self, spec: &ServiceSpec, ctx: &Context) -> Result<(), RuntimeError>;

    fn pull(
        &self,
        spec: &ServiceSpec,
        progress: Option<&ProgressFn>,
        ctx: &Context,
    ) -> Result<(), RuntimeError>;

    fn status(&self, spec: &ServiceSpec, ctx: &Context) -> Result<ServiceStatus, RuntimeError>;

    fn logs(&self, spec: &ServiceSpec, tail: usize, ctx: &Context)
        -> Result<String, RuntimeError>;

    /// Forward container output to `tracing` until the returned follower is dropped.
    fn follow_logs(&self, _spec: &ServiceSpec) -> Option<LogFollower> {
        None
    }
}

pub fn select_backend(name: &str) -> Result<Arc<dyn ServiceBackend>, RuntimeError> {
    match name {
        "compose" | "docker" => Ok(Arc::new(crate::compose::ComposeBackend::new())),
        "mock" => Ok(Arc::new(crate::mock::MockBackend::new())),
        other => Err(RuntimeError::BackendUnavailable(other.to_owned())),
    }
}
