use crate::backend::{ProgressFn, ServiceBackend, ServiceSpec, ServiceState, ServiceStatus, StartOptions};
use crate::context::Context;
use crate::logs::LogFollower;
use crate::prereq::{
    check_compose_prereqs, compose_plugin_available, standalone_compose_available, MissingPrereq,
};
use crate::process::{self, describe};
use crate::progress::parse_progress_line;
use crate::RuntimeError;
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::process::Command;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Lines per service fetched by each readiness probe.
const READY_LOG_TAIL: &str = "500";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    /// `docker compose`
    Plugin,
    /// `docker-compose`
    Standalone,
}

/// Backend driving a compose project through the docker CLI.
pub struct ComposeBackend {
    flavor: OnceLock<Flavor>,
    poll_interval: Duration,
    /// Program and leading arguments standing in for `docker`.
    docker: Vec<OsString>,
    /// When `start` last ran, per project. Readiness only trusts log lines
    /// written after it, since stopped containers keep their old output.
    started_at: Mutex<HashMap<String, SystemTime>>,
}

impl Default for ComposeBackend {
    fn default() -> Self {
        Self {
            flavor: OnceLock::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            docker: vec![OsString::from("docker")],
            started_at: Mutex::new(HashMap::new()),
        }
    }
}

impl ComposeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn flavor(&self) -> Flavor {
        *self.flavor.get_or_init(|| {
            if !compose_plugin_available() && standalone_compose_available() {
                Flavor::Standalone
            } else {
                Flavor::Plugin
            }
        })
    }

    fn compose(&self, spec: &ServiceSpec) -> Command {
        let mut cmd = match self.flavor() {
            Flavor::Plugin => {
                let mut c = match self.docker.split_first() {
                    Some((program, args)) => {
                        let mut c = Command::new(program);
                        c.args(args);
                        c
                    }
                    None => Command::new("docker"),
                };
                c.arg("compose");
                c
            }
            Flavor::Standalone => Command::new("docker-compose"),
        };
        cmd.args(["--project-name", &spec.project, "--file", &spec.compose_file])
            .current_dir(&spec.compose_dir);
        cmd
    }

    fn is_checked_out(spec: &ServiceSpec) -> bool {
        spec.compose_path().is_file()
    }

    fn started_at(&self, project: &str) -> Option<SystemTime> {
        self.started_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(project)
            .copied()
    }

    /// Recent log lines, limited to those written since the last `start`.
    fn ready_logs_command(&self, spec: &ServiceSpec) -> Command {
        let mut cmd = self.compose(spec);
        cmd.args(["logs", "--no-color"]);
        if let Some(since) = self.started_at(&spec.project) {
            cmd.args(["--since", &since_arg(since)]);
        }
        cmd.args(["--tail", READY_LOG_TAIL]);
        cmd
    }

    fn probe(&self, spec: &ServiceSpec, ctx: &Context) -> Result<bool, RuntimeError> {
        let status = self.status(spec, ctx)?;
        if !status.all_ready(&spec.services) {
            return Ok(false);
        }
        match &spec.ready_marker {
            Some(marker) => {
                let output = process::run(self.ready_logs_command(spec), ctx, None)?;
                Ok(output.stdout.contains(marker.as_str()))
            }
            None => Ok(true),
        }
    }
}

impl ServiceBackend for ComposeBackend {
    fn name(&self) -> &'static str {
        "compose"
    }

    fn available(&self) -> bool {
        compose_plugin_available() || standalone_compose_available()
    }

    fn missing_prereqs(&self) -> Vec<MissingPrereq> {
        check_compose_prereqs()
    }

    fn prepare(&self, spec: &ServiceSpec, update: bool, ctx: &Context) -> Result<(), RuntimeError> {
        let is_repo = spec.compose_dir.join(".git").is_dir();

        if !is_repo && !Self::is_checked_out(spec) {
            if let Some(parent) = spec.compose_dir.parent() {
                std::fs::create_dir_all(parent)?;
            }
            info!(
                "cloning {} into {}",
                spec.remote_repo,
                spec.compose_dir.display()
            );
            let mut cmd = Command::new("git");
            cmd.args(["clone", "--depth", "1", &spec.remote_repo])
                .arg(&spec.compose_dir);
            process::run(cmd, ctx, None)?;
        } else if update && is_repo {
            info!("updating compose checkout in {}", spec.compose_dir.display());
            let mut cmd = Command::new("git");
            cmd.arg("-C")
                .arg(&spec.compose_dir)
                .args(["pull", "--ff-only"]);
            process::run(cmd, ctx, None)?;
        }

        if !Self::is_checked_out(spec) {
            return Err(RuntimeError::ComposeFileMissing(spec.compose_path()));
        }
        Ok(())
    }

    fn start(
        &self,
        spec: &ServiceSpec,
        opts: StartOptions,
        ctx: &Context,
    ) -> Result<(), RuntimeError> {
        let mut cmd = self.compose(spec);
        cmd.args(["up", "--detach"]);
        if opts.build {
            cmd.arg("--build");
        }
        if opts.pull_latest {
            cmd.args(["--pull", "always"]);
        }
        if opts.quiet {
            cmd.arg("--quiet-pull");
        }
        self.started_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(spec.project.clone(), SystemTime::now());
        process::run(cmd, ctx, None)?;
        Ok(())
    }

    fn wait_ready(
        &self,
        spec: &ServiceSpec,
        timeout: Duration,
        ctx: &Context,
    ) -> Result<(), RuntimeError> {
        let started = Instant::now();
        let bounded = ctx.with_timeout(timeout);
        let gave_up = || match ctx.err() {
            Some(reason) => RuntimeError::Canceled(reason),
            None => RuntimeError::NotReady {
                project: spec.project.clone(),
                waited: started.elapsed(),
            },
        };

        loop {
            match self.probe(spec, &bounded) {
                Ok(true) => {
                    debug!("project {} ready after {:?}", spec.project, started.elapsed());
                    return Ok(());
                }
                Ok(false) => {}
                Err(RuntimeError::Canceled(_)) => return Err(gave_up()),
                Err(e) => debug!("readiness probe failed: {e}"),
            }
            if bounded.sleep(self.poll_interval).is_err() {
                return Err(gave_up());
            }
        }
    }

    fn stop(&self, spec: &ServiceSpec, ctx: &Context) -> Result<(), RuntimeError> {
        if !Self::is_checked_out(spec) {
            debug!("nothing to stop: {} has no compose file", spec.project);
            return Ok(());
        }
        let mut cmd = self.compose(spec);
        cmd.arg("stop");
        process::run(cmd, ctx, None)?;
        Ok(())
    }

    fn remove(&self, spec: &ServiceSpec, ctx: &Context) -> Result<(), RuntimeError> {
        if !Self::is_checked_out(spec) {
            debug!("nothing to remove: {} has no compose file", spec.project);
            return Ok(());
        }
        let mut cmd = self.compose(spec);
        cmd.args(["down", "--remove-orphans"]);
        process::run(cmd, ctx, None)?;
        Ok(())
    }

    fn pull(
        &self,
        spec: &ServiceSpec,
        progress: Option<&ProgressFn>,
        ctx: &Context,
    ) -> Result<(), RuntimeError> {
        if !Self::is_checked_out(spec) {
            return Err(RuntimeError::ComposeFileMissing(spec.compose_path()));
        }
        let mut cmd = self.compose(spec);
        cmd.arg("pull");

        let mut report = |line: &str| {
            let Some(cb) = progress else { return };
            if let Some(p) = parse_progress_line(line) {
                let status = match &p.layer {
                    Some(layer) => format!("{} {layer}", p.status),
                    None => p.status,
                };
                cb(p.current, p.total, &status);
            }
        };
        process::run(cmd, ctx, Some(&mut report))?;
        Ok(())
    }

    fn status(&self, spec: &ServiceSpec, ctx: &Context) -> Result<ServiceStatus, RuntimeError> {
        if !Self::is_checked_out(spec) {
            return Ok(ServiceStatus::new(&spec.project, Vec::new(), &spec.services));
        }
        let mut cmd = self.compose(spec);
        cmd.args(["ps", "--all", "--format", "json"]);
        let output = process::run(cmd, ctx, None)?;
        let services = parse_ps_output(&output.stdout)?;
        Ok(ServiceStatus::new(&spec.project, services, &spec.services))
    }

    fn logs(
        &self,
        spec: &ServiceSpec,
        tail: usize,
        ctx: &Context,
    ) -> Result<String, RuntimeError> {
        if !Self::is_checked_out(spec) {
            return Ok(String::new());
        }
        let tail = if tail == 0 {
            "all".to_owned()
        } else {
            tail.to_string()
        };
        let mut cmd = self.compose(spec);
        cmd.args(["logs", "--no-color", "--tail", &tail]);
        let output = process::run(cmd, ctx, None)?;
        Ok(output.stdout)
    }

    fn follow_logs(&self, spec: &ServiceSpec) -> Option<LogFollower> {
        if !Self::is_checked_out(spec) {
            return None;
        }
        let mut cmd = self.compose(spec);
        cmd.args(["logs", "--follow", "--no-color", "--tail", "0"]);
        let command = describe(&cmd);
        match LogFollower::spawn(&spec.project, cmd) {
            Ok(follower) => Some(follower),
            Err(e) => {
                warn!("could not follow logs with `{command}`: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    service: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    health: Option<String>,
}

impl From<PsEntry> for ServiceState {
    fn from(e: PsEntry) -> Self {
        Self {
            name: if e.service.is_empty() { e.name } else { e.service },
            state: e.state,
            health: e.health.filter(|h| !h.is_empty()),
        }
    }
}

/// `--since` value for docker: Unix seconds with nanosecond fraction.
fn since_arg(at: SystemTime) -> String {
    let elapsed = at.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:09}", elapsed.as_secs(), elapsed.subsec_nanos())
}

/// Parse `compose ps --format json`, which is a JSON array in older compose
/// releases and one object per line in newer ones.
fn parse_ps_output(output: &str) -> Result<Vec<ServiceState>, RuntimeError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<PsEntry> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| RuntimeError::Parse(format!("compose ps output: {e}")))?
    } else {
        trimmed
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .map_err(|e| RuntimeError::Parse(format!("compose ps line: {e}")))
            })
            .collect::<Result<_, _>>()?
    };
    Ok(entries.into_iter().map(ServiceState::from).collect())
}
