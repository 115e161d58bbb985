use crate::backend::{ProgressFn, ServiceBackend, ServiceSpec, ServiceState, ServiceStatus, StartOptions};
use crate::context::Context;
use crate::prereq::MissingPrereq;
use crate::RuntimeError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory backend for tests and offline development.
///
/// Projects are keyed by name, so managers sharing one `MockBackend` and a
/// project identity observe the same instance.
pub struct MockBackend {
    state: Mutex<HashMap<String, MockProject>>,
    ready_delay: Duration,
    fail_start: AtomicBool,
    never_ready: AtomicBool,
    missing_prereq: AtomicBool,
    failing_pulls: AtomicU32,
    calls: Counters,
}

#[derive(Debug, Clone, Default)]
struct MockProject {
    prepared: bool,
    pulled: bool,
    running: bool,
    started_at: Option<Instant>,
}

#[derive(Default)]
struct Counters {
    prepare: AtomicUsize,
    start: AtomicUsize,
    wait_ready: AtomicUsize,
    stop: AtomicUsize,
    remove: AtomicUsize,
    pull: AtomicUsize,
}

/// Snapshot of how often each backend operation was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub prepare: usize,
    pub start: usize,
    pub wait_ready: usize,
    pub stop: usize,
    pub remove: usize,
    pub pull: usize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            state: Mutex::new(HashMap::new()),
            ready_delay: Duration::ZERO,
            fail_start: AtomicBool::new(false),
            never_ready: AtomicBool::new(false),
            missing_prereq: AtomicBool::new(false),
            failing_pulls: AtomicU32::new(0),
            calls: Counters::default(),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services report ready only once `delay` has passed since `start`.
    #[must_use]
    pub fn with_ready_delay(mut self, delay: Duration) -> Self {
        self.ready_delay = delay;
        self
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    pub fn set_never_ready(&self, never: bool) {
        self.never_ready.store(never, Ordering::SeqCst);
    }

    /// Report a missing host tool from [`ServiceBackend::missing_prereqs`].
    pub fn set_missing_prereq(&self, missing: bool) {
        self.missing_prereq.store(missing, Ordering::SeqCst);
    }

    /// Fail the next `count` pulls.
    pub fn fail_next_pulls(&self, count: u32) {
        self.failing_pulls.store(count, Ordering::SeqCst);
    }

    pub fn calls(&self) -> MockCalls {
        let c = &self.calls;
        MockCalls {
            prepare: c.prepare.load(Ordering::SeqCst),
            start: c.start.load(Ordering::SeqCst),
            wait_ready: c.wait_ready.load(Ordering::SeqCst),
            stop: c.stop.load(Ordering::SeqCst),
            remove: c.remove.load(Ordering::SeqCst),
            pull: c.pull.load(Ordering::SeqCst),
        }
    }

    pub fn is_running(&self, project: &str) -> bool {
        self.state
            .lock()
            .is_ok_and(|s| s.get(project).is_some_and(|p| p.running))
    }

    pub fn is_prepared(&self, project: &str) -> bool {
        self.state
            .lock()
            .is_ok_and(|s| s.get(project).is_some_and(|p| p.prepared))
    }

    /// Whether images were pulled since the project was last removed.
    pub fn was_pulled(&self, project: &str) -> bool {
        self.state
            .lock()
            .is_ok_and(|s| s.get(project).is_some_and(|p| p.pulled))
    }

    fn with_project<T>(
        &self,
        project: &str,
        f: impl FnOnce(&mut MockProject) -> T,
    ) -> Result<T, RuntimeError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| RuntimeError::BackendUnavailable(format!("mutex poisoned: {e}")))?;
        Ok(f(state.entry(project.to_owned()).or_default()))
    }

    fn failure(command: &str, stderr: &str) -> RuntimeError {
        RuntimeError::CommandFailed {
            command: format!("mock {command}"),
            code: Some(1),
            stderr: stderr.to_owned(),
        }
    }
}

impl ServiceBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn available(&self) -> bool {
        true
    }

    fn missing_prereqs(&self) -> Vec<MissingPrereq> {
        if !self.missing_prereq.load(Ordering::SeqCst) {
            return Vec::new();
        }
        vec![MissingPrereq {
            name: "mock-tool",
            purpose: "exercising prerequisite checks",
            install_hint: "MockBackend::set_missing_prereq(false)",
        }]
    }

    fn prepare(&self, spec: &ServiceSpec, _update: bool, ctx: &Context) -> Result<(), RuntimeError> {
        self.calls.prepare.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        self.with_project(&spec.project, |p| p.prepared = true)
    }

    fn start(
        &self,
        spec: &ServiceSpec,
        opts: StartOptions,
        ctx: &Context,
    ) -> Result<(), RuntimeError> {
        self.calls.start.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(Self::failure("up", "injected start failure"));
        }
        self.with_project(&spec.project, |p| {
            if opts.pull_latest {
                p.pulled = true;
            }
            if !p.running {
                p.running = true;
                p.started_at = Some(Instant::now());
            }
        })
    }

    fn wait_ready(
        &self,
        spec: &ServiceSpec,
        timeout: Duration,
        ctx: &Context,
    ) -> Result<(), RuntimeError> {
        self.calls.wait_ready.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();
        let bounded = ctx.with_timeout(timeout);
        loop {
            let ready_at = self.with_project(&spec.project, |p| {
                p.started_at.filter(|_| p.running)
            })?;
            let ready = !self.never_ready.load(Ordering::SeqCst)
                && ready_at.is_some_and(|t| t.elapsed() >= self.ready_delay);
            if ready {
                return Ok(());
            }
            if bounded.sleep(Duration::from_millis(5)).is_err() {
                return Err(match ctx.err() {
                    Some(reason) => RuntimeError::Canceled(reason),
                    None => RuntimeError::NotReady {
                        project: spec.project.clone(),
                        waited: started.elapsed(),
                    },
                });
            }
        }
    }

    fn stop(&self, spec: &ServiceSpec, ctx: &Context) -> Result<(), RuntimeError> {
        self.calls.stop.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        self.with_project(&spec.project, |p| {
            p.running = false;
            p.started_at = None;
        })
    }

    fn remove(&self, spec: &ServiceSpec, ctx: &Context) -> Result<(), RuntimeError> {
        self.calls.remove.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        let mut state = self
            .state
            .lock()
            .map_err(|e| RuntimeError::BackendUnavailable(format!("mutex poisoned: {e}")))?;
        state.remove(&spec.project);
        Ok(())
    }

    fn pull(
        &self,
        spec: &ServiceSpec,
        progress: Option<&ProgressFn>,
        ctx: &Context,
    ) -> Result<(), RuntimeError> {
        self.calls.pull.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        let injected = self
            .failing_pulls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(Self::failure("pull", "injected pull failure"));
        }
        const TOTAL: u64 = 1_000_000;
        if let Some(cb) = progress {
            for step in [0, TOTAL / 2, TOTAL] {
                cb(step, TOTAL, "Downloading mock-layer");
            }
        }
        self.with_project(&spec.project, |p| p.pulled = true)
    }

    fn status(&self, spec: &ServiceSpec, ctx: &Context) -> Result<ServiceStatus, RuntimeError> {
        ctx.check()?;
        let running = self.with_project(&spec.project, |p| p.running)?;
        let services = if running {
            spec.services
                .iter()
                .map(|name| ServiceState {
                    name: name.clone(),
                    state: "running".to_owned(),
                    health: None,
                })
                .collect()
        } else {
            Vec::new()
        };
        Ok(ServiceStatus::new(&spec.project, services, &spec.services))
    }

    fn logs(
        &self,
        spec: &ServiceSpec,
        tail: usize,
        ctx: &Context,
    ) -> Result<String, RuntimeError> {
        ctx.check()?;
        let running = self.with_project(&spec.project, |p| p.running)?;
        if !running {
            return Ok(String::new());
        }
        let mut lines: Vec<String> = spec
            .services
            .iter()
            .map(|s| format!("{s}-1 | mock service started"))
            .collect();
        if let Some(marker) = &spec.ready_marker {
            lines.push(format!("back-1 | {marker}"));
        }
        if tail > 0 && lines.len() > tail {
            lines.drain(..lines.len() - tail);
        }
        Ok(lines.join("\n"))
    }
}
