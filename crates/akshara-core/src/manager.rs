use crate::lifecycle::{validate_transition, ManagerState};
use crate::query::QueryClient;
use crate::CoreError;
use akshara_runtime::context::POLL_INTERVAL;
use akshara_runtime::{
    default_lock_dir, format_missing, select_backend, Context, LogFollower, MissingPrereq,
    ProgressFn, ProjectLock, RuntimeError, ServiceBackend, ServiceSpec, ServiceStatus,
    StartOptions,
};
use akshara_schema::{
    default_data_dir, ManagerSettings, Script, ScriptCatalog, ScriptRegistry, TranslitOptions,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_PROJECT: &str = "aksharamukha";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8085;
pub const DEFAULT_SERVICES: &[&str] = &["front", "back", "fonts"];
pub const DEFAULT_READY_MARKER: &str = "Listening at: http://0.0.0.0:8085";
pub const DEFAULT_REMOTE_REPO: &str = "https://github.com/virtualvinodh/aksharamukha.git";
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_PULL_RETRIES: u32 = 3;
pub const DEFAULT_PULL_BACKOFF: Duration = Duration::from_secs(2);
pub const API_PATH: &str = "/api/public";

/// Upper bound for backend cleanup that runs outside any caller context.
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(60);

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Owns one containerized Aksharamukha instance and the query path to it.
///
/// Lifecycle calls (`init`, `recreate`, `pull_images`, `stop`) are serialized
/// by an internal operation mutex: a second concurrent call blocks until the
/// first returns, or until its own context ends. Across processes the same
/// project identity is guarded by a [`ProjectLock`]. Queries only read the
/// current state and never wait on the operation mutex.
pub struct ServiceManager {
    id: u64,
    spec: ServiceSpec,
    base_url: String,
    backend: Arc<dyn ServiceBackend>,
    client: QueryClient,
    state: RwLock<ManagerState>,
    op: Mutex<OpState>,
    lock_dir: PathBuf,
    init_timeout: Duration,
    pull_retries: u32,
    pull_backoff: Duration,
    progress: Option<ProgressFn>,
    skip_prereqs: bool,
}

#[derive(Default)]
struct OpState {
    follower: Option<LogFollower>,
}

impl ServiceManager {
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// Process-unique identifier, distinct for every constructed manager.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn project(&self) -> &str {
        &self.spec.project
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn registry(&self) -> &dyn ScriptRegistry {
        self.client.registry()
    }

    /// Host tools the backend needs that are missing, regardless of `skip_prereqs`.
    pub fn missing_prereqs(&self) -> Vec<MissingPrereq> {
        self.backend.missing_prereqs()
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    pub fn state(&self) -> ManagerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ManagerState::Ready
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ManagerState::Closed
    }

    /// Start the service and wait until it answers, following its logs.
    ///
    /// On a manager that is already `Ready` this re-checks the backend and
    /// attaches when it still runs, restarting it otherwise.
    pub fn init(&self, ctx: &Context) -> Result<(), CoreError> {
        self.start_service(ctx, false)
    }

    /// Like [`init`](Self::init) without pull progress or log forwarding.
    pub fn init_quiet(&self, ctx: &Context) -> Result<(), CoreError> {
        self.start_service(ctx, true)
    }

    /// Tear the project down and rebuild it.
    ///
    /// With `force_pull_latest` the compose checkout is refreshed and the
    /// newest images are pulled first.
    pub fn recreate(&self, ctx: &Context, force_pull_latest: bool) -> Result<(), CoreError> {
        let mut op = self.lock_op(ctx)?;
        self.ensure_open()?;
        self.check_prereqs()?;
        let _lock = ProjectLock::acquire(&self.lock_dir, &self.spec.project, ctx)?;

        info!(
            "recreating project {}{}",
            self.spec.project,
            if force_pull_latest { " with latest images" } else { "" }
        );
        op.follower = None;
        self.transition(ManagerState::Initializing)?;
        let result = self.rebuild(ctx, force_pull_latest);
        self.finish_start(&mut op, result, false)
    }

    /// Download the service images, retrying with linear backoff.
    pub fn pull_images(&self, ctx: &Context) -> Result<(), CoreError> {
        let _op = self.lock_op(ctx)?;
        self.ensure_open()?;
        self.check_prereqs()?;
        let _lock = ProjectLock::acquire(&self.lock_dir, &self.spec.project, ctx)?;

        self.backend.prepare(&self.spec, false, ctx)?;
        self.pull_with_retries(ctx)
    }

    /// Halt the service. From `Created` this still stops any instance left
    /// running under the same project identity.
    pub fn stop(&self, ctx: &Context) -> Result<(), CoreError> {
        let mut op = self.lock_op(ctx)?;
        self.ensure_open()?;
        let _lock = ProjectLock::acquire(&self.lock_dir, &self.spec.project, ctx)?;

        self.backend.stop(&self.spec, ctx)?;
        op.follower = None;
        if self.state() == ManagerState::Ready {
            self.transition(ManagerState::Created)?;
        }
        info!("stopped project {}", self.spec.project);
        Ok(())
    }

    /// Stop the service if this manager started it and mark the manager closed.
    ///
    /// The manager is closed even when stopping fails; that error is returned
    /// once and later calls are no-ops.
    pub fn close(&self) -> Result<(), CoreError> {
        let mut op = self.op.lock().unwrap_or_else(PoisonError::into_inner);
        let state = self.state();
        if state == ManagerState::Closed {
            return Ok(());
        }

        op.follower = None;
        let result = if state == ManagerState::Ready {
            let ctx = Context::background().with_timeout(CLOSE_TIMEOUT);
            self.backend
                .stop(&self.spec, &ctx)
                .map_err(CoreError::from)
        } else {
            Ok(())
        };

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = ManagerState::Closed;
        match &result {
            Ok(()) => info!("closed manager for project {}", self.spec.project),
            Err(e) => warn!(
                "closed manager for project {} but stopping failed: {e}",
                self.spec.project
            ),
        }
        result
    }

    pub fn status(&self, ctx: &Context) -> Result<ServiceStatus, CoreError> {
        self.ensure_open()?;
        Ok(self.backend.status(&self.spec, ctx)?)
    }

    /// The last `tail` lines of container output; `0` returns everything.
    pub fn logs(&self, ctx: &Context, tail: usize) -> Result<String, CoreError> {
        self.ensure_open()?;
        Ok(self.backend.logs(&self.spec, tail, ctx)?)
    }

    /// Validate a transliteration request against the registry. Needs no
    /// running service.
    pub fn validate_request(
        &self,
        text: &str,
        from: Option<&Script>,
        to: &Script,
    ) -> Result<(), CoreError> {
        self.client.validate(text, from, to)
    }

    /// Transliterate `text` into `to`. Without `from` the service detects
    /// the source script.
    pub fn translit(
        &self,
        ctx: &Context,
        text: &str,
        from: Option<&Script>,
        to: &Script,
        opts: &TranslitOptions,
    ) -> Result<String, CoreError> {
        self.ensure_ready()?;
        self.client
            .transliterate(ctx, &self.base_url, text, from, to, opts)
    }

    /// Romanize `text` written in the primary script of `language_code`.
    pub fn roman(
        &self,
        ctx: &Context,
        text: &str,
        language_code: &str,
        opts: &TranslitOptions,
    ) -> Result<String, CoreError> {
        self.ensure_ready()?;
        self.client
            .romanize(ctx, &self.base_url, text, language_code, opts)
    }

    fn start_service(&self, ctx: &Context, quiet: bool) -> Result<(), CoreError> {
        let mut op = self.lock_op(ctx)?;
        match self.state() {
            ManagerState::Closed => return Err(CoreError::AlreadyClosed),
            ManagerState::Ready => {
                if self.backend.status(&self.spec, ctx)?.running {
                    debug!("project {} already running, attaching", self.spec.project);
                    return Ok(());
                }
                warn!(
                    "project {} is no longer running, starting it again",
                    self.spec.project
                );
            }
            ManagerState::Created | ManagerState::Initializing => {}
        }

        self.check_prereqs()?;
        let _lock = ProjectLock::acquire(&self.lock_dir, &self.spec.project, ctx)?;

        info!(
            "starting project {} via {}",
            self.spec.project,
            self.backend.name()
        );
        op.follower = None;
        self.transition(ManagerState::Initializing)?;
        let opts = StartOptions {
            build: false,
            pull_latest: false,
            quiet,
        };
        let result = self.bring_up(ctx, opts);
        self.finish_start(&mut op, result, quiet)
    }

    fn rebuild(&self, ctx: &Context, force_pull_latest: bool) -> Result<(), CoreError> {
        self.backend.remove(&self.spec, ctx)?;
        self.backend.prepare(&self.spec, force_pull_latest, ctx)?;
        if force_pull_latest {
            self.pull_with_retries(ctx)?;
        }
        let opts = StartOptions {
            build: true,
            pull_latest: force_pull_latest,
            quiet: false,
        };
        self.backend.start(&self.spec, opts, ctx)?;
        self.backend
            .wait_ready(&self.spec, self.init_timeout, ctx)?;
        Ok(())
    }

    fn bring_up(&self, ctx: &Context, opts: StartOptions) -> Result<(), CoreError> {
        self.backend.prepare(&self.spec, false, ctx)?;
        self.backend.start(&self.spec, opts, ctx)?;
        self.backend
            .wait_ready(&self.spec, self.init_timeout, ctx)?;
        Ok(())
    }

    /// Settle the state after a start attempt: `Ready` on success, otherwise
    /// a best-effort stop and back to `Created` so the call can be retried.
    fn finish_start(
        &self,
        op: &mut OpState,
        result: Result<(), CoreError>,
        quiet: bool,
    ) -> Result<(), CoreError> {
        match result {
            Ok(()) => {
                self.transition(ManagerState::Ready)?;
                info!("project {} ready at {}", self.spec.project, self.base_url);
                if !quiet {
                    op.follower = self.backend.follow_logs(&self.spec);
                }
                Ok(())
            }
            Err(e) => {
                warn!("starting project {} failed: {e}", self.spec.project);
                let cleanup = Context::background().with_timeout(CLEANUP_TIMEOUT);
                if let Err(stop_err) = self.backend.stop(&self.spec, &cleanup) {
                    warn!("cleanup after failed start also failed: {stop_err}");
                }
                self.transition(ManagerState::Created)?;
                Err(e)
            }
        }
    }

    fn pull_with_retries(&self, ctx: &Context) -> Result<(), CoreError> {
        let attempts = self.pull_retries.max(1);
        let mut attempt = 1;
        loop {
            match self
                .backend
                .pull(&self.spec, self.progress.as_ref(), ctx)
            {
                Ok(()) => {
                    info!("pulled images for project {}", self.spec.project);
                    return Ok(());
                }
                Err(RuntimeError::Canceled(reason)) => return Err(CoreError::Canceled(reason)),
                Err(e) if attempt < attempts => {
                    let backoff = self.pull_backoff * attempt;
                    warn!("pull attempt {attempt}/{attempts} failed: {e}; retrying in {backoff:?}");
                    ctx.sleep(backoff)?;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn check_prereqs(&self) -> Result<(), CoreError> {
        if self.skip_prereqs {
            return Ok(());
        }
        let missing = self.backend.missing_prereqs();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingPrereqs(format_missing(&missing)))
        }
    }

    fn transition(&self, to: ManagerState) -> Result<(), CoreError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        validate_transition(*state, to)?;
        debug!("manager {}: {} -> {to}", self.id, *state);
        *state = to;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.is_closed() {
            Err(CoreError::AlreadyClosed)
        } else {
            Ok(())
        }
    }

    fn ensure_ready(&self) -> Result<(), CoreError> {
        match self.state() {
            ManagerState::Ready => Ok(()),
            ManagerState::Closed => Err(CoreError::AlreadyClosed),
            ManagerState::Created | ManagerState::Initializing => Err(CoreError::NotInitialized),
        }
    }

    fn lock_op(&self, ctx: &Context) -> Result<MutexGuard<'_, OpState>, CoreError> {
        loop {
            match self.op.try_lock() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(poisoned)) => return Ok(poisoned.into_inner()),
                Err(TryLockError::WouldBlock) => ctx.sleep(POLL_INTERVAL)?,
            }
        }
    }
}

/// Configures a [`ServiceManager`]. Options apply in call order; later calls
/// override earlier ones.
#[derive(Default)]
pub struct ManagerBuilder {
    project_name: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    compose_dir: Option<PathBuf>,
    compose_file: Option<String>,
    remote_repo: Option<String>,
    services: Option<Vec<String>>,
    ready_marker: Option<Option<String>>,
    query_timeout: Option<Duration>,
    init_timeout: Option<Duration>,
    pull_retries: Option<u32>,
    pull_backoff: Option<Duration>,
    progress: Option<ProgressFn>,
    backend: Option<Arc<dyn ServiceBackend>>,
    backend_name: Option<String>,
    registry: Option<Arc<dyn ScriptRegistry>>,
    lock_dir: Option<PathBuf>,
    skip_prereqs: bool,
}

impl ManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn compose_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.compose_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn compose_file(mut self, file: impl Into<String>) -> Self {
        self.compose_file = Some(file.into());
        self
    }

    #[must_use]
    pub fn remote_repo(mut self, repo: impl Into<String>) -> Self {
        self.remote_repo = Some(repo.into());
        self
    }

    #[must_use]
    pub fn services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services = Some(services.into_iter().map(Into::into).collect());
        self
    }

    /// Log line that marks the service as ready; `None` relies on container
    /// state alone.
    #[must_use]
    pub fn ready_marker(mut self, marker: Option<&str>) -> Self {
        self.ready_marker = Some(marker.map(str::to_owned));
        self
    }

    #[must_use]
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn pull_retries(mut self, retries: u32) -> Self {
        self.pull_retries = Some(retries);
        self
    }

    /// Base delay between pull attempts; attempt `n` waits `n` times this.
    #[must_use]
    pub fn pull_backoff(mut self, backoff: Duration) -> Self {
        self.pull_backoff = Some(backoff);
        self
    }

    /// Receive `(current_bytes, total_bytes, status)` while images download.
    #[must_use]
    pub fn progress(mut self, callback: impl Fn(u64, u64, &str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn ServiceBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Select a backend by name (`compose`, `docker` or `mock`).
    #[must_use]
    pub fn backend_name(mut self, name: impl Into<String>) -> Self {
        self.backend = None;
        self.backend_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: Arc<dyn ScriptRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn skip_prereqs(mut self, skip: bool) -> Self {
        self.skip_prereqs = skip;
        self
    }

    /// Apply every field a settings file sets; unset fields are left alone.
    #[must_use]
    pub fn settings(mut self, settings: ManagerSettings) -> Self {
        let ManagerSettings {
            project_name,
            host,
            port,
            backend,
            compose_dir,
            remote_repo,
            query_timeout_secs,
            init_timeout_secs,
            pull_retries,
            skip_prereqs,
        } = settings;

        if let Some(v) = project_name {
            self = self.project_name(v);
        }
        if let Some(v) = host {
            self = self.host(v);
        }
        if let Some(v) = port {
            self = self.port(v);
        }
        if let Some(v) = backend {
            self = self.backend_name(v);
        }
        if let Some(v) = compose_dir {
            self = self.compose_dir(v);
        }
        if let Some(v) = remote_repo {
            self = self.remote_repo(v);
        }
        if let Some(secs) = query_timeout_secs {
            self = self.query_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = init_timeout_secs {
            self = self.init_timeout(Duration::from_secs(secs));
        }
        if let Some(v) = pull_retries {
            self = self.pull_retries(v);
        }
        if skip_prereqs {
            self.skip_prereqs = true;
        }
        self
    }

    /// Resolve the configuration. The backend is not contacted.
    pub fn build(self) -> Result<ServiceManager, CoreError> {
        let project = self
            .project_name
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT.to_owned());
        let host = self.host.unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = self.port.unwrap_or(DEFAULT_PORT);
        let base_url = format!("http://{host}:{port}{API_PATH}");
        url::Url::parse(&base_url)
            .map_err(|e| CoreError::Config(format!("invalid service URL {base_url}: {e}")))?;

        let compose_dir = self.compose_dir.unwrap_or_else(|| {
            default_data_dir()
                .unwrap_or_else(|| std::env::temp_dir().join("akshara"))
                .join(&project)
        });
        let services = self
            .services
            .unwrap_or_else(|| DEFAULT_SERVICES.iter().map(|s| (*s).to_owned()).collect());
        let ready_marker = self
            .ready_marker
            .unwrap_or_else(|| Some(DEFAULT_READY_MARKER.to_owned()));

        let backend = match (self.backend, self.backend_name) {
            (Some(backend), _) => backend,
            (None, name) => select_backend(name.as_deref().unwrap_or("compose"))?,
        };
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ScriptCatalog::builtin()));
        let query_timeout = self.query_timeout.unwrap_or(DEFAULT_QUERY_TIMEOUT);

        let spec = ServiceSpec {
            project,
            compose_dir,
            compose_file: self
                .compose_file
                .unwrap_or_else(|| DEFAULT_COMPOSE_FILE.to_owned()),
            remote_repo: self
                .remote_repo
                .unwrap_or_else(|| DEFAULT_REMOTE_REPO.to_owned()),
            services,
            ready_marker,
            endpoint: base_url.clone(),
        };

        let manager = ServiceManager {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            spec,
            base_url,
            backend,
            client: QueryClient::new(registry, query_timeout),
            state: RwLock::new(ManagerState::Created),
            op: Mutex::new(OpState::default()),
            lock_dir: self.lock_dir.unwrap_or_else(default_lock_dir),
            init_timeout: self.init_timeout.unwrap_or(DEFAULT_INIT_TIMEOUT),
            pull_retries: self.pull_retries.unwrap_or(DEFAULT_PULL_RETRIES),
            pull_backoff: self.pull_backoff.unwrap_or(DEFAULT_PULL_BACKOFF),
            progress: self.progress,
            skip_prereqs: self.skip_prereqs,
        };
        debug!(
            "configured manager {} for project {} at {}",
            manager.id, manager.spec.project, manager.base_url
        );
        Ok(manager)
    }
}
