use crate::manager::{ManagerBuilder, ServiceManager};
use crate::CoreError;
use akshara_runtime::Context;
use akshara_schema::ManagerSettings;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

type Factory = Box<dyn Fn() -> Result<ServiceManager, CoreError> + Send + Sync>;

/// Owns the shared default [`ServiceManager`].
///
/// The manager is built lazily on first use and replaced after an explicit
/// [`close_default`](Self::close_default), or after it was closed directly.
/// Construction happens under the slot mutex, so concurrent callers always
/// observe one instance.
pub struct DefaultRegistry {
    factory: Factory,
    slot: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
    manager: Option<Arc<ServiceManager>>,
    closed: bool,
}

static GLOBAL: LazyLock<DefaultRegistry> = LazyLock::new(|| {
    DefaultRegistry::new(|| {
        let mut settings = ManagerSettings::load_default()?;
        settings.apply_env()?;
        ManagerBuilder::new().settings(settings).build()
    })
});

impl DefaultRegistry {
    pub fn new(
        factory: impl Fn() -> Result<ServiceManager, CoreError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            slot: Mutex::new(Slot::default()),
        }
    }

    /// The process-wide registry. Its manager reads the settings file and
    /// `AKSHARA_*` environment overrides when first built.
    pub fn global() -> &'static DefaultRegistry {
        &GLOBAL
    }

    pub fn get_or_create(&self, ctx: &Context) -> Result<Arc<ServiceManager>, CoreError> {
        ctx.check()?;
        let mut slot = self.lock();
        if let Some(manager) = slot.manager.as_ref().filter(|m| !slot.closed && !m.is_closed()) {
            return Ok(Arc::clone(manager));
        }

        let manager = Arc::new((self.factory)()?);
        debug!(
            "created default manager {} for project {}",
            manager.id(),
            manager.project()
        );
        slot.manager = Some(Arc::clone(&manager));
        slot.closed = false;
        Ok(manager)
    }

    /// The current manager, if one exists and is still open. Never constructs.
    pub fn current(&self) -> Option<Arc<ServiceManager>> {
        let slot = self.lock();
        if slot.closed {
            return None;
        }
        slot.manager.as_ref().filter(|m| !m.is_closed()).cloned()
    }

    /// Close the held manager and mark the slot for replacement.
    pub fn close_default(&self) -> Result<(), CoreError> {
        let mut slot = self.lock();
        let Some(manager) = slot.manager.take() else {
            return Ok(());
        };
        slot.closed = true;
        info!("closing default manager {}", manager.id());
        manager.close()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
