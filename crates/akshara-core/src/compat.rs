//! Free functions operating on the process-wide default manager.
//!
//! These are thin forwarders to [`DefaultRegistry::global`] for callers that
//! do not want to hold a [`ServiceManager`](crate::ServiceManager) themselves.
//! Lifecycle functions create the default manager on demand; query functions
//! and [`stop`] never do. The forms without a [`Context`] run under
//! [`Context::background`], so only the manager's query timeout bounds them.

use crate::registry::DefaultRegistry;
use crate::CoreError;
use akshara_runtime::{Context, ServiceStatus};
use akshara_schema::{Script, TranslitOptions};

pub fn init() -> Result<(), CoreError> {
    let ctx = Context::background();
    DefaultRegistry::global().get_or_create(&ctx)?.init(&ctx)
}

pub fn init_quiet() -> Result<(), CoreError> {
    let ctx = Context::background();
    DefaultRegistry::global().get_or_create(&ctx)?.init_quiet(&ctx)
}

pub fn recreate(force_pull_latest: bool) -> Result<(), CoreError> {
    let ctx = Context::background();
    DefaultRegistry::global()
        .get_or_create(&ctx)?
        .recreate(&ctx, force_pull_latest)
}

pub fn pull_images() -> Result<(), CoreError> {
    let ctx = Context::background();
    DefaultRegistry::global()
        .get_or_create(&ctx)?
        .pull_images(&ctx)
}

/// Stop the default manager's service. Does nothing when there is none.
pub fn stop() -> Result<(), CoreError> {
    match DefaultRegistry::global().current() {
        Some(manager) => manager.stop(&Context::background()),
        None => Ok(()),
    }
}

/// Close the default manager; the next lifecycle call builds a fresh one.
pub fn close() -> Result<(), CoreError> {
    DefaultRegistry::global().close_default()
}

pub fn status() -> Result<ServiceStatus, CoreError> {
    let ctx = Context::background();
    DefaultRegistry::global().get_or_create(&ctx)?.status(&ctx)
}

/// Transliterate with default options. An empty `from` lets the service
/// detect the source script.
pub fn translit(text: &str, from: &str, to: &str) -> Result<String, CoreError> {
    translit_with(
        &Context::background(),
        text,
        from,
        to,
        &TranslitOptions::default(),
    )
}

pub fn translit_with(
    ctx: &Context,
    text: &str,
    from: &str,
    to: &str,
    opts: &TranslitOptions,
) -> Result<String, CoreError> {
    let manager = DefaultRegistry::global()
        .current()
        .ok_or(CoreError::NotInitialized)?;
    let from = Script::new(from);
    let to = Script::new(to);
    manager.translit(ctx, text, Some(&from), &to, opts)
}

pub fn roman(text: &str, language_code: &str) -> Result<String, CoreError> {
    roman_with(
        &Context::background(),
        text,
        language_code,
        &TranslitOptions::default(),
    )
}

pub fn roman_with(
    ctx: &Context,
    text: &str,
    language_code: &str,
    opts: &TranslitOptions,
) -> Result<String, CoreError> {
    let manager = DefaultRegistry::global()
        .current()
        .ok_or(CoreError::NotInitialized)?;
    manager.roman(ctx, text, language_code, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global registry is shared by every test in this binary, so only
    // behaviour that holds without a default manager is checked here.

    #[test]
    fn queries_without_default_manager_are_not_initialized() {
        if DefaultRegistry::global().current().is_some() {
            return;
        }
        assert!(matches!(
            translit("x", "", "ISO"),
            Err(CoreError::NotInitialized)
        ));
        assert!(matches!(roman("x", "hin"), Err(CoreError::NotInitialized)));
    }

    #[test]
    fn stop_without_default_manager_is_noop() {
        if DefaultRegistry::global().current().is_some() {
            return;
        }
        stop().unwrap();
        assert!(DefaultRegistry::global().current().is_none());
    }
}
