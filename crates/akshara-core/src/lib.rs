//! Service lifecycle and query orchestration for Akshara.
//!
//! This crate ties the script catalog and the runtime backends together into
//! the `ServiceManager`, the central API for starting, attaching to, pulling,
//! stopping and closing one containerized Aksharamukha instance and for
//! sending it transliteration queries. It also provides the process-wide
//! `DefaultRegistry` and a set of free functions that forward to the default
//! manager.

pub mod compat;
pub mod lifecycle;
pub mod manager;
pub mod query;
pub mod registry;

pub use lifecycle::{validate_transition, ManagerState};
pub use manager::{ManagerBuilder, ServiceManager, DEFAULT_PORT, DEFAULT_PROJECT};
pub use query::{build_query, QueryClient};
pub use registry::DefaultRegistry;

pub use akshara_runtime::{CancelHandle, CancelReason, Context};
pub use akshara_schema::{Script, ScriptError, TranslitOptions};

use akshara_runtime::RuntimeError;
use akshara_schema::SettingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("invalid source script '{0}'")]
    InvalidSourceScript(String),
    #[error("invalid target script '{0}'")]
    InvalidTargetScript(String),
    #[error("input text is empty")]
    EmptyInput,
    #[error("service returned an empty result")]
    EmptyResult,
    #[error(
        "request to {url} failed: {message} (if you are behind a VPN or transparent proxy, \
         make sure localhost traffic bypasses it)"
    )]
    Transport { url: String, message: String },
    #[error("service answered with HTTP status {status}")]
    Backend { status: u16 },
    #[error("{0}")]
    Canceled(CancelReason),
    #[error("service manager is not initialized; call init first")]
    NotInitialized,
    #[error("service manager is closed")]
    AlreadyClosed,
    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("runtime error: {0}")]
    Runtime(RuntimeError),
    #[error("{0}")]
    MissingPrereqs(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The stage of a request or lifecycle call this error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Script(_)
            | Self::InvalidSourceScript(_)
            | Self::InvalidTargetScript(_)
            | Self::EmptyInput => "validation",
            Self::Transport { .. } => "transport",
            Self::Backend { .. } | Self::EmptyResult => "backend",
            Self::Canceled(_) => "canceled",
            Self::NotInitialized
            | Self::AlreadyClosed
            | Self::InvalidTransition { .. }
            | Self::Runtime(_)
            | Self::MissingPrereqs(_)
            | Self::Io(_) => "lifecycle",
            Self::Config(_) => "config",
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled(_))
    }
}

impl From<RuntimeError> for CoreError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::Canceled(reason) => Self::Canceled(reason),
            other => Self::Runtime(other),
        }
    }
}

impl From<CancelReason> for CoreError {
    fn from(reason: CancelReason) -> Self {
        Self::Canceled(reason)
    }
}

impl From<SettingsError> for CoreError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_cancel_folds_into_canceled() {
        let err = CoreError::from(RuntimeError::Canceled(CancelReason::DeadlineExceeded));
        assert!(matches!(
            err,
            CoreError::Canceled(CancelReason::DeadlineExceeded)
        ));
        assert_eq!(err.stage(), "canceled");

        let err = CoreError::from(RuntimeError::BackendUnavailable("x".to_owned()));
        assert!(matches!(err, CoreError::Runtime(_)));
        assert_eq!(err.stage(), "lifecycle");
    }

    #[test]
    fn transport_error_carries_proxy_hint() {
        let err = CoreError::Transport {
            url: "http://localhost:8085/api/public".to_owned(),
            message: "connection refused".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("connection refused"));
        assert!(msg.contains("VPN"));
        assert_eq!(err.stage(), "transport");
    }

    #[test]
    fn script_errors_are_validation_stage() {
        let err = CoreError::from(ScriptError::NoScriptMapping("eng".to_owned()));
        assert_eq!(err.stage(), "validation");
        assert_eq!(err.to_string(), "no script mapping for language 'eng'");
        assert_eq!(CoreError::EmptyInput.stage(), "validation");
        assert_eq!(CoreError::Backend { status: 500 }.stage(), "backend");
        assert_eq!(CoreError::EmptyResult.stage(), "backend");
    }
}
