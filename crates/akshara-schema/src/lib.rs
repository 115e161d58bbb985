//! Script catalog, language normalization and request schema for Akshara.
//!
//! This crate holds the pure data layer: the `Script` identifier and the
//! built-in Aksharamukha script catalog, language-to-script and
//! script-to-romanization tables behind the `ScriptRegistry` trait, ISO 639
//! code normalization, per-request `TranslitOptions`, and the TOML
//! `ManagerSettings` schema.

pub mod language;
pub mod options;
pub mod registry;
pub mod script;
pub mod settings;
mod tables;

pub use language::normalize_language;
pub use options::TranslitOptions;
pub use registry::{CatalogData, ScriptCatalog, ScriptRegistry};
pub use script::{Script, BUILTIN_SCRIPTS};
pub use settings::{default_data_dir, default_settings_path, ManagerSettings, SettingsError};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid language code '{0}': not an ISO 639 code")]
    InvalidLanguageCode(String),
    #[error("no script mapping for language '{0}'")]
    NoScriptMapping(String),
    #[error("script list for language '{0}' is empty")]
    EmptyScriptList(String),
    #[error("no romanization scheme for script '{0}'")]
    NoRomanizationScheme(Script),
    #[error("invalid script catalog: {0}")]
    Catalog(String),
}
