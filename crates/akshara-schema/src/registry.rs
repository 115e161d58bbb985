//! Script validation and language/romanization lookups.
//!
//! [`ScriptRegistry`] is the read-only view the query path depends on.
//! [`ScriptCatalog`] implements it over immutable tables: the built-in data
//! set, a JSON document, or fixtures assembled in tests.

use crate::language::normalize_language;
use crate::script::{Script, BUILTIN_SCRIPTS};
use crate::tables::{LANGUAGE_SCRIPTS, ROMANIZATIONS};
use crate::ScriptError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

pub trait ScriptRegistry: Send + Sync {
    /// Exact, case-sensitive catalog membership.
    fn is_valid_script(&self, script: &str) -> bool;

    /// Ordered scripts for a language; the first one is the primary script.
    fn scripts_for(&self, language_code: &str) -> Result<Vec<Script>, ScriptError>;

    fn romanization_scheme_for(&self, script: &Script) -> Result<Script, ScriptError>;

    /// Primary script of a language, after ISO 639 normalization of the code.
    fn default_script_for(&self, language_code: &str) -> Result<Script, ScriptError> {
        let scripts = self.scripts_for(language_code)?;
        scripts.into_iter().next().ok_or_else(|| {
            let code = normalize_language(language_code)
                .unwrap_or_else(|| language_code.to_owned());
            ScriptError::EmptyScriptList(code)
        })
    }
}

/// Serialized form of a catalog, as accepted by [`ScriptCatalog::from_json_str`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    pub scripts: Vec<Script>,
    #[serde(default)]
    pub languages: BTreeMap<String, Vec<Script>>,
    #[serde(default)]
    pub romanizations: BTreeMap<Script, Script>,
}

#[derive(Debug, Clone)]
pub struct ScriptCatalog {
    scripts: HashSet<Script>,
    languages: HashMap<String, Vec<Script>>,
    romanizations: HashMap<Script, Script>,
}

static BUILTIN: LazyLock<ScriptCatalog> = LazyLock::new(|| ScriptCatalog {
    scripts: BUILTIN_SCRIPTS.iter().map(|s| Script::from_static(s)).collect(),
    languages: LANGUAGE_SCRIPTS
        .iter()
        .map(|(code, scripts)| ((*code).to_owned(), scripts.to_vec()))
        .collect(),
    romanizations: ROMANIZATIONS.iter().cloned().collect(),
});

impl ScriptCatalog {
    /// The reference data shipped with the crate, built once per process.
    pub fn builtin() -> &'static ScriptCatalog {
        &BUILTIN
    }

    /// Build a catalog from explicit tables.
    ///
    /// Language keys are normalized to ISO 639-3. Every script referenced by
    /// the language or romanization tables must be a member of `scripts`.
    /// Empty language entries are kept; lookups report them as
    /// [`ScriptError::EmptyScriptList`].
    pub fn new(
        scripts: impl IntoIterator<Item = Script>,
        languages: impl IntoIterator<Item = (String, Vec<Script>)>,
        romanizations: impl IntoIterator<Item = (Script, Script)>,
    ) -> Result<Self, ScriptError> {
        let scripts: HashSet<Script> = scripts.into_iter().collect();

        let mut language_map = HashMap::new();
        for (code, list) in languages {
            let normalized = normalize_language(&code).ok_or_else(|| {
                ScriptError::Catalog(format!("'{code}' is not an ISO 639 language code"))
            })?;
            if let Some(unknown) = list.iter().find(|s| !scripts.contains(s.as_str())) {
                return Err(ScriptError::Catalog(format!(
                    "language '{code}' references unknown script '{unknown}'"
                )));
            }
            language_map.insert(normalized, list);
        }

        let mut roman_map = HashMap::new();
        for (source, target) in romanizations {
            for s in [&source, &target] {
                if !scripts.contains(s.as_str()) {
                    return Err(ScriptError::Catalog(format!(
                        "romanization '{source} -> {target}' references unknown script '{s}'"
                    )));
                }
            }
            roman_map.insert(source, target);
        }

        Ok(Self {
            scripts,
            languages: language_map,
            romanizations: roman_map,
        })
    }

    pub fn from_data(data: CatalogData) -> Result<Self, ScriptError> {
        Self::new(data.scripts, data.languages, data.romanizations)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScriptError> {
        let data: CatalogData = serde_json::from_str(json)
            .map_err(|e| ScriptError::Catalog(format!("invalid catalog JSON: {e}")))?;
        Self::from_data(data)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScriptError::Catalog(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Export the tables in their serialized form, with deterministic ordering.
    pub fn to_data(&self) -> CatalogData {
        let mut scripts: Vec<Script> = self.scripts.iter().cloned().collect();
        scripts.sort();
        CatalogData {
            scripts,
            languages: self
                .languages
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            romanizations: self
                .romanizations
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn script_count(&self) -> usize {
        self.scripts.len()
    }

    /// Language codes with a script mapping, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

impl ScriptRegistry for ScriptCatalog {
    fn is_valid_script(&self, script: &str) -> bool {
        self.scripts.contains(script)
    }

    fn scripts_for(&self, language_code: &str) -> Result<Vec<Script>, ScriptError> {
        let code = normalize_language(language_code)
            .ok_or_else(|| ScriptError::InvalidLanguageCode(language_code.to_owned()))?;
        match self.languages.get(&code) {
            Some(scripts) => Ok(scripts.clone()),
            None => Err(ScriptError::NoScriptMapping(code)),
        }
    }

    fn romanization_scheme_for(&self, script: &Script) -> Result<Script, ScriptError> {
        self.romanizations
            .get(script.as_str())
            .cloned()
            .ok_or_else(|| ScriptError::NoRomanizationScheme(script.clone()))
    }
}

impl<R: ScriptRegistry + ?Sized> ScriptRegistry for &R {
    fn is_valid_script(&self, script: &str) -> bool {
        (**self).is_valid_script(script)
    }

    fn scripts_for(&self, language_code: &str) -> Result<Vec<Script>, ScriptError> {
        (**self).scripts_for(language_code)
    }

    fn romanization_scheme_for(&self, script: &Script) -> Result<Script, ScriptError> {
        (**self).romanization_scheme_for(script)
    }

    fn default_script_for(&self, language_code: &str) -> Result<Script, ScriptError> {
        (**self).default_script_for(language_code)
    }
}
