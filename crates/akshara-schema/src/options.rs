use serde::{Deserialize, Serialize};

/// Per-request transliteration flags.
///
/// `nativize` defaults to `true`; it is only sent to the service when turned
/// off. Pre- and post-options are forwarded as comma-joined lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslitOptions {
    #[serde(default = "default_nativize")]
    pub nativize: bool,
    #[serde(default)]
    pub pre_options: Vec<String>,
    #[serde(default)]
    pub post_options: Vec<String>,
}

fn default_nativize() -> bool {
    true
}

impl Default for TranslitOptions {
    fn default() -> Self {
        Self {
            nativize: true,
            pre_options: Vec::new(),
            post_options: Vec::new(),
        }
    }
}

impl TranslitOptions {
    #[must_use]
    pub fn without_nativize(mut self) -> Self {
        self.nativize = false;
        self
    }

    #[must_use]
    pub fn with_pre_option(mut self, option: impl Into<String>) -> Self {
        self.pre_options.push(option.into());
        self
    }

    #[must_use]
    pub fn with_post_option(mut self, option: impl Into<String>) -> Self {
        self.post_options.push(option.into());
        self
    }
}
