//! Engine configuration.

use schemata_constraint::HookRunner;
use serde::Deserialize;
use std::time::Duration;

/// Write engine settings, loadable from JSON. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Last link of every locale fallback chain.
    pub default_locale: String,
    /// Hook timeout in milliseconds; `null` runs hooks inline without one.
    pub hook_timeout_ms: Option<u64>,
    /// Locales every field and option label must resolve for at startup.
    pub required_locales: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_locale: schemata_locale::DEFAULT_LOCALE.to_string(),
            hook_timeout_ms: Some(5000),
            required_locales: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn hook_runner(&self) -> HookRunner {
        match self.hook_timeout_ms {
            Some(ms) => HookRunner::with_timeout(Duration::from_millis(ms)),
            None => HookRunner::inline(),
        }
    }
}
