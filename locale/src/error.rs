//! Locale configuration errors.

use thiserror::Error;

/// Result type for locale operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Translation configuration defects. These surface while the engine is
/// being set up or when a label is requested, never as a blank string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing translation for '{key}' (tried {})", .chain.join(" -> "))]
    MissingTranslation { key: String, chain: Vec<String> },

    #[error("Invalid locale tag: '{0}'")]
    InvalidLocale(String),
}

impl ConfigError {
    pub fn missing_translation(key: impl Into<String>, chain: Vec<String>) -> Self {
        Self::MissingTranslation {
            key: key.into(),
            chain,
        }
    }

    pub fn invalid_locale(tag: impl Into<String>) -> Self {
        Self::InvalidLocale(tag.into())
    }
}

/// Failure to load a translation catalog or bundle from JSON.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("Malformed translation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
