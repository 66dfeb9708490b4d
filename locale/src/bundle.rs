//! Translation bundles.

use crate::{canonicalize, CatalogLoadError, ConfigResult};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Prefix separating option-label keys from field-label keys.
pub const OPTION_KEY_PREFIX: &str = "option:";

/// Bundle key for an option code.
pub fn option_key(code: &str) -> String {
    format!("{}{}", OPTION_KEY_PREFIX, code)
}

/// Label key → locale tag → display string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LocaleBundle {
    entries: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocaleBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a bundle from a JSON document, canonicalising its locale tags.
    pub fn from_json(json: &str) -> Result<Self, CatalogLoadError> {
        Ok(serde_json::from_str::<Self>(json)?.canonicalized()?)
    }

    /// Add a translation; the locale tag is canonicalised.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        locale: &str,
        text: impl Into<String>,
    ) -> ConfigResult<()> {
        let locale = canonicalize(locale)?;
        self.entries
            .entry(key.into())
            .or_default()
            .insert(locale, text.into());
        Ok(())
    }

    /// Builder form of `insert`.
    pub fn with(
        mut self,
        key: impl Into<String>,
        locale: &str,
        text: impl Into<String>,
    ) -> ConfigResult<Self> {
        self.insert(key, locale, text)?;
        Ok(self)
    }

    /// Builder form of `insert` for an option code.
    pub fn with_option(self, code: &str, locale: &str, text: impl Into<String>) -> ConfigResult<Self> {
        self.with(option_key(code), locale, text)
    }

    /// Exact lookup; blank entries count as absent.
    pub fn get(&self, key: &str, locale: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|by_locale| by_locale.get(locale))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-key every locale tag in canonical form.
    pub fn canonicalized(self) -> ConfigResult<Self> {
        let mut out = Self::new();
        for (key, by_locale) in self.entries {
            for (locale, text) in by_locale {
                out.insert(key.clone(), &locale, text)?;
            }
        }
        Ok(out)
    }

    /// Merge `other` into this bundle; entries of `other` win.
    pub fn merge(&mut self, other: LocaleBundle) {
        for (key, by_locale) in other.entries {
            self.entries.entry(key).or_default().extend(by_locale);
        }
    }
}
