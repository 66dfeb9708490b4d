//! Locale tags and fallback chains.

use crate::{ConfigError, ConfigResult};
use regex_lite::Regex;
use std::fmt;
use std::sync::OnceLock;

/// language, optional script, optional region.
const LOCALE_TAG: &str = r"^([A-Za-z]{2,3})(?:-([A-Za-z]{4}))?(?:-([A-Za-z]{2}|[0-9]{3}))?$";

fn tag_regex() -> ConfigResult<&'static Regex> {
    static REGEX: OnceLock<Result<Regex, String>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(LOCALE_TAG).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| ConfigError::invalid_locale(format!("locale pattern: {}", e)))
}

/// Canonicalise a locale tag: lowercase language, titlecase script,
/// uppercase region. `fr_fr` and `fr-fr` both become `fr-FR`.
pub fn canonicalize(tag: &str) -> ConfigResult<String> {
    let normalized = tag.trim().replace('_', "-");
    let caps = tag_regex()?
        .captures(&normalized)
        .ok_or_else(|| ConfigError::invalid_locale(tag))?;

    let mut canonical = caps
        .get(1)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();

    if let Some(script) = caps.get(2) {
        let script = script.as_str();
        canonical.push('-');
        canonical.push_str(&script[..1].to_ascii_uppercase());
        canonical.push_str(&script[1..].to_ascii_lowercase());
    }
    if let Some(region) = caps.get(3) {
        canonical.push('-');
        canonical.push_str(&region.as_str().to_ascii_uppercase());
    }

    Ok(canonical)
}

/// Ordered list of locales tried for one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChain {
    locales: Vec<String>,
}

impl LocaleChain {
    /// Build the chain for `requested`: the tag itself, then each shorter
    /// prefix obtained by dropping the last subtag, then `default`.
    ///
    /// `zh-Hant-TW` with default `en-US` gives `zh-Hant-TW, zh-Hant, zh, en-US`.
    pub fn build(requested: &str, default: &str) -> ConfigResult<Self> {
        let mut tag = canonicalize(requested)?;
        let default = canonicalize(default)?;

        let mut locales = vec![tag.clone()];
        while let Some(pos) = tag.rfind('-') {
            tag.truncate(pos);
            locales.push(tag.clone());
        }
        if !locales.contains(&default) {
            locales.push(default);
        }

        Ok(Self { locales })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str)
    }

    /// The requested locale, after canonicalisation.
    pub fn requested(&self) -> &str {
        self.locales.first().map(String::as_str).unwrap_or_default()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.locales
    }
}

impl fmt::Display for LocaleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.locales.join(" -> "))
    }
}
