//! Label and option-text resolution with locale fallback.

use crate::{canonicalize, option_key, ConfigError, ConfigResult, LocaleBundle, LocaleCatalog, LocaleChain};
use schemata_registry::ObjectDef;
use tracing::debug;

/// Default locale when none is configured.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Resolves label keys to display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleResolver {
    default_locale: String,
}

impl Default for LocaleResolver {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl LocaleResolver {
    /// Create a resolver whose chains end with `default_locale`.
    pub fn new(default_locale: &str) -> ConfigResult<Self> {
        Ok(Self {
            default_locale: canonicalize(default_locale)?,
        })
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Fallback chain for a requested locale.
    pub fn chain(&self, locale: &str) -> ConfigResult<LocaleChain> {
        LocaleChain::build(locale, &self.default_locale)
    }

    /// Resolve `key` in a single bundle.
    pub fn resolve<'a>(
        &self,
        bundle: &'a LocaleBundle,
        key: &str,
        locale: &str,
    ) -> ConfigResult<&'a str> {
        let chain = self.chain(locale)?;
        for (depth, candidate) in chain.iter().enumerate() {
            if let Some(text) = bundle.get(key, candidate) {
                if depth > 0 {
                    debug!(key, requested = chain.requested(), resolved = candidate, "translation fell back");
                }
                return Ok(text);
            }
        }
        Err(ConfigError::missing_translation(key, chain.into_vec()))
    }

    /// Resolve `key` for an object definition. For each locale of the chain
    /// the definition bundle is tried before the module bundle.
    pub fn resolve_in<'a>(
        &self,
        catalog: &'a LocaleCatalog,
        def: &ObjectDef,
        key: &str,
        locale: &str,
    ) -> ConfigResult<&'a str> {
        let chain = self.chain(locale)?;
        let bundles: Vec<&LocaleBundle> = [
            catalog.definition_bundle(&def.qualified_name),
            catalog.module_bundle(&def.module),
        ]
        .into_iter()
        .flatten()
        .collect();

        for (depth, candidate) in chain.iter().enumerate() {
            if let Some(text) = bundles.iter().find_map(|b| b.get(key, candidate)) {
                if depth > 0 {
                    debug!(
                        definition = %def.qualified_name,
                        key,
                        requested = chain.requested(),
                        resolved = candidate,
                        "translation fell back"
                    );
                }
                return Ok(text);
            }
        }
        Err(ConfigError::missing_translation(key, chain.into_vec()))
    }

    /// Field label of `property` on `def`.
    pub fn resolve_label<'a>(
        &self,
        catalog: &'a LocaleCatalog,
        def: &ObjectDef,
        property: &str,
        locale: &str,
    ) -> ConfigResult<&'a str> {
        self.resolve_in(catalog, def, property, locale)
    }

    /// Display text of option `code` on `def`.
    pub fn resolve_option<'a>(
        &self,
        catalog: &'a LocaleCatalog,
        def: &ObjectDef,
        code: &str,
        locale: &str,
    ) -> ConfigResult<&'a str> {
        self.resolve_in(catalog, def, &option_key(code), locale)
    }
}
