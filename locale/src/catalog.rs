//! Bundles per object definition and per module.

use crate::{ConfigResult, LocaleBundle};
use serde::Deserialize;
use std::collections::HashMap;

/// All translation bundles known to the engine.
///
/// Definition bundles are keyed by qualified name (`infra.service`), module
/// bundles by module name (`infra`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleCatalog {
    definitions: HashMap<String, LocaleBundle>,
    modules: HashMap<String, LocaleBundle>,
}

impl LocaleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON document of the form
    /// `{ "definitions": { name: bundle }, "modules": { module: bundle } }`.
    pub fn from_json(json: &str) -> Result<Self, crate::CatalogLoadError> {
        let raw: LocaleCatalog = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (name, bundle) in raw.definitions {
            catalog.add_definition_bundle(name, bundle)?;
        }
        for (module, bundle) in raw.modules {
            catalog.add_module_bundle(module, bundle)?;
        }
        Ok(catalog)
    }

    /// Add (or merge into) the bundle of an object definition.
    pub fn add_definition_bundle(
        &mut self,
        qualified_name: impl Into<String>,
        bundle: LocaleBundle,
    ) -> ConfigResult<()> {
        let bundle = bundle.canonicalized()?;
        self.definitions
            .entry(qualified_name.into())
            .or_default()
            .merge(bundle);
        Ok(())
    }

    /// Add (or merge into) the bundle of a module.
    pub fn add_module_bundle(
        &mut self,
        module: impl Into<String>,
        bundle: LocaleBundle,
    ) -> ConfigResult<()> {
        let bundle = bundle.canonicalized()?;
        self.modules.entry(module.into()).or_default().merge(bundle);
        Ok(())
    }

    pub fn definition_bundle(&self, qualified_name: &str) -> Option<&LocaleBundle> {
        self.definitions.get(qualified_name)
    }

    pub fn module_bundle(&self, module: &str) -> Option<&LocaleBundle> {
        self.modules.get(module)
    }
}
