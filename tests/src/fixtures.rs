//! The `infra` module: servers and the services deployed on them.

use schemata_core::{Instance, Value, Violation};
use schemata_locale::LocaleCatalog;
use schemata_registry::{ObjectDefDecl, Registry, RegistryBuilder, ValidationHook};
use schemata_transaction::{EngineConfig, WriteEngine};
use std::sync::Arc;

use crate::ScenarioResult;

pub const SERVER_DECL: &str = r#"{
    "module": "infra",
    "name": "server",
    "properties": [
        {
            "group": "general",
            "properties": [
                { "name": "hostname", "template": "text.obligatory",
                  "options": { "pattern": "^[a-z0-9][a-z0-9.-]*$" } },
                { "name": "description", "template": "text.i18n" },
                { "name": "cores", "template": "integer",
                  "options": { "min": 1, "max": 512, "default": 2 } }
            ]
        }
    ],
    "uniques": [["hostname"]]
}"#;

pub const SERVICE_DECL: &str = r#"{
    "module": "infra",
    "name": "service",
    "properties": [
        {
            "group": "general",
            "properties": [
                { "name": "name", "template": "text.obligatory" },
                { "name": "url", "template": "text",
                  "options": { "pattern": "^https?://" } },
                { "name": "port", "template": "integer" },
                { "name": "type", "template": "option",
                  "options": {
                      "optionSet": { "code": "service_type", "options": ["web", "worker", "batch"] },
                      "default": "worker"
                  } },
                { "name": "server", "template": "relation.obligatory",
                  "options": { "related": "server" } }
            ]
        },
        {
            "group": "dependencies",
            "properties": [
                { "name": "dependencies", "template": "relation",
                  "options": { "related": "service", "multiple": true, "acyclic": true } }
            ]
        }
    ],
    "uniques": [["url", "port"]]
}"#;

pub const CATALOG: &str = r#"{
    "modules": {
        "infra": {
            "hostname": { "en-US": "Host name", "fr": "Nom d'hôte" },
            "description": { "en-US": "Description" },
            "cores": { "en-US": "Cores", "fr": "Cœurs" },
            "name": { "en-US": "Name", "fr": "Nom" },
            "url": { "en-US": "URL" },
            "port": { "en-US": "Port" },
            "type": { "en-US": "Type" },
            "server": { "en-US": "Server", "fr": "Serveur" },
            "dependencies": { "en-US": "Dependencies", "fr": "Dépendances" }
        }
    },
    "definitions": {
        "infra.service": {
            "name": { "fr-FR": "Nom du service" },
            "option:web": { "en-US": "Web", "fr-FR": "Service web" },
            "option:worker": { "en-US": "Worker", "fr": "Tâche de fond" },
            "option:batch": { "en-US": "Batch" }
        }
    }
}"#;

/// Service rules the declarative checks cannot express.
///
/// - `port` must lie in `1..=65535`.
/// - A `web` service must have a `url`.
/// - A plain `http://` url is reported as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceHook;

impl ValidationHook for ServiceHook {
    fn apply_constraints(&self, instance: &Instance, _prior: &[Violation]) -> Vec<Violation> {
        let mut violations = Vec::new();

        if let Some(port) = instance.get("port").and_then(Value::as_int) {
            if !(1..=65535).contains(&port) {
                violations.push(Violation::error(
                    "port",
                    format!("Port must be between 1 and 65535, got {}", port),
                ));
            }
        }

        let url = instance.get("url").and_then(Value::as_str).filter(|u| !u.trim().is_empty());
        if instance.get("type").and_then(Value::as_str) == Some("web") && url.is_none() {
            violations.push(Violation::error("url", "A web service needs a url"));
        }
        if url.is_some_and(|u| u.starts_with("http://")) {
            violations.push(Violation::warning("url", "Service is served over plain http"));
        }

        violations
    }
}

/// The `infra` registry with `ServiceHook` on services.
pub fn registry() -> ScenarioResult<Arc<Registry>> {
    registry_with_hook(ServiceHook)
}

/// The `infra` registry with a custom hook on services.
pub fn registry_with_hook(hook: impl ValidationHook) -> ScenarioResult<Arc<Registry>> {
    let mut builder = RegistryBuilder::new();
    builder.register(ObjectDefDecl::from_json(SERVER_DECL)?)?;
    builder.declare(ObjectDefDecl::from_json(SERVICE_DECL)?).hook(hook).done()?;
    Ok(Arc::new(builder.build()?))
}

pub fn catalog() -> ScenarioResult<LocaleCatalog> {
    Ok(LocaleCatalog::from_json(CATALOG)?)
}

/// Engine over the `infra` registry and catalog with default configuration.
pub fn engine() -> ScenarioResult<WriteEngine> {
    engine_with(&EngineConfig::default())
}

pub fn engine_with(config: &EngineConfig) -> ScenarioResult<WriteEngine> {
    Ok(WriteEngine::new(registry()?, catalog()?, config)?)
}
