//! Write engine: validated, atomic instance writes.

use schemata_constraint::{apply_defaults, ConstraintChecker, ConstraintError, HookRunner};
use schemata_core::{GraphError, Instance, InstanceId, ObjectDefId, Properties, Violation, Violations};
use schemata_graph::{Graph, RelationGraph};
use schemata_locale::{verify_translations, LocaleCatalog, LocaleResolver};
use schemata_registry::{ObjectDef, Registry, SchemaError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::TransactionResult;
use crate::outcome::WriteOutcome;

/// Validates and commits instance writes.
///
/// Writes to one object definition are serialized by a per-definition lock
/// held from the uniqueness check through the commit, so two colliding
/// creates cannot both pass. Reads and writes to other definitions proceed
/// concurrently; the store itself sits behind a read/write lock that is
/// only taken for writing at commit.
pub struct WriteEngine {
    registry: Arc<Registry>,
    graph: RwLock<Graph>,
    /// One lock per object definition, guarding its uniqueness index.
    unique_locks: HashMap<ObjectDefId, Mutex<()>>,
    catalog: LocaleCatalog,
    resolver: LocaleResolver,
    hooks: HookRunner,
}

impl WriteEngine {
    /// Create an engine. Fails if the default locale is invalid or any
    /// required locale lacks a translation.
    pub fn new(
        registry: Arc<Registry>,
        catalog: LocaleCatalog,
        config: &EngineConfig,
    ) -> TransactionResult<Self> {
        let resolver = LocaleResolver::new(&config.default_locale)?;
        verify_translations(&registry, &catalog, &resolver, &config.required_locales)?;

        let unique_locks = registry.all().map(|def| (def.id, Mutex::new(()))).collect();

        info!(
            definitions = registry.len(),
            default_locale = resolver.default_locale(),
            hook_timeout_ms = ?config.hook_timeout_ms,
            "write engine ready"
        );

        Ok(Self {
            registry,
            graph: RwLock::new(Graph::new()),
            unique_locks,
            catalog,
            resolver,
            hooks: config.hook_runner(),
        })
    }

    /// Engine with default configuration and no translations.
    pub fn from_registry(registry: Arc<Registry>) -> TransactionResult<Self> {
        Self::new(registry, LocaleCatalog::new(), &EngineConfig::default())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ========== Writes ==========

    /// Create an instance of `definition`.
    pub fn create(&self, definition: &str, properties: Properties) -> TransactionResult<WriteOutcome> {
        let def = self.registry.lookup(definition)?;
        let mut properties = properties;
        apply_defaults(def, &mut properties);

        let _unique = self.lock_uniques(def.id);
        let id = self.read_graph().alloc_id();
        let candidate = Instance::new(id, def.id, properties);

        self.validate_and_commit(def, candidate, false)
    }

    /// Apply a patch to an instance. `Null` in the patch removes a property.
    /// The merged instance goes through the full pipeline again.
    pub fn update(&self, id: InstanceId, patch: Properties) -> TransactionResult<WriteOutcome> {
        let def = self.definition_of(id)?;

        let _unique = self.lock_uniques(def.id);
        let mut candidate = self
            .read_graph()
            .get(id)
            .cloned()
            .ok_or(GraphError::InstanceNotFound(id))?;
        candidate.apply_patch(patch);
        apply_defaults(def, &mut candidate.properties);

        self.validate_and_commit(def, candidate, true)
    }

    /// Delete an instance. Refused while other instances reference it.
    pub fn delete(&self, id: InstanceId) -> TransactionResult<Instance> {
        let def = self.definition_of(id)?;

        let _unique = self.lock_uniques(def.id);
        let removed = self.write_graph().remove(id)?;

        info!(%id, definition = %def.qualified_name, "instance deleted");
        Ok(removed)
    }

    /// Run the pipeline without committing.
    pub fn validate(&self, definition: &str, properties: Properties) -> TransactionResult<Violations> {
        let def = self.registry.lookup(definition)?;
        let mut properties = properties;
        apply_defaults(def, &mut properties);

        let candidate = Instance::new(self.read_graph().alloc_id(), def.id, properties);
        Ok(self.check(def, &candidate))
    }

    fn validate_and_commit(
        &self,
        def: &ObjectDef,
        candidate: Instance,
        replace: bool,
    ) -> TransactionResult<WriteOutcome> {
        // Any reported entry rejects, whatever its severity
        let violations = self.check(def, &candidate);
        if !violations.is_empty() {
            debug!(
                definition = %def.qualified_name,
                violations = violations.len(),
                "write rejected"
            );
            return Ok(WriteOutcome::Rejected { violations });
        }

        let mut graph = self.write_graph();

        // Targets in other definitions may have been deleted since the check
        let stale: Vec<Violation> = {
            let relations = RelationGraph::new(&self.registry, &graph).with_candidate(&candidate);
            def.relations()
                .flat_map(|(prop, _)| relations.validate_cardinality(prop, candidate.get(&prop.name)))
                .collect()
        };
        if !stale.is_empty() {
            debug!(definition = %def.qualified_name, "write rejected at commit");
            return Ok(WriteOutcome::Rejected {
                violations: stale.into(),
            });
        }

        let id = candidate.id;
        if replace {
            graph.replace(candidate)?;
        } else {
            graph.insert(candidate)?;
        }

        info!(%id, definition = %def.qualified_name, "instance committed");
        Ok(WriteOutcome::Accepted { id })
    }

    /// Built-in checks under a read lock, then the hook without one.
    fn check(&self, def: &ObjectDef, candidate: &Instance) -> Violations {
        let mut violations = {
            let graph = self.read_graph();
            ConstraintChecker::new(&self.registry, &graph).check_builtin(def, candidate)
        };
        let added = self.hooks.run(def, candidate, violations.all());
        violations.extend(added);
        violations
    }

    // ========== Reads ==========

    /// Snapshot of an instance.
    pub fn get(&self, id: InstanceId) -> Option<Instance> {
        self.read_graph().get(id).cloned()
    }

    /// Snapshots of every instance of `definition`, by id.
    pub fn instances_of(&self, definition: &str) -> TransactionResult<Vec<Instance>> {
        let def = self.registry.lookup(definition)?;
        let graph = self.read_graph();
        let mut instances: Vec<Instance> = graph
            .instances_of(def.id)
            .filter_map(|id| graph.get(id).cloned())
            .collect();
        instances.sort_by_key(|i| i.id);
        Ok(instances)
    }

    pub fn len(&self) -> usize {
        self.read_graph().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_graph().is_empty()
    }

    /// Every instance reachable from `id` over `property`.
    pub fn descendants(&self, id: InstanceId, property: &str) -> Vec<InstanceId> {
        let graph = self.read_graph();
        RelationGraph::new(&self.registry, &graph).descendants(id, property)
    }

    /// Every instance from which `id` is reachable over `property`.
    pub fn ancestors(&self, id: InstanceId, property: &str) -> Vec<InstanceId> {
        let graph = self.read_graph();
        RelationGraph::new(&self.registry, &graph).ancestors(id, property)
    }

    // ========== Labels ==========

    /// Field label of `property` on `definition`.
    pub fn label(&self, definition: &str, property: &str, locale: &str) -> TransactionResult<String> {
        let def = self.registry.lookup(definition)?;
        if !def.has_property(property) {
            return Err(SchemaError::not_found(format!("{}.{}", def.qualified_name, property)).into());
        }
        let text = self.resolver.resolve_label(&self.catalog, def, property, locale)?;
        Ok(text.to_string())
    }

    /// Display text of option `code` on `definition`.
    pub fn option_label(&self, definition: &str, code: &str, locale: &str) -> TransactionResult<String> {
        let def = self.registry.lookup(definition)?;
        if !def.option_sets().any(|(_, set)| set.contains(code)) {
            return Err(SchemaError::not_found(format!("{} option '{}'", def.qualified_name, code)).into());
        }
        let text = self.resolver.resolve_option(&self.catalog, def, code, locale)?;
        Ok(text.to_string())
    }

    // ========== Locks ==========

    fn definition_of(&self, id: InstanceId) -> TransactionResult<&ObjectDef> {
        let def_id = self
            .read_graph()
            .get(id)
            .map(|i| i.def_id)
            .ok_or(GraphError::InstanceNotFound(id))?;
        Ok(self
            .registry
            .get(def_id)
            .ok_or(ConstraintError::UnknownDefinition(def_id))?)
    }

    // Poisoning only means another writer panicked; the store is only
    // mutated by single insert/replace/remove calls, so it stays consistent.
    fn lock_uniques(&self, def_id: ObjectDefId) -> Option<MutexGuard<'_, ()>> {
        self.unique_locks
            .get(&def_id)
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn read_graph(&self) -> RwLockReadGuard<'_, Graph> {
        self.graph.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_graph(&self) -> RwLockWriteGuard<'_, Graph> {
        self.graph.write().unwrap_or_else(PoisonError::into_inner)
    }
}
