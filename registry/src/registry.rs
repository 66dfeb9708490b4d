//! The Registry - immutable schema lookup.

use crate::{ObjectDef, PropertyDef, SchemaError, SchemaResult};
use schemata_core::ObjectDefId;
use std::collections::{HashMap, HashSet, VecDeque};

/// The Registry provides runtime lookup of object definitions.
/// It is immutable after construction.
#[derive(Debug)]
pub struct Registry {
    /// Definitions indexed by ID, in registration order.
    defs: Vec<ObjectDef>,
    /// Qualified name lookup.
    names: HashMap<String, ObjectDefId>,
}

impl Registry {
    /// Create a registry (use RegistryBuilder for construction).
    pub(crate) fn new(defs: Vec<ObjectDef>, names: HashMap<String, ObjectDefId>) -> Self {
        Self { defs, names }
    }

    // ==================== Lookups ====================

    /// Get an object definition by qualified name, failing with `NotFound`.
    pub fn lookup(&self, name: &str) -> SchemaResult<&ObjectDef> {
        self.get_by_name(name)
            .ok_or_else(|| SchemaError::not_found(name))
    }

    /// Get an object definition by qualified name.
    pub fn get_by_name(&self, name: &str) -> Option<&ObjectDef> {
        self.names.get(name).and_then(|id| self.get(*id))
    }

    /// Get an object definition by ID.
    pub fn get(&self, id: ObjectDefId) -> Option<&ObjectDef> {
        self.defs.get(id.raw() as usize)
    }

    /// Get an object definition ID by qualified name.
    pub fn get_id(&self, name: &str) -> Option<ObjectDefId> {
        self.names.get(name).copied()
    }

    /// All object definitions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &ObjectDef> {
        self.defs.iter()
    }

    /// Get the number of object definitions.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions declared in a module.
    pub fn module_definitions<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a ObjectDef> {
        self.defs.iter().filter(move |d| d.module == module)
    }

    // ==================== Relation Queries ====================

    /// Every definition reachable from `name` over relation specs, in
    /// breadth-first order. The start definition is included only when a
    /// relation path leads back to it.
    pub fn related_definitions(&self, name: &str) -> SchemaResult<Vec<&ObjectDef>> {
        let start = self.lookup(name)?;

        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(def) = queue.pop_front() {
            for (_, relation) in def.relations() {
                let Some(target) = self.get_by_name(&relation.target) else {
                    continue;
                };
                if seen.insert(target.id) {
                    result.push(target);
                    queue.push_back(target);
                }
            }
        }

        Ok(result)
    }

    /// Relation properties, across all definitions, that target `name`.
    pub fn referencing_properties<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a ObjectDef, &'a PropertyDef)> {
        self.defs.iter().flat_map(move |def| {
            def.relations()
                .filter(move |(_, r)| r.target == name)
                .map(move |(p, _)| (def, p))
        })
    }
}
