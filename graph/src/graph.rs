//! In-memory instance store.

use crate::index::{AttributeIndex, ReferenceIndex, TypeIndex};
use schemata_core::{GraphError, GraphResult, Instance, InstanceId, ObjectDefId, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

/// ID allocator for instances. Allocation only needs `&self`, so ids can be
/// handed out while the store is shared for reading.
#[derive(Debug)]
struct IdAllocator {
    next_instance_id: AtomicU64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_instance_id: AtomicU64::new(1),
        }
    }

    fn alloc_instance_id(&self) -> InstanceId {
        InstanceId::new(self.next_instance_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Accepted instances with type, property and reverse-reference indexes.
///
/// The store does no validation of its own beyond id bookkeeping and the
/// delete restriction; every write reaching it has already been accepted.
#[derive(Debug)]
pub struct Graph {
    /// Instance storage
    instances: HashMap<InstanceId, Instance>,
    /// ID allocator
    id_alloc: IdAllocator,
    /// Type index
    type_index: TypeIndex,
    /// Property value index
    attr_index: AttributeIndex,
    /// Reverse-reference index
    ref_index: ReferenceIndex,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
            id_alloc: IdAllocator::new(),
            type_index: TypeIndex::new(),
            attr_index: AttributeIndex::new(),
            ref_index: ReferenceIndex::new(),
        }
    }

    /// Reserve a fresh instance id.
    pub fn alloc_id(&self) -> InstanceId {
        self.id_alloc.alloc_instance_id()
    }

    // ==================== Instance Operations ====================

    /// Insert an accepted instance.
    pub fn insert(&mut self, instance: Instance) -> GraphResult<()> {
        if self.instances.contains_key(&instance.id) {
            return Err(GraphError::DuplicateInstance(instance.id));
        }
        self.index(&instance);
        self.instances.insert(instance.id, instance);
        Ok(())
    }

    /// Replace an existing instance, returning the previous state.
    pub fn replace(&mut self, instance: Instance) -> GraphResult<Instance> {
        let old = self
            .instances
            .remove(&instance.id)
            .ok_or(GraphError::InstanceNotFound(instance.id))?;
        self.unindex(&old);
        self.index(&instance);
        self.instances.insert(instance.id, instance);
        Ok(old)
    }

    /// Remove an instance. Refused while any other instance references it.
    pub fn remove(&mut self, id: InstanceId) -> GraphResult<Instance> {
        if !self.instances.contains_key(&id) {
            return Err(GraphError::InstanceNotFound(id));
        }

        let mut referrers: Vec<InstanceId> =
            self.ref_index.referrers(id).filter(|r| *r != id).collect();
        if !referrers.is_empty() {
            referrers.sort();
            return Err(GraphError::ReferencedBy { id, referrers });
        }

        let instance = self
            .instances
            .remove(&id)
            .ok_or(GraphError::InstanceNotFound(id))?;
        self.unindex(&instance);
        Ok(instance)
    }

    /// Get an instance by ID.
    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    // ==================== Query Operations ====================

    /// Instances of an object definition.
    pub fn instances_of(&self, def_id: ObjectDefId) -> impl Iterator<Item = InstanceId> + '_ {
        self.type_index.get(def_id)
    }

    pub fn count_of(&self, def_id: ObjectDefId) -> usize {
        self.type_index.count(def_id)
    }

    /// Instances of `def_id` whose values equal `tuple` on every component.
    /// An absent or blank component matches instances where that property is
    /// also absent or blank.
    pub fn find_by_tuple(
        &self,
        def_id: ObjectDefId,
        tuple: &[(&str, Option<&Value>)],
    ) -> Vec<InstanceId> {
        if tuple.is_empty() {
            return Vec::new();
        }

        let mut matches: Option<HashSet<InstanceId>> = None;
        for &(prop, value) in tuple {
            let Some(value) = value.filter(|v| !v.is_blank()) else {
                continue;
            };
            let found: HashSet<InstanceId> =
                self.attr_index.find_exact(def_id, prop, value).collect();
            match matches.as_mut() {
                Some(matches) => matches.retain(|id| found.contains(id)),
                None => matches = Some(found),
            }
        }
        let mut matches =
            matches.unwrap_or_else(|| self.type_index.get(def_id).collect::<HashSet<_>>());

        for &(prop, value) in tuple {
            if value.is_some_and(|v| !v.is_blank()) {
                continue;
            }
            matches.retain(|id| {
                self.instances
                    .get(id)
                    .and_then(|instance| instance.get(prop))
                    .map_or(true, Value::is_blank)
            });
        }

        let mut matches: Vec<_> = matches.into_iter().collect();
        matches.sort();
        matches
    }

    /// Instances holding a reference to `id`, through any property.
    pub fn referrers(&self, id: InstanceId) -> impl Iterator<Item = InstanceId> + '_ {
        self.ref_index.referrers(id)
    }

    // ==================== Statistics ====================

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Get all instance IDs.
    pub fn all_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.instances.keys().copied()
    }

    fn index(&mut self, instance: &Instance) {
        self.type_index.insert(instance.def_id, instance.id);
        for (prop, value) in &instance.properties {
            self.attr_index.insert(instance.def_id, prop, value, instance.id);
            for target in value.referenced_ids() {
                self.ref_index.insert(target, instance.id);
            }
        }
    }

    fn unindex(&mut self, instance: &Instance) {
        self.type_index.remove(instance.def_id, instance.id);
        for (prop, value) in &instance.properties {
            self.attr_index.remove(instance.def_id, prop, value, instance.id);
            for target in value.referenced_ids() {
                self.ref_index.remove(target, instance.id);
            }
        }
    }
}
