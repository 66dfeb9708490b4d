//! Instance structures for Schemata.

use crate::{InstanceId, ObjectDefId, Properties, Value};

/// An instance of a registered object definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Unique identifier for this instance.
    pub id: InstanceId,
    /// Owning object definition (reference to registry).
    pub def_id: ObjectDefId,
    /// Version number, bumped on every property change.
    pub version: u64,
    /// Property values.
    pub properties: Properties,
}

impl Instance {
    /// Create a new instance with the given properties.
    pub fn new(id: InstanceId, def_id: ObjectDefId, properties: Properties) -> Self {
        Self {
            id,
            def_id,
            version: 1,
            properties,
        }
    }

    /// Get a property value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Set a property value.
    pub fn set(&mut self, name: String, value: Value) {
        self.properties.insert(name, value);
        self.version += 1;
    }

    /// Remove a property.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let result = self.properties.remove(name);
        if result.is_some() {
            self.version += 1;
        }
        result
    }

    /// Apply a patch: `Null` removes the property, anything else replaces it.
    pub fn apply_patch(&mut self, patch: Properties) {
        for (name, value) in patch {
            if value.is_null() {
                self.remove(&name);
            } else {
                self.set(name, value);
            }
        }
    }

    /// Ids referenced through a property, in declaration order.
    pub fn references(&self, property: &str) -> Vec<InstanceId> {
        self.get(property)
            .map(|v| v.referenced_ids())
            .unwrap_or_default()
    }

    /// Check if any property references the given instance.
    pub fn references_instance(&self, target: InstanceId) -> bool {
        self.properties
            .values()
            .any(|v| v.referenced_ids().contains(&target))
    }
}
