//! Indexes for efficient instance lookups.

use schemata_core::{InstanceId, ObjectDefId, Value};
use std::collections::{HashMap, HashSet};

/// Type index: ObjectDefId -> Set<InstanceId>
#[derive(Debug, Default)]
pub struct TypeIndex {
    index: HashMap<ObjectDefId, HashSet<InstanceId>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, def_id: ObjectDefId, id: InstanceId) {
        self.index.entry(def_id).or_default().insert(id);
    }

    pub fn remove(&mut self, def_id: ObjectDefId, id: InstanceId) {
        if let Some(set) = self.index.get_mut(&def_id) {
            set.remove(&id);
            if set.is_empty() {
                self.index.remove(&def_id);
            }
        }
    }

    pub fn get(&self, def_id: ObjectDefId) -> impl Iterator<Item = InstanceId> + '_ {
        self.index
            .get(&def_id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn count(&self, def_id: ObjectDefId) -> usize {
        self.index.get(&def_id).map_or(0, HashSet::len)
    }
}

/// Key for attribute index: (ObjectDefId, property name, value)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrKey {
    pub def_id: ObjectDefId,
    pub property: String,
    pub value: AttrValue,
}

/// Hashable form of a property value for exact-match lookups.
///
/// Text compares byte-for-byte. Reference sets are sorted so that two
/// sets with the same members index the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Localized(Vec<(String, String)>),
    Ref(InstanceId),
    Refs(Vec<InstanceId>),
}

impl AttrValue {
    /// Blank values are not indexed.
    pub fn from_value(value: &Value) -> Option<Self> {
        if value.is_blank() {
            return None;
        }
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(AttrValue::Bool(*b)),
            Value::Int(i) => Some(AttrValue::Int(*i)),
            Value::Text(s) => Some(AttrValue::Text(s.clone())),
            Value::Localized(map) => Some(AttrValue::Localized(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            Value::Ref(id) => Some(AttrValue::Ref(*id)),
            Value::Refs(ids) => {
                let mut ids = ids.clone();
                ids.sort();
                ids.dedup();
                Some(AttrValue::Refs(ids))
            }
        }
    }
}

/// Attribute index: (ObjectDefId, property, value) -> Set<InstanceId>
#[derive(Debug, Default)]
pub struct AttributeIndex {
    exact: HashMap<AttrKey, HashSet<InstanceId>>,
}

impl AttributeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(def_id: ObjectDefId, property: &str, value: &Value) -> Option<AttrKey> {
        AttrValue::from_value(value).map(|value| AttrKey {
            def_id,
            property: property.to_string(),
            value,
        })
    }

    pub fn insert(&mut self, def_id: ObjectDefId, property: &str, value: &Value, id: InstanceId) {
        if let Some(key) = Self::key(def_id, property, value) {
            self.exact.entry(key).or_default().insert(id);
        }
    }

    pub fn remove(&mut self, def_id: ObjectDefId, property: &str, value: &Value, id: InstanceId) {
        if let Some(key) = Self::key(def_id, property, value) {
            if let Some(set) = self.exact.get_mut(&key) {
                set.remove(&id);
                if set.is_empty() {
                    self.exact.remove(&key);
                }
            }
        }
    }

    pub fn find_exact(
        &self,
        def_id: ObjectDefId,
        property: &str,
        value: &Value,
    ) -> impl Iterator<Item = InstanceId> + '_ {
        Self::key(def_id, property, value)
            .and_then(|key| self.exact.get(&key))
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// Reverse-reference index: target InstanceId -> Set<referring InstanceId>
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    index: HashMap<InstanceId, HashSet<InstanceId>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: InstanceId, source: InstanceId) {
        self.index.entry(target).or_default().insert(source);
    }

    pub fn remove(&mut self, target: InstanceId, source: InstanceId) {
        if let Some(set) = self.index.get_mut(&target) {
            set.remove(&source);
            if set.is_empty() {
                self.index.remove(&target);
            }
        }
    }

    /// Instances that reference `target`.
    pub fn referrers(&self, target: InstanceId) -> impl Iterator<Item = InstanceId> + '_ {
        self.index
            .get(&target)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
