//! Schema definition types.

use crate::{Template, ValidationHook};
use schemata_core::{ObjectDefId, Value};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// The value shape a property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    LocalizedText,
    Integer,
    Boolean,
    /// An option code drawn from the property's option set.
    Option,
    /// One or several instance ids.
    Reference,
}

impl ValueType {
    /// Check whether a value has the right shape. Null is accepted by every
    /// type; presence is the obligatory check's concern.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (ValueType::Text, Value::Text(_))
                | (ValueType::LocalizedText, Value::Localized(_))
                | (ValueType::Integer, Value::Int(_))
                | (ValueType::Boolean, Value::Bool(_))
                | (ValueType::Option, Value::Text(_))
                | (ValueType::Reference, Value::Ref(_))
                | (ValueType::Reference, Value::Refs(_))
        )
    }

    /// Returns the type name.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Text => "Text",
            ValueType::LocalizedText => "LocalizedText",
            ValueType::Integer => "Integer",
            ValueType::Boolean => "Boolean",
            ValueType::Option => "Option",
            ValueType::Reference => "Reference",
        }
    }
}

/// A closed enumeration of valid codes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OptionSet {
    /// Code identifying the set.
    pub code: String,
    /// Valid option codes, in display order.
    pub options: Vec<String>,
}

impl OptionSet {
    pub fn new<I, S>(code: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.into(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact membership test.
    pub fn contains(&self, code: &str) -> bool {
        self.options.iter().any(|o| o == code)
    }

    /// Iterate option codes in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|s| s.as_str())
    }
}

/// Relation cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// A single target id.
    #[default]
    One,
    /// A set of target ids.
    Many,
}

/// Relation from a property to instances of a target object definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    /// Qualified name of the target object definition.
    pub target: String,
    /// Single or multiple.
    pub cardinality: Cardinality,
    /// Whether a value must be present.
    pub obligatory: bool,
    /// Whether following this relation must never lead back to the instance.
    pub acyclic: bool,
}

impl RelationSpec {
    pub fn is_many(&self) -> bool {
        self.cardinality == Cardinality::Many
    }
}

/// A resolved property contract.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    /// Property name, also its label key.
    pub name: String,
    /// Property group the property was declared in.
    pub group: String,
    /// Template the contract was resolved from.
    pub template: Template,
    /// Value shape.
    pub value_type: ValueType,
    /// Default applied when the property is absent.
    pub default: Option<Value>,
    /// Whether the property must be present.
    pub obligatory: bool,
    /// Option set for option-valued properties.
    pub option_set: Option<OptionSet>,
    /// Relation spec for relation-valued properties.
    pub relation: Option<RelationSpec>,
    /// Minimum value (Integer).
    pub min: Option<i64>,
    /// Maximum value (Integer).
    pub max: Option<i64>,
    /// Pattern every text value must match (Text).
    pub pattern: Option<regex_lite::Regex>,
}

impl PropertyDef {
    /// The label key for this property.
    pub fn label_key(&self) -> &str {
        &self.name
    }

    /// Check if this property holds a relation.
    pub fn is_relation(&self) -> bool {
        self.relation.is_some()
    }
}

/// A tuple of properties whose combined value must be distinct across all
/// instances of an object definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub properties: Vec<String>,
}

impl UniqueConstraint {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    /// Human-readable name of the tuple, e.g. `url, port`.
    pub fn name(&self) -> String {
        self.properties.join(", ")
    }
}

/// A named group of properties, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyGroup {
    pub name: String,
    pub properties: Vec<String>,
}

/// A registered object definition.
#[derive(Clone)]
pub struct ObjectDef {
    /// Unique identifier.
    pub id: ObjectDefId,
    /// Module namespace.
    pub module: String,
    /// Name within the module.
    pub name: String,
    /// `module.name`.
    pub qualified_name: String,
    /// Property groups in declaration order.
    pub groups: Vec<PropertyGroup>,
    /// Resolved property contracts in declaration order.
    pub properties: Vec<PropertyDef>,
    /// Uniqueness constraints.
    pub uniques: Vec<UniqueConstraint>,
    /// Custom validation hook.
    pub hook: Option<Arc<dyn ValidationHook>>,
}

impl ObjectDef {
    /// Get a property definition by name.
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Check if this definition declares a property.
    pub fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Get all property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Relation-valued properties with their specs.
    pub fn relations(&self) -> impl Iterator<Item = (&PropertyDef, &RelationSpec)> {
        self.properties
            .iter()
            .filter_map(|p| p.relation.as_ref().map(|r| (p, r)))
    }

    /// Relations whose target is this same definition.
    pub fn self_relations(&self) -> impl Iterator<Item = (&PropertyDef, &RelationSpec)> {
        self.relations()
            .filter(move |(_, r)| r.target == self.qualified_name)
    }

    /// Option-valued properties with their option sets.
    pub fn option_sets(&self) -> impl Iterator<Item = (&PropertyDef, &OptionSet)> {
        self.properties
            .iter()
            .filter_map(|p| p.option_set.as_ref().map(|o| (p, o)))
    }

    /// The custom validation hook, if any.
    pub fn hook(&self) -> Option<&Arc<dyn ValidationHook>> {
        self.hook.as_ref()
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }
}

impl fmt::Debug for ObjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDef")
            .field("id", &self.id)
            .field("qualified_name", &self.qualified_name)
            .field("groups", &self.groups)
            .field("properties", &self.properties)
            .field("uniques", &self.uniques)
            .field("hook", &self.hook.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
