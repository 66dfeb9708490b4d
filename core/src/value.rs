//! Value types for instance properties.
//!
//! Values are the atomic data stored in instance properties. Schemata
//! supports scalar types (Text, Int, Bool), localized text keyed by locale
//! tag, and reference types (a single target id or a list of target ids).

use crate::InstanceId;
use std::collections::BTreeMap;
use std::fmt;

/// A value that can be stored in a property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// UTF-8 string. Also carries option codes.
    Text(String),
    /// Localized text: locale tag -> string.
    Localized(BTreeMap<String, String>),
    /// Reference to a single instance.
    Ref(InstanceId),
    /// References to several instances. Kept as a list so duplicates stay
    /// observable to validation.
    Refs(Vec<InstanceId>),
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if the value counts as absent for obligatory checks.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Localized(map) => map.values().all(|s| s.is_empty()),
            Value::Refs(ids) => ids.is_empty(),
            _ => false,
        }
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the localized map if this is a Localized value.
    pub fn as_localized(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Localized(map) => Some(map),
            _ => None,
        }
    }

    /// Get as instance id if this is a Ref value.
    pub fn as_ref_id(&self) -> Option<InstanceId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// All instance ids referenced by this value, in order.
    pub fn referenced_ids(&self) -> Vec<InstanceId> {
        match self {
            Value::Ref(id) => vec![*id],
            Value::Refs(ids) => ids.clone(),
            _ => Vec::new(),
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Text(_) => "Text",
            Value::Localized(_) => "Localized",
            Value::Ref(_) => "Ref",
            Value::Refs(_) => "Refs",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Localized(map) => {
                write!(f, "{{")?;
                for (i, (locale, text)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: \"{}\"", locale, text)?;
                }
                write!(f, "}}")
            }
            Value::Ref(id) => write!(f, "{}", id),
            Value::Refs(ids) => {
                write!(f, "[")?;
                for (i, id) in ids.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", id)?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<InstanceId> for Value {
    fn from(id: InstanceId) -> Self {
        Value::Ref(id)
    }
}

impl From<Vec<InstanceId>> for Value {
    fn from(ids: Vec<InstanceId>) -> Self {
        Value::Refs(ids)
    }
}

impl From<BTreeMap<String, String>> for Value {
    fn from(map: BTreeMap<String, String>) -> Self {
        Value::Localized(map)
    }
}

/// Type alias for property storage.
pub type Properties = std::collections::HashMap<String, Value>;

/// Helper macro to create property maps.
#[macro_export]
macro_rules! props {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = std::collections::HashMap::new();
            $(
                map.insert($key.to_string(), $crate::Value::from($value));
            )+
            map
        }
    };
}
