//! Declaration surface: object definitions as already-parsed data.

use crate::TemplateOptions;
use serde::Deserialize;

/// A declared object definition, before template resolution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDefDecl {
    pub module: String,
    pub name: String,
    /// Property groups in display order.
    #[serde(default)]
    pub properties: Vec<PropertyGroupDecl>,
    /// Property-name tuples whose combined value must be distinct.
    #[serde(default)]
    pub uniques: Vec<Vec<String>>,
}

/// A named group of declared properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyGroupDecl {
    pub group: String,
    pub properties: Vec<PropertyDecl>,
}

/// One declared property: template identifier plus options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDecl {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub options: TemplateOptions,
}

impl ObjectDefDecl {
    /// Parse a declaration from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parse a declaration from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// `module.name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }
}
