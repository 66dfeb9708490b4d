//! Template resolution.
//!
//! A template identifier such as `text.i18n` or `relation.obligatory` names
//! a base kind followed by modifiers. Kinds form a closed set and each kind
//! carries the options it requires; `.obligatory` is a flag on top of the
//! kind rather than a kind of its own.

use crate::{Cardinality, OptionSet, PropertyDef, RelationSpec, SchemaError, SchemaResult, ValueType};
use schemata_core::Value;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

/// Template kind with its required options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKind {
    /// Free text; `localized` for `text.i18n`.
    Text { localized: bool },
    Integer,
    Boolean,
    /// Code from a closed option set.
    Option { option_set: OptionSet },
    /// Reference to instances of `related`.
    Relation {
        related: String,
        cardinality: Cardinality,
        acyclic: bool,
    },
}

/// A resolved template: kind plus the obligatory modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub kind: TemplateKind,
    pub obligatory: bool,
}

impl Template {
    /// Resolve a template identifier and its declared options.
    pub fn resolve(
        property: &str,
        identifier: &str,
        options: &TemplateOptions,
    ) -> SchemaResult<Template> {
        let mut segments = identifier.split('.');
        let base = segments.next().unwrap_or_default();

        let mut localized = false;
        let mut obligatory = false;
        for modifier in segments {
            match modifier {
                "i18n" if base == "text" && !localized => localized = true,
                "obligatory" if !obligatory => obligatory = true,
                _ => return Err(SchemaError::unknown_template(property, identifier)),
            }
        }

        let kind = match base {
            "text" => {
                options.reject(property, identifier, &["optionSet", "related", "multiple", "acyclic", "min", "max"])?;
                TemplateKind::Text { localized }
            }
            "integer" => {
                options.reject(property, identifier, &["optionSet", "related", "multiple", "acyclic", "pattern"])?;
                TemplateKind::Integer
            }
            "boolean" => {
                options.reject(
                    property,
                    identifier,
                    &["optionSet", "related", "multiple", "acyclic", "min", "max", "pattern"],
                )?;
                TemplateKind::Boolean
            }
            "option" => {
                options.reject(
                    property,
                    identifier,
                    &["related", "multiple", "acyclic", "min", "max", "pattern"],
                )?;
                let option_set = options
                    .option_set
                    .clone()
                    .ok_or_else(|| SchemaError::missing_option(property, identifier, "optionSet"))?;
                validate_option_set(property, &option_set)?;
                TemplateKind::Option { option_set }
            }
            "relation" => {
                options.reject(property, identifier, &["optionSet", "min", "max", "pattern", "default"])?;
                let related = options
                    .related
                    .clone()
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| SchemaError::missing_option(property, identifier, "related"))?;
                let cardinality = if options.multiple.unwrap_or(false) {
                    Cardinality::Many
                } else {
                    Cardinality::One
                };
                TemplateKind::Relation {
                    related,
                    cardinality,
                    acyclic: options.acyclic.unwrap_or(false),
                }
            }
            _ => return Err(SchemaError::unknown_template(property, identifier)),
        };

        Ok(Template { kind, obligatory })
    }

    /// Canonical identifier, e.g. `text.i18n.obligatory`.
    pub fn identifier(&self) -> String {
        let mut id = match &self.kind {
            TemplateKind::Text { localized: false } => "text".to_string(),
            TemplateKind::Text { localized: true } => "text.i18n".to_string(),
            TemplateKind::Integer => "integer".to_string(),
            TemplateKind::Boolean => "boolean".to_string(),
            TemplateKind::Option { .. } => "option".to_string(),
            TemplateKind::Relation { .. } => "relation".to_string(),
        };
        if self.obligatory {
            id.push_str(".obligatory");
        }
        id
    }

    /// Value shape of properties using this template.
    pub fn value_type(&self) -> ValueType {
        match &self.kind {
            TemplateKind::Text { localized: false } => ValueType::Text,
            TemplateKind::Text { localized: true } => ValueType::LocalizedText,
            TemplateKind::Integer => ValueType::Integer,
            TemplateKind::Boolean => ValueType::Boolean,
            TemplateKind::Option { .. } => ValueType::Option,
            TemplateKind::Relation { .. } => ValueType::Reference,
        }
    }
}

/// Options declared alongside a template identifier.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateOptions {
    #[serde(default)]
    pub option_set: Option<OptionSet>,
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub multiple: Option<bool>,
    #[serde(default)]
    pub acyclic: Option<bool>,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl TemplateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option_set(mut self, option_set: OptionSet) -> Self {
        self.option_set = Some(option_set);
        self
    }

    pub fn related(mut self, target: impl Into<String>) -> Self {
        self.related = Some(target.into());
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = Some(true);
        self
    }

    pub fn acyclic(mut self) -> Self {
        self.acyclic = Some(true);
        self
    }

    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Names of the options that are set.
    fn present(&self) -> Vec<&'static str> {
        let mut present = Vec::new();
        if self.option_set.is_some() {
            present.push("optionSet");
        }
        if self.related.is_some() {
            present.push("related");
        }
        if self.multiple.is_some() {
            present.push("multiple");
        }
        if self.acyclic.is_some() {
            present.push("acyclic");
        }
        if self.default.is_some() {
            present.push("default");
        }
        if self.min.is_some() {
            present.push("min");
        }
        if self.max.is_some() {
            present.push("max");
        }
        if self.pattern.is_some() {
            present.push("pattern");
        }
        present
    }

    /// Fail on the first present option listed in `forbidden`.
    fn reject(&self, property: &str, identifier: &str, forbidden: &[&str]) -> SchemaResult<()> {
        match self.present().into_iter().find(|o| forbidden.contains(o)) {
            Some(option) => Err(SchemaError::unexpected_option(property, identifier, option)),
            None => Ok(()),
        }
    }
}

/// Resolve a declared property into its contract.
///
/// `module` qualifies a relation target given without a module prefix.
pub fn resolve_property(
    module: &str,
    group: &str,
    name: &str,
    identifier: &str,
    options: &TemplateOptions,
) -> SchemaResult<PropertyDef> {
    let mut template = Template::resolve(name, identifier, options)?;

    if let TemplateKind::Relation { related, .. } = &mut template.kind {
        if !related.contains('.') {
            *related = format!("{}.{}", module, related);
        }
    }

    if let (Some(min), Some(max)) = (options.min, options.max) {
        if min > max {
            return Err(SchemaError::InvalidRange {
                property: name.to_string(),
                min,
                max,
            });
        }
    }

    let pattern = match &options.pattern {
        Some(p) => Some(regex_lite::Regex::new(p).map_err(|e| SchemaError::InvalidPattern {
            property: name.to_string(),
            message: e.to_string(),
        })?),
        None => None,
    };

    let default = match &options.default {
        Some(json) => Some(default_value(name, &template, options, json)?),
        None => None,
    };

    let option_set = match &template.kind {
        TemplateKind::Option { option_set } => Some(option_set.clone()),
        _ => None,
    };

    let relation = match &template.kind {
        TemplateKind::Relation {
            related,
            cardinality,
            acyclic,
        } => Some(RelationSpec {
            target: related.clone(),
            cardinality: *cardinality,
            obligatory: template.obligatory,
            acyclic: *acyclic,
        }),
        _ => None,
    };

    Ok(PropertyDef {
        name: name.to_string(),
        group: group.to_string(),
        value_type: template.value_type(),
        obligatory: template.obligatory,
        template,
        default,
        option_set,
        relation,
        min: options.min,
        max: options.max,
        pattern,
    })
}

fn validate_option_set(property: &str, option_set: &OptionSet) -> SchemaResult<()> {
    if option_set.options.is_empty() {
        return Err(SchemaError::invalid_option_set(property, "no options declared"));
    }
    let mut seen = HashSet::new();
    for code in &option_set.options {
        if code.is_empty() {
            return Err(SchemaError::invalid_option_set(property, "empty option code"));
        }
        if !seen.insert(code.as_str()) {
            return Err(SchemaError::invalid_option_set(
                property,
                format!("duplicate option code '{}'", code),
            ));
        }
    }
    Ok(())
}

/// Convert a declared JSON default into a value of the template's shape.
fn default_value(
    property: &str,
    template: &Template,
    options: &TemplateOptions,
    json: &serde_json::Value,
) -> SchemaResult<Value> {
    use serde_json::Value as Json;

    let mismatch = || {
        SchemaError::invalid_default(
            property,
            format!("{} is not a valid {} value", json, template.identifier()),
        )
    };

    match (&template.kind, json) {
        (TemplateKind::Text { localized: false }, Json::String(s)) => Ok(Value::Text(s.clone())),
        (TemplateKind::Text { localized: true }, Json::Object(map)) => {
            let mut localized = BTreeMap::new();
            for (locale, text) in map {
                let text = text.as_str().ok_or_else(mismatch)?;
                localized.insert(locale.clone(), text.to_string());
            }
            Ok(Value::Localized(localized))
        }
        (TemplateKind::Integer, Json::Number(n)) => {
            let i = n.as_i64().ok_or_else(mismatch)?;
            if options.min.is_some_and(|min| i < min) || options.max.is_some_and(|max| i > max) {
                return Err(SchemaError::invalid_default(property, format!("{} is out of range", i)));
            }
            Ok(Value::Int(i))
        }
        (TemplateKind::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (TemplateKind::Option { option_set }, Json::String(code)) => {
            if option_set.contains(code) {
                Ok(Value::Text(code.clone()))
            } else {
                Err(SchemaError::invalid_default(
                    property,
                    format!("'{}' is not in option set '{}'", code, option_set.code),
                ))
            }
        }
        _ => Err(mismatch()),
    }
}
