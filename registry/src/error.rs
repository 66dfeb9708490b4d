//! Schema error types.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while declaring, registering or looking up object
/// definitions. All of them are fatal for the registry being built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Duplicate object definition name: {0}")]
    DuplicateName(String),

    #[error("Duplicate property '{property}' on {definition}")]
    DuplicateProperty { definition: String, property: String },

    #[error("Unknown template '{template}' for property '{property}'")]
    UnknownTemplate { property: String, template: String },

    #[error("Template '{template}' on property '{property}' requires option '{option}'")]
    MissingOption {
        property: String,
        template: String,
        option: String,
    },

    #[error("Option '{option}' is not valid for template '{template}' on property '{property}'")]
    UnexpectedOption {
        property: String,
        template: String,
        option: String,
    },

    #[error("Invalid default for property '{property}': {reason}")]
    InvalidDefault { property: String, reason: String },

    #[error("Invalid range for property '{property}': min {min} > max {max}")]
    InvalidRange { property: String, min: i64, max: i64 },

    #[error("Invalid pattern for property '{property}': {message}")]
    InvalidPattern { property: String, message: String },

    #[error("Invalid option set for property '{property}': {reason}")]
    InvalidOptionSet { property: String, reason: String },

    #[error("Relation '{property}' on {definition} targets unknown object definition '{target}'")]
    UnresolvedRelationTarget {
        definition: String,
        property: String,
        target: String,
    },

    #[error("Acyclic relation '{property}' on {definition} must target {definition}, not '{target}'")]
    AcyclicTargetMismatch {
        definition: String,
        property: String,
        target: String,
    },

    #[error("Unique constraint on {definition} references unknown property '{property}'")]
    UnknownUniqueProperty { definition: String, property: String },

    #[error("Empty unique constraint on {definition}")]
    EmptyUniqueConstraint { definition: String },

    #[error("Unique constraint on {definition} repeats property '{property}'")]
    DuplicateUniqueProperty { definition: String, property: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl SchemaError {
    pub fn unknown_template(property: impl Into<String>, template: impl Into<String>) -> Self {
        Self::UnknownTemplate {
            property: property.into(),
            template: template.into(),
        }
    }

    pub fn missing_option(
        property: impl Into<String>,
        template: impl Into<String>,
        option: impl Into<String>,
    ) -> Self {
        Self::MissingOption {
            property: property.into(),
            template: template.into(),
            option: option.into(),
        }
    }

    pub fn unexpected_option(
        property: impl Into<String>,
        template: impl Into<String>,
        option: impl Into<String>,
    ) -> Self {
        Self::UnexpectedOption {
            property: property.into(),
            template: template.into(),
            option: option.into(),
        }
    }

    pub fn invalid_default(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefault {
            property: property.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_option_set(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOptionSet {
            property: property.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }
}
