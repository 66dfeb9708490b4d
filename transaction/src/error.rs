//! Write engine error types.

use thiserror::Error;

/// Errors from the write engine. A write that fails validation is not an
/// error; it comes back as `WriteOutcome::Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Unknown object definition, property or option.
    #[error("schema error: {0}")]
    Schema(#[from] schemata_registry::SchemaError),

    /// Locale configuration defect.
    #[error("locale configuration error: {0}")]
    Config(#[from] schemata_locale::ConfigError),

    /// Instance store refused the operation.
    #[error("store error: {0}")]
    Graph(#[from] schemata_core::GraphError),

    /// Constraint checking could not run.
    #[error("constraint error: {0}")]
    Constraint(#[from] schemata_constraint::ConstraintError),
}

/// Result type for write engine operations.
pub type TransactionResult<T> = Result<T, TransactionError>;
