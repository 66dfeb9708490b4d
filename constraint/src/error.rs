//! Constraint error types.

use schemata_core::ObjectDefId;
use thiserror::Error;

/// Result type for constraint operations.
pub type ConstraintResult<T> = Result<T, ConstraintError>;

/// Errors that prevent a constraint check from running at all. Failed
/// checks are never errors; they are returned as violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Instance belongs to unknown object definition {0}")]
    UnknownDefinition(ObjectDefId),
}
