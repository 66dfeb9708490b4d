//! Common error types for Schemata.

use crate::InstanceId;
use thiserror::Error;

/// Errors that can occur during instance store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Instance not found.
    #[error("Instance not found: {0}")]
    InstanceNotFound(InstanceId),

    /// Instance id already taken.
    #[error("Instance already exists: {0}")]
    DuplicateInstance(InstanceId),

    /// Cannot delete an instance because other instances reference it.
    #[error("Cannot delete instance {id}: referenced by {referrers:?}")]
    ReferencedBy {
        id: InstanceId,
        referrers: Vec<InstanceId>,
    },
}

/// Result type for instance store operations.
pub type GraphResult<T> = Result<T, GraphError>;
