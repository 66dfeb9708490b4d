//! Schemata Constraint
//!
//! Validate a candidate instance against its object definition.
//!
//! Responsibilities:
//! - Property checks: obligatory presence, value shape, option sets, ranges, patterns
//! - Relation checks through the relation graph
//! - Uniqueness lookups against stored instances
//! - Custom hook invocation under a timeout
//!
//! Violations accumulate across all steps; nothing here short-circuits.

mod checker;
mod error;
mod hook;

pub use checker::{apply_defaults, ConstraintChecker};
pub use error::{ConstraintError, ConstraintResult};
pub use hook::HookRunner;
