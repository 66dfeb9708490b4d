//! Schemata Transaction
//!
//! The write path: every create, update and delete of an instance goes
//! through the `WriteEngine`, which applies defaults, runs the constraint
//! checks and the definition's hook, and commits only when no error-level
//! violation was raised.
//!
//! Responsibilities:
//! - Serialize uniqueness check and insert per object definition
//! - Run hooks outside the store lock
//! - Re-verify relation targets at commit
//! - Restrict deletes of referenced instances
//! - Resolve field and option labels through the locale catalog

mod config;
mod error;
mod manager;
mod outcome;

pub use config::EngineConfig;
pub use error::{TransactionError, TransactionResult};
pub use manager::WriteEngine;
pub use outcome::WriteOutcome;
