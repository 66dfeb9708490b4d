//! Schemata Core Types
//!
//! This crate provides the foundational types used throughout Schemata:
//! - Identity types (InstanceId, ObjectDefId)
//! - Value types (the Value enum with scalar, localized and reference values)
//! - Instance structures
//! - Violations, the data shape of every validation failure
//! - Common error types

mod entity;
mod error;
mod id;
mod value;
mod violation;

pub use entity::*;
pub use error::*;
pub use id::*;
pub use value::*;
pub use violation::*;
