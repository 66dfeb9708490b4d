//! Schemata Graph
//!
//! Accepted instances and the relation edges between them:
//! - Instance storage with a shared id allocator
//! - Type index: find instances of an object definition
//! - Property index: find instances by exact value tuples
//! - Reverse-reference index: find instances referencing an instance
//! - Relation graph: cardinality checks, cycle detection and traversal

mod graph;
mod index;
mod relation;

pub use graph::Graph;
pub use index::AttrValue;
pub use relation::{detect_cycle, RelationGraph};
