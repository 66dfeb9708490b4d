//! Schemata Registry
//!
//! Runtime schema lookup. Single source of truth for object definitions,
//! their resolved property contracts, relations, uniqueness constraints and
//! validation hooks. The registry is immutable after construction via
//! RegistryBuilder.

mod builder;
mod declaration;
mod error;
mod hook;
mod registry;
mod template;
mod types;

pub use builder::{ObjectDefBuilder, RegistryBuilder};
pub use declaration::{ObjectDefDecl, PropertyDecl, PropertyGroupDecl};
pub use error::{SchemaError, SchemaResult};
pub use hook::ValidationHook;
pub use registry::Registry;
pub use template::{resolve_property, Template, TemplateKind, TemplateOptions};
pub use types::*;
