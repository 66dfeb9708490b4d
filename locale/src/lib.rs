//! Schemata Locale
//!
//! Resolves field labels and option display text for a requested locale,
//! walking a fallback chain (`fr-FR -> fr -> en-US`). A key that resolves
//! nowhere in the chain is a `ConfigError::MissingTranslation`, never a blank.

mod bundle;
mod catalog;
mod chain;
mod error;
mod resolver;
mod verify;

pub use bundle::{option_key, LocaleBundle, OPTION_KEY_PREFIX};
pub use catalog::LocaleCatalog;
pub use chain::{canonicalize, LocaleChain};
pub use error::{CatalogLoadError, ConfigError, ConfigResult};
pub use resolver::{LocaleResolver, DEFAULT_LOCALE};
pub use verify::verify_translations;
