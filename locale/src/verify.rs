//! Eager translation coverage check.

use crate::{ConfigResult, LocaleCatalog, LocaleResolver};
use schemata_registry::Registry;
use tracing::{error, info};

/// Check that every field label and every option label of every registered
/// object definition resolves for each of `locales`.
///
/// Fails with the first `MissingTranslation` found, so a gap in the
/// translation files stops startup instead of showing up at display time.
pub fn verify_translations<S: AsRef<str>>(
    registry: &Registry,
    catalog: &LocaleCatalog,
    resolver: &LocaleResolver,
    locales: &[S],
) -> ConfigResult<()> {
    if locales.is_empty() {
        return Ok(());
    }

    let mut checked = 0usize;
    for def in registry.all() {
        for locale in locales {
            let locale = locale.as_ref();
            for prop in &def.properties {
                resolver
                    .resolve_label(catalog, def, prop.label_key(), locale)
                    .inspect_err(|e| error!(definition = %def.qualified_name, %e, "translation check failed"))?;
                checked += 1;
            }
            for (_, option_set) in def.option_sets() {
                for code in option_set.iter() {
                    resolver
                        .resolve_option(catalog, def, code, locale)
                        .inspect_err(|e| error!(definition = %def.qualified_name, %e, "translation check failed"))?;
                    checked += 1;
                }
            }
        }
    }

    info!(labels = checked, locales = locales.len(), "translations verified");
    Ok(())
}
