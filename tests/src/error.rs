//! Error types for scenario runs.

use schemata_locale::CatalogLoadError;
use schemata_registry::SchemaError;
use schemata_transaction::TransactionError;
use thiserror::Error;

/// Errors raised while setting up or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("step '{step}': {message}")]
    AssertionFailed { step: String, message: String },

    #[error("invalid fixture declaration: {0}")]
    Declaration(#[from] serde_json::Error),

    #[error("fixture schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("fixture catalog error: {0}")]
    Catalog(#[from] CatalogLoadError),

    #[error("engine error: {0}")]
    Engine(#[from] TransactionError),
}

impl ScenarioError {
    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
