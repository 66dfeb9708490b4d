//! Step-by-step scenario driver.

use schemata_core::{InstanceId, Properties};
use schemata_transaction::{TransactionResult, WriteEngine, WriteOutcome};
use std::collections::HashMap;
use tracing::debug;

use crate::assertion::Assertion;
use crate::error::{ScenarioError, ScenarioResult};

/// Runs named writes against an engine and checks each result as it goes.
///
/// Accepted creates are remembered under their step name so later steps can
/// reference them with [`Scenario::id`].
pub struct Scenario {
    name: String,
    engine: WriteEngine,
    created: HashMap<String, InstanceId>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, engine: WriteEngine) -> Self {
        Self {
            name: name.into(),
            engine,
            created: HashMap::new(),
        }
    }

    pub fn engine(&self) -> &WriteEngine {
        &self.engine
    }

    /// Id created by an earlier accepted step.
    pub fn id(&self, step: &str) -> ScenarioResult<InstanceId> {
        self.created.get(step).copied().ok_or_else(|| {
            ScenarioError::assertion_failed(step, format!("no instance created in scenario '{}'", self.name))
        })
    }

    /// Create an instance and check the result.
    pub fn create(
        &mut self,
        step: &str,
        definition: &str,
        properties: Properties,
        assert: impl FnOnce(Assertion) -> Assertion,
    ) -> ScenarioResult<Option<InstanceId>> {
        let result = self.engine.create(definition, properties);
        let id = self.check(step, &result, assert)?;
        if let Some(id) = id {
            self.created.insert(step.to_string(), id);
        }
        Ok(id)
    }

    /// Patch an instance created by an earlier step and check the result.
    pub fn update(
        &mut self,
        step: &str,
        target: &str,
        patch: Properties,
        assert: impl FnOnce(Assertion) -> Assertion,
    ) -> ScenarioResult<()> {
        let id = self.id(target)?;
        let result = self.engine.update(id, patch);
        self.check(step, &result, assert)?;
        Ok(())
    }

    fn check(
        &self,
        step: &str,
        result: &TransactionResult<WriteOutcome>,
        assert: impl FnOnce(Assertion) -> Assertion,
    ) -> ScenarioResult<Option<InstanceId>> {
        debug!(scenario = %self.name, step, "running step");
        assert(Assertion::new()).verify(step, result)?;
        Ok(result.as_ref().ok().and_then(WriteOutcome::id))
    }
}
