//! Custom hook invocation with a bounded timeout.

use schemata_core::{Instance, Violation, ViolationKind};
use schemata_registry::ObjectDef;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

/// Runs an object definition's validation hook.
///
/// With a timeout the hook runs on its own thread and the caller waits at
/// most `timeout`; a hook that overruns is reported as `HookTimeout` and
/// its thread is left to finish on its own. Without a timeout the hook runs
/// inline. In both modes a panicking hook is reported as `HookFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookRunner {
    timeout: Option<Duration>,
}

impl Default for HookRunner {
    fn default() -> Self {
        Self::with_timeout(Duration::from_millis(5000))
    }
}

impl HookRunner {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Run hooks on the calling thread.
    pub fn inline() -> Self {
        Self { timeout: None }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Invoke the hook of `def`, if any, and return the violations it adds.
    pub fn run(&self, def: &ObjectDef, instance: &Instance, prior: &[Violation]) -> Vec<Violation> {
        let Some(hook) = def.hook().cloned() else {
            return Vec::new();
        };

        let Some(timeout) = self.timeout else {
            return match catch_unwind(AssertUnwindSafe(|| hook.apply_constraints(instance, prior))) {
                Ok(violations) => violations,
                Err(panic) => vec![hook_failed(def, &panic_message(panic.as_ref()))],
            };
        };

        let (tx, rx) = mpsc::channel();
        let instance = instance.clone();
        let prior = prior.to_vec();
        let spawned = thread::Builder::new()
            .name(format!("hook-{}", def.qualified_name))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| hook.apply_constraints(&instance, &prior)))
                    .map_err(|panic| panic_message(panic.as_ref()));
                // The receiver is gone once the caller has timed out.
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            return vec![hook_failed(def, &format!("could not start hook thread: {}", e))];
        }

        match rx.recv_timeout(timeout) {
            Ok(Ok(violations)) => violations,
            Ok(Err(message)) => vec![hook_failed(def, &message)],
            Err(RecvTimeoutError::Timeout) => {
                warn!(definition = %def.qualified_name, timeout_ms = timeout.as_millis() as u64, "validation hook timed out");
                vec![Violation::of_kind(
                    ViolationKind::HookTimeout,
                    "",
                    format!(
                        "Validation hook of {} did not return within {} ms",
                        def.qualified_name,
                        timeout.as_millis()
                    ),
                )]
            }
            Err(RecvTimeoutError::Disconnected) => {
                vec![hook_failed(def, "hook thread exited without a result")]
            }
        }
    }
}

fn hook_failed(def: &ObjectDef, message: &str) -> Violation {
    error!(definition = %def.qualified_name, reason = message, "validation hook failed");
    Violation::of_kind(
        ViolationKind::HookFailed,
        "",
        format!("Validation hook of {} failed: {}", def.qualified_name, message),
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
