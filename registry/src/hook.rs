//! Custom validation hook contract.

use schemata_core::{Instance, Violation};

/// A per-definition validation hook.
///
/// Receives the candidate instance and every violation accumulated by the
/// built-in checks, and returns additional violations. Returned violations
/// are appended; the hook cannot remove what came before it.
///
/// Hooks are treated as blocking calls and may be run on a worker thread
/// under a timeout, hence the `Send + Sync + 'static` bound.
pub trait ValidationHook: Send + Sync + 'static {
    fn apply_constraints(&self, instance: &Instance, prior: &[Violation]) -> Vec<Violation>;
}

/// Convenience: closures implement ValidationHook.
impl<F> ValidationHook for F
where
    F: Fn(&Instance, &[Violation]) -> Vec<Violation> + Send + Sync + 'static,
{
    fn apply_constraints(&self, instance: &Instance, prior: &[Violation]) -> Vec<Violation> {
        (self)(instance, prior)
    }
}
