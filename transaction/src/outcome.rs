//! Write results.

use schemata_core::{InstanceId, Violation, Violations};

/// Result of a validated write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// No entry was reported and the write was committed.
    Accepted { id: InstanceId },
    /// The write was refused; the complete, ordered list of entries,
    /// warnings included.
    Rejected { violations: Violations },
}

impl WriteOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WriteOutcome::Accepted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }

    /// Id of the committed instance.
    pub fn id(&self) -> Option<InstanceId> {
        match self {
            WriteOutcome::Accepted { id } => Some(*id),
            WriteOutcome::Rejected { .. } => None,
        }
    }

    /// Every reported entry; empty for an accepted write.
    pub fn violations(&self) -> &[Violation] {
        match self {
            WriteOutcome::Accepted { .. } => &[],
            WriteOutcome::Rejected { violations } => violations.all(),
        }
    }
}
