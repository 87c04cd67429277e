//! Lifecycle actions over a stack collection.

pub mod destroy;

pub use destroy::DestroyAction;

use crate::status::Status;

/// How long to wait between polls of an in-flight remote operation.
pub const STACK_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

/// Per-stack final statuses of one executed (or outlined) plan.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// `(fqn, final status)` in plan order.
    pub results: Vec<(String, Status)>,
    /// Whether this was an outline-only run (no provider contact).
    pub outline_only: bool,
}

impl RunSummary {
    pub(crate) fn from_plan(plan: &crate::plan::Plan, outline_only: bool) -> Self {
        Self {
            results: plan
                .steps()
                .iter()
                .map(|s| (s.fqn().to_string(), s.status().clone()))
                .collect(),
            outline_only,
        }
    }

    /// Number of steps that ended in terminal failure.
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, s)| s.is_failed()).count()
    }

    /// Whether every step ended success-compatible.
    pub fn is_success(&self) -> bool {
        self.results.iter().all(|(_, s)| s.is_success())
    }
}
