//! A single stack's execution unit within a plan.

use crate::status::Status;
use crate::types::Stack;
use std::collections::BTreeSet;
use std::sync::Arc;

/// One stack bound to its current status and dependency references.
///
/// Created once per plan per stack and mutated only by the walker applying
/// the result of the step's action function.
#[derive(Debug, Clone)]
pub struct Step {
    stack: Arc<Stack>,
    status: Status,
    requires: BTreeSet<String>,
}

impl Step {
    pub(crate) fn new(stack: Arc<Stack>, requires: BTreeSet<String>) -> Self {
        Self { stack, status: Status::Pending, requires }
    }

    /// The stack this step operates on.
    pub fn stack(&self) -> &Arc<Stack> {
        &self.stack
    }

    /// FQN of the stack this step operates on.
    pub fn fqn(&self) -> &str {
        &self.stack.fqn
    }

    /// Current status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// FQNs of the steps this one waits on, restricted to plan members.
    pub fn requires(&self) -> &BTreeSet<String> {
        &self.requires
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}
