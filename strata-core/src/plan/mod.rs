//! Plan construction and display.
//!
//! A plan is an ordered (topologically sorted) collection of steps over a
//! dependency graph, optionally reversed for destroy semantics and restricted
//! to a target subset. It supports a side-effect-free outline mode and an
//! execution mode driven by the [`Walker`].

pub mod graph;
pub mod step;
pub mod walker;

pub use graph::Graph;
pub use step::Step;
pub use walker::Walker;

use crate::error::Result;
use crate::status::Status;
use crate::types::Stack;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The action function bound to every step of a plan.
///
/// Invoked repeatedly while the step is non-terminal; each invocation
/// receives the step's current status so the action can distinguish a first
/// attempt from a poll of an in-flight attempt. A returned error is recorded
/// as a `Failed` status for that step only.
#[async_trait]
pub trait StepAction: Send + Sync {
    async fn execute(
        &self,
        stack: &Stack,
        current: &Status,
        cancel: &CancellationToken,
    ) -> Result<Status>;
}

/// An ordered, dependency-respecting collection of steps for one run.
pub struct Plan {
    description: String,
    steps: Vec<Step>,
    index: HashMap<String, usize>,
    action: Arc<dyn StepAction>,
}

impl Plan {
    /// Construct a plan over `stacks`.
    ///
    /// Builds the dependency graph (reversed when `reverse` is set, which
    /// turns build order into destroy order), restricts it to `targets` plus
    /// everything they transitively require (empty = all), and binds
    /// `action` to every step.
    pub fn build(
        description: impl Into<String>,
        action: Arc<dyn StepAction>,
        stacks: &[Arc<Stack>],
        targets: &[String],
        reverse: bool,
    ) -> Result<Self> {
        let pairs: Vec<(&str, &std::collections::BTreeSet<String>)> =
            stacks.iter().map(|s| (s.fqn.as_str(), &s.requires)).collect();
        let mut graph = Graph::build(pairs)?;
        if reverse {
            graph = graph.reverse();
        }
        let graph = graph.restrict(targets);
        let order = graph.topological_sort()?;

        let by_fqn: HashMap<&str, &Arc<Stack>> =
            stacks.iter().map(|s| (s.fqn.as_str(), s)).collect();

        let mut steps = Vec::with_capacity(order.len());
        let mut index = HashMap::with_capacity(order.len());
        for fqn in order {
            let stack = Arc::clone(by_fqn[fqn.as_str()]);
            let requires = graph
                .requires(&fqn)
                .cloned()
                .unwrap_or_default();
            index.insert(fqn, steps.len());
            steps.push(Step::new(stack, requires));
        }

        Ok(Self { description: description.into(), steps, index, action })
    }

    /// Human-readable description of the plan.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Steps in topological order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk the plan without invoking any action, logging each step and
    /// marking it complete for display purposes only. Never contacts the
    /// provider.
    pub fn outline(&mut self, message: Option<&str>) {
        self.outline_at(false, message);
    }

    /// Debug-level outline, logged before a forced run executes.
    pub(crate) fn outline_debug(&mut self) {
        self.outline_at(true, None);
    }

    fn outline_at(&mut self, quiet: bool, message: Option<&str>) {
        macro_rules! emit {
            ($($arg:tt)*) => {
                if quiet {
                    debug!($($arg)*);
                } else {
                    info!($($arg)*);
                }
            };
        }

        emit!(plan = %self.description, steps = self.steps.len(), "plan outline");
        for (i, step) in self.steps.iter_mut().enumerate() {
            emit!(
                "  {}: {} (requires: {})",
                i + 1,
                step.fqn(),
                if step.requires().is_empty() {
                    "nothing".to_string()
                } else {
                    step.requires().iter().cloned().collect::<Vec<_>>().join(", ")
                }
            );
            step.set_status(Status::Complete("outlined".to_string()));
        }
        if let Some(message) = message {
            emit!("{}", message);
        }
    }

    /// Drive every step to a terminal status with the given walker.
    pub async fn execute(&mut self, walker: &Walker, cancel: &CancellationToken) -> Result<()> {
        walker.walk(self, cancel).await
    }

    /// Steps that ended in a terminal failure.
    pub fn failed_steps(&self) -> Vec<&Step> {
        self.steps.iter().filter(|s| s.status().is_failed()).collect()
    }

    pub(crate) fn action(&self) -> Arc<dyn StepAction> {
        Arc::clone(&self.action)
    }

    pub(crate) fn step_index(&self, fqn: &str) -> Option<usize> {
        self.index.get(fqn).copied()
    }

    pub(crate) fn step_mut(&mut self, idx: usize) -> &mut Step {
        &mut self.steps[idx]
    }
}
