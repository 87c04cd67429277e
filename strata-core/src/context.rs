//! Run context: the loaded stack collection plus per-run state.

use crate::config::Config;
use crate::error::{Result, StrataError};
use crate::hooks::HookData;
use crate::types::stack::{fqn, Stack};
use std::collections::HashMap;
use std::sync::Arc;

/// Owns everything a single run operates on: the namespace, the immutable
/// stack collection keyed by FQN, the requested targets, and hook data
/// recorded by the hook subsystem.
#[derive(Debug, Clone, Default)]
pub struct Context {
    config: Config,
    namespace: String,
    /// Stacks in configuration order.
    stacks: Vec<Arc<Stack>>,
    /// FQN -> index into `stacks`.
    by_fqn: HashMap<String, usize>,
    /// Unqualified names of the requested target stacks (empty = all).
    targets: Vec<String>,
    /// Hook name -> (key -> value), written between plan runs.
    hook_data: HookData,
}

impl Context {
    /// Build a context from configuration and an optional target list.
    pub fn from_config(config: &Config, targets: Vec<String>) -> Self {
        let stacks: Vec<Arc<Stack>> = config
            .stacks
            .iter()
            .map(|def| Arc::new(Stack::from_definition(&config.namespace, def)))
            .collect();
        let by_fqn = stacks
            .iter()
            .enumerate()
            .map(|(i, s)| (s.fqn.clone(), i))
            .collect();
        Self {
            config: config.clone(),
            namespace: config.namespace.clone(),
            stacks,
            by_fqn,
            targets,
            hook_data: HookData::new(),
        }
    }

    /// The configuration this context was built from.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Qualify a stack name with this run's namespace.
    pub fn fqn(&self, name: &str) -> String {
        fqn(&self.namespace, name)
    }

    /// The run namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All stacks in configuration order.
    pub fn stacks(&self) -> &[Arc<Stack>] {
        &self.stacks
    }

    /// Look up a stack by unqualified name or FQN.
    pub fn get_stack(&self, name: &str) -> Result<&Arc<Stack>> {
        let idx = self
            .by_fqn
            .get(name)
            .or_else(|| self.by_fqn.get(&self.fqn(name)))
            .ok_or_else(|| StrataError::StackNotFound { name: name.to_string() })?;
        Ok(&self.stacks[*idx])
    }

    /// FQNs of the requested target stacks (empty = all).
    pub fn target_fqns(&self) -> Vec<String> {
        self.targets.iter().map(|t| self.fqn(t)).collect()
    }

    /// Hook data recorded so far.
    pub fn hook_data(&self) -> &HookData {
        &self.hook_data
    }

    /// Mutable access for the hook subsystem. Only written between plan
    /// runs, never concurrently with walker execution.
    pub fn hook_data_mut(&mut self) -> &mut HookData {
        &mut self.hook_data
    }

    /// Replace a stack's recorded outputs (used after a successful create,
    /// and by tests).
    pub fn set_outputs(&mut self, name: &str, outputs: HashMap<String, String>) -> Result<()> {
        let idx = *self
            .by_fqn
            .get(name)
            .or_else(|| self.by_fqn.get(&self.fqn(name)))
            .ok_or_else(|| StrataError::StackNotFound { name: name.to_string() })?;
        let stack = Arc::make_mut(&mut self.stacks[idx]);
        stack.outputs = Some(outputs);
        Ok(())
    }
}
