//! Lifecycle hook call sites.
//!
//! Hooks are external actions invoked before and after a plan run. The
//! engine does not define what a hook does; it resolves configured hook
//! names against a registry supplied by the embedding application, runs them
//! in declaration order, and records any returned data for the hook-data
//! lookup.

use crate::context::Context;
use crate::error::{Result, StrataError};
use crate::provider::Provider;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Hook name -> (result key -> value), written between plan runs.
pub type HookData = HashMap<String, HashMap<String, serde_json::Value>>;

/// Values a hook returns for recording under its data key.
pub type HookResult = Option<HashMap<String, serde_json::Value>>;

/// A configured hook invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Registered hook name.
    pub name: String,

    /// Whether a missing or failing hook aborts the run.
    #[serde(default = "default_true")]
    pub required: bool,

    /// Disabled hooks are skipped without error.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Key under which results are recorded in hook data. Defaults to the
    /// hook name.
    #[serde(default)]
    pub data_key: Option<String>,

    /// Free-form arguments passed through to the hook.
    #[serde(default)]
    pub args: HashMap<String, serde_yaml::Value>,
}

fn default_true() -> bool {
    true
}

/// Hook implementation: receives its configuration, the provider, and a read
/// view of the context; may return data to record.
pub type HookFn =
    dyn Fn(&HookConfig, &Arc<dyn Provider>, &Context) -> Result<HookResult> + Send + Sync;

/// Maps hook names to implementations.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Box<HookFn>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook implementation under `name`.
    pub fn register<F>(&mut self, name: &str, hook: F)
    where
        F: Fn(&HookConfig, &Arc<dyn Provider>, &Context) -> Result<HookResult>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.insert(name.to_string(), Box::new(hook));
    }

    fn get(&self, name: &str) -> Option<&HookFn> {
        self.hooks.get(name).map(|b| b.as_ref())
    }
}

/// Run the configured hooks for one stage in declaration order.
///
/// A disabled hook is skipped. A missing or failing hook aborts the run only
/// when marked required; otherwise it is logged and skipped. Returned data
/// is recorded into the context's hook data under the hook's data key.
pub fn run_hooks(
    stage: &str,
    hooks: &[HookConfig],
    registry: &HookRegistry,
    provider: &Arc<dyn Provider>,
    context: &mut Context,
) -> Result<()> {
    if hooks.is_empty() {
        return Ok(());
    }
    info!(stage, count = hooks.len(), "running hooks");

    for hook in hooks {
        if !hook.enabled {
            info!(stage, hook = %hook.name, "hook disabled, skipping");
            continue;
        }

        let Some(hook_fn) = registry.get(&hook.name) else {
            if hook.required {
                return Err(StrataError::HookNotRegistered { hook: hook.name.clone() });
            }
            warn!(stage, hook = %hook.name, "hook not registered, skipping");
            continue;
        };

        match hook_fn(hook, provider, context) {
            Ok(Some(data)) => {
                let key = hook.data_key.clone().unwrap_or_else(|| hook.name.clone());
                context.hook_data_mut().insert(key, data);
            }
            Ok(None) => {}
            Err(e) => {
                if hook.required {
                    return Err(StrataError::HookFailed {
                        hook: hook.name.clone(),
                        reason: e.to_string(),
                    });
                }
                warn!(stage, hook = %hook.name, error = %e, "optional hook failed, continuing");
            }
        }
    }

    Ok(())
}
