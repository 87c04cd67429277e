//! Remote stack provider abstraction.
//!
//! The engine only consumes this narrow contract: existence/status queries
//! and destroy invocation. Absence is an expected signal, not an error, so
//! `get_stack` returns `Option` rather than failing when the remote object
//! is gone.

use crate::error::{Result, StrataError};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;

pub use memory::MemoryProvider;

/// Handle to a stack as reported by the remote provider.
///
/// The status string is diagnostic; the engine branches only on the
/// provider's predicates, which must be consistent with a single remote
/// state per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStack {
    /// Remote-side stack name.
    pub name: String,
    /// Raw remote status, e.g. `"DELETE_IN_PROGRESS"`.
    pub status: String,
}

/// Remote provider contract.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Query the remote representation of a stack.
    ///
    /// `Ok(None)` means the stack does not exist remotely; this is never an
    /// error.
    async fn get_stack(&self, fqn: &str) -> Result<Option<ProviderStack>>;

    /// Remote-side name of a stack (diagnostic only).
    fn get_stack_name(&self, stack: &ProviderStack) -> String {
        stack.name.clone()
    }

    /// Raw remote status of a stack (diagnostic only).
    fn get_stack_status(&self, stack: &ProviderStack) -> String {
        stack.status.clone()
    }

    /// Whether the stack is in a failed state.
    fn is_stack_failed(&self, stack: &ProviderStack) -> bool;

    /// Whether the stack is fully destroyed.
    fn is_stack_destroyed(&self, stack: &ProviderStack) -> bool;

    /// Whether a remote operation is still converging.
    fn is_stack_in_progress(&self, stack: &ProviderStack) -> bool;

    /// Issue a destroy request. `retain_resources` names logical resources
    /// the provider must leave behind; it is only honored for stacks already
    /// in a failed state.
    async fn destroy_stack(
        &self,
        stack: &ProviderStack,
        retain_resources: &[String],
    ) -> Result<()>;

    /// Provider name (for logging).
    fn name(&self) -> &str;
}

/// Create a provider by factory name.
///
/// This slice ships the `memory` provider only; cloud clients plug in here.
pub fn factory(name: &str) -> Result<Arc<dyn Provider>> {
    match name {
        "memory" => Ok(Arc::new(MemoryProvider::new())),
        other => Err(StrataError::UnknownProvider { name: other.to_string() }),
    }
}
