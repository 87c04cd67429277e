//! In-memory provider with scriptable remote behavior.
//!
//! Used by the test suite and by the `memory` factory entry. Remote stacks
//! are seeded with a status and a destroy behavior; call counters let tests
//! assert exactly which provider operations an algorithm performed.

use crate::error::Result;
use crate::provider::{Provider, ProviderStack};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Remote-side status of a seeded stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    CreateComplete,
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
}

impl RemoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteStatus::CreateComplete => "CREATE_COMPLETE",
            RemoteStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            RemoteStatus::DeleteComplete => "DELETE_COMPLETE",
            RemoteStatus::DeleteFailed => "DELETE_FAILED",
        }
    }
}

/// What a plain destroy request does to a seeded stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyBehavior {
    /// Destroy completes synchronously; the stack becomes absent.
    Succeed,
    /// Destroy is accepted; the stack reports in-progress for `polls`
    /// queries before becoming absent.
    InProgress { polls: usize },
    /// Destroy leaves the stack in a failed state (e.g. a resource that can
    /// only be detached from an already-failed stack).
    Fail,
}

#[derive(Debug, Clone)]
struct RemoteStack {
    status: RemoteStatus,
    on_destroy: DestroyBehavior,
    pending_polls: usize,
}

/// Scriptable in-memory provider.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    stacks: Mutex<HashMap<String, RemoteStack>>,
    get_calls: AtomicUsize,
    destroy_calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl MemoryProvider {
    /// Empty remote: every stack is absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a remote stack with an initial status. Destroy defaults to
    /// synchronous success.
    pub fn seed(&self, name: &str, status: RemoteStatus) {
        self.stacks.lock().unwrap().insert(
            name.to_string(),
            RemoteStack { status, on_destroy: DestroyBehavior::Succeed, pending_polls: 0 },
        );
    }

    /// Script what a plain destroy request does to a seeded stack.
    pub fn script_destroy(&self, name: &str, behavior: DestroyBehavior) {
        if let Some(stack) = self.stacks.lock().unwrap().get_mut(name) {
            stack.on_destroy = behavior;
        }
    }

    /// Total number of `get_stack` calls so far.
    pub fn get_call_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Every destroy call issued, in order, with its retain set.
    pub fn destroy_calls(&self) -> Vec<(String, Vec<String>)> {
        self.destroy_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    async fn get_stack(&self, fqn: &str) -> Result<Option<ProviderStack>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let mut stacks = self.stacks.lock().unwrap();
        let Some(stack) = stacks.get_mut(fqn) else {
            return Ok(None);
        };
        match stack.status {
            RemoteStatus::DeleteComplete => Ok(None),
            RemoteStatus::DeleteInProgress => {
                if stack.pending_polls == 0 {
                    stack.status = RemoteStatus::DeleteComplete;
                    Ok(None)
                } else {
                    stack.pending_polls -= 1;
                    Ok(Some(ProviderStack {
                        name: fqn.to_string(),
                        status: stack.status.as_str().to_string(),
                    }))
                }
            }
            status => Ok(Some(ProviderStack {
                name: fqn.to_string(),
                status: status.as_str().to_string(),
            })),
        }
    }

    fn is_stack_failed(&self, stack: &ProviderStack) -> bool {
        stack.status == RemoteStatus::DeleteFailed.as_str()
    }

    fn is_stack_destroyed(&self, stack: &ProviderStack) -> bool {
        stack.status == RemoteStatus::DeleteComplete.as_str()
    }

    fn is_stack_in_progress(&self, stack: &ProviderStack) -> bool {
        stack.status == RemoteStatus::DeleteInProgress.as_str()
    }

    async fn destroy_stack(
        &self,
        stack: &ProviderStack,
        retain_resources: &[String],
    ) -> Result<()> {
        self.destroy_calls
            .lock()
            .unwrap()
            .push((stack.name.clone(), retain_resources.to_vec()));

        let mut stacks = self.stacks.lock().unwrap();
        let Some(remote) = stacks.get_mut(&stack.name) else {
            return Ok(());
        };

        // Retaining resources only works against an already-failed stack.
        if !retain_resources.is_empty() && remote.status == RemoteStatus::DeleteFailed {
            remote.status = RemoteStatus::DeleteComplete;
            return Ok(());
        }

        // A destroy re-issued while deletion is converging is accepted and
        // ignored, like the remote API it stands in for.
        if remote.status == RemoteStatus::DeleteInProgress {
            return Ok(());
        }

        match remote.on_destroy {
            DestroyBehavior::Succeed => remote.status = RemoteStatus::DeleteComplete,
            DestroyBehavior::InProgress { polls } => {
                remote.status = RemoteStatus::DeleteInProgress;
                remote.pending_polls = polls;
            }
            DestroyBehavior::Fail => remote.status = RemoteStatus::DeleteFailed,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
