//! Concurrency-bounded plan scheduler.
//!
//! The walker repeatedly selects steps whose dependencies are all terminal
//! with a success-compatible status and drives each to a terminal status by
//! polling its action function. Failure propagates downstream as a skip
//! rather than aborting the plan; cancellation stops issuing new remote
//! operations but lets in-flight calls finish and records their results.

use crate::error::{Result, StrataError};
use crate::plan::Plan;
use crate::status::Status;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Drives every step of a plan to a terminal status while respecting
/// dependency order and a concurrency ceiling.
pub struct Walker {
    concurrency: usize,
}

impl Walker {
    /// `concurrency` of 0 means unbounded.
    pub fn new(concurrency: usize) -> Self {
        Self { concurrency }
    }

    fn limit(&self) -> usize {
        if self.concurrency == 0 {
            usize::MAX
        } else {
            self.concurrency
        }
    }

    /// Walk the plan until every step is terminal.
    ///
    /// Steps whose dependencies can never reach a success-compatible status
    /// are resolved without invoking their action: a failed dependency (or a
    /// skip caused by one, transitively) produces `Skipped`, an interrupted
    /// dependency produces `Interrupted`.
    pub async fn walk(&self, plan: &mut Plan, cancel: &CancellationToken) -> Result<()> {
        let action = plan.action();
        let mut in_flight: JoinSet<(usize, Result<Status>)> = JoinSet::new();
        let mut running: HashSet<usize> = HashSet::new();
        // Failed steps plus every skip they caused; a skip in this set still
        // poisons its own dependents, unlike an ordinary (success) skip.
        let mut poisoned: HashSet<usize> = HashSet::new();

        loop {
            self.resolve_blocked(plan, &running, &mut poisoned);

            for i in 0..plan.steps().len() {
                if in_flight.len() >= self.limit() {
                    break;
                }
                if plan.steps()[i].status().is_terminal() || running.contains(&i) {
                    continue;
                }
                let deps_ready = plan.steps()[i]
                    .requires()
                    .iter()
                    .filter_map(|fqn| plan.step_index(fqn))
                    .all(|d| plan.steps()[d].status().is_success());
                if !deps_ready {
                    continue;
                }

                let stack = Arc::clone(plan.steps()[i].stack());
                let status = plan.steps()[i].status().clone();
                let action = Arc::clone(&action);
                let token = cancel.clone();
                running.insert(i);
                debug!(stack = %stack.fqn, status = %status, "dispatching step");
                in_flight.spawn(async move {
                    let result = action.execute(&stack, &status, &token).await;
                    (i, result)
                });
            }

            if in_flight.is_empty() {
                let remaining =
                    plan.steps().iter().filter(|s| !s.status().is_terminal()).count();
                if remaining == 0 {
                    break;
                }
                // Unreachable for acyclic plans: blocked steps were resolved above.
                return Err(StrataError::Internal(format!(
                    "walker stalled with {} unresolved steps",
                    remaining
                )));
            }

            match in_flight.join_next().await {
                Some(Ok((i, result))) => {
                    running.remove(&i);
                    let status = match result {
                        Ok(status) => status,
                        Err(e) => {
                            warn!(stack = %plan.steps()[i].fqn(), error = %e, "step action failed");
                            Status::Failed(e.to_string())
                        }
                    };
                    if status.is_failed() {
                        poisoned.insert(i);
                    }
                    debug!(stack = %plan.steps()[i].fqn(), status = %status, "step status");
                    plan.step_mut(i).set_status(status);
                }
                Some(Err(join_err)) => {
                    return Err(StrataError::Internal(format!(
                        "step task panicked: {}",
                        join_err
                    )));
                }
                None => unreachable!("join_next on non-empty JoinSet"),
            }
        }

        Ok(())
    }

    /// Resolve, to fixpoint, steps whose dependencies are all terminal but
    /// can never be success-compatible. Their action is never invoked.
    fn resolve_blocked(
        &self,
        plan: &mut Plan,
        running: &HashSet<usize>,
        poisoned: &mut HashSet<usize>,
    ) {
        loop {
            let mut changed = false;
            for i in 0..plan.steps().len() {
                if plan.steps()[i].status().is_terminal() || running.contains(&i) {
                    continue;
                }
                let deps: Vec<usize> = plan.steps()[i]
                    .requires()
                    .iter()
                    .filter_map(|fqn| plan.step_index(fqn))
                    .collect();
                if !deps.iter().all(|&d| plan.steps()[d].status().is_terminal()) {
                    continue;
                }

                let failed_dep = deps
                    .iter()
                    .find(|&&d| plan.steps()[d].status().is_failed() || poisoned.contains(&d))
                    .copied();
                let interrupted_dep = deps
                    .iter()
                    .find(|&&d| plan.steps()[d].status().is_interrupted())
                    .copied();

                if let Some(d) = failed_dep {
                    let dep_fqn = plan.steps()[d].fqn().to_string();
                    warn!(stack = %plan.steps()[i].fqn(), dependency = %dep_fqn, "skipping: dependency failed");
                    plan.step_mut(i)
                        .set_status(Status::Skipped(format!("dependency '{}' failed", dep_fqn)));
                    poisoned.insert(i);
                    changed = true;
                } else if let Some(d) = interrupted_dep {
                    let dep_fqn = plan.steps()[d].fqn().to_string();
                    plan.step_mut(i).set_status(Status::Interrupted(format!(
                        "dependency '{}' was interrupted",
                        dep_fqn
                    )));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }
}
