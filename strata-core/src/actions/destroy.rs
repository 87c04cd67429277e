//! Destroying stacks in reverse dependency order.
//!
//! Generates a destruction plan from the stack collection. Dependencies are
//! reversed from the build direction: if stack B requires stack A to build,
//! A must wait for B to be destroyed first.
//!
//! The plan defaults to printing an outline of what would be destroyed; when
//! forced, each stack is driven through the destroy reconciliation until the
//! plan reaches a final state.

use crate::actions::{RunSummary, STACK_POLL_INTERVAL};
use crate::context::Context;
use crate::error::Result;
use crate::hooks::{run_hooks, HookRegistry};
use crate::plan::{Plan, StepAction, Walker};
use crate::provider::Provider;
use crate::status::Status;
use crate::types::Stack;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Destroy reconciliation: the action function bound to every step of a
/// destroy plan.
///
/// Stateless between invocations; the step's current status is the only
/// carried state, which keeps the algorithm safely re-runnable after
/// interruption.
struct DestroyStackAction {
    provider: Arc<dyn Provider>,
    poll_interval: Duration,
    tail: bool,
}

#[async_trait]
impl StepAction for DestroyStackAction {
    async fn execute(
        &self,
        stack: &Stack,
        current: &Status,
        cancel: &CancellationToken,
    ) -> Result<Status> {
        // Pace repeated polls of an in-flight delete. Cancellation during
        // the wait produces Interrupted without any provider call.
        if matches!(current, Status::Submitted(_)) {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Ok(Status::Interrupted("cancelled".to_string()));
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        } else if cancel.is_cancelled() {
            return Ok(Status::Interrupted("cancelled".to_string()));
        }

        let Some(remote) = self.provider.get_stack(&stack.fqn).await? else {
            debug!(stack = %stack.fqn, "stack does not exist");
            // Once destroyed, the stack is absent. If this step was
            // Submitted we know this run just deleted it; otherwise it was
            // already gone before we touched it.
            return Ok(if matches!(current, Status::Submitted(_)) {
                Status::Complete("stack destroyed".to_string())
            } else {
                Status::does_not_exist()
            });
        };

        let remote_status = self.provider.get_stack_status(&remote);
        if self.tail {
            info!(stack = %self.provider.get_stack_name(&remote), status = %remote_status, "provider status");
        } else {
            debug!(stack = %self.provider.get_stack_name(&remote), status = %remote_status, "provider status");
        }

        // Some resource kinds can only be force-detached from a stack that
        // is already in a failed state, so destroy must be issued twice:
        // once plainly (expected to fail for such stacks), then again with
        // the retain set. The checks are laid out to keep this function
        // idempotent across destroy runs.
        if !self.provider.is_stack_failed(&remote) {
            debug!(stack = %stack.fqn, "destroying stack");
            self.provider.destroy_stack(&remote, &[]).await?;
        }

        // Re-query so a synchronous failure from the destroy call above is
        // visible before deciding on the retain-resources retry.
        let Some(remote) = self.provider.get_stack(&stack.fqn).await? else {
            return Ok(Status::Complete("stack destroyed".to_string()));
        };

        if self.provider.is_stack_failed(&remote) && !stack.retain_resources.is_empty() {
            debug!(
                stack = %stack.fqn,
                retain = ?stack.retain_resources,
                "destroying failed stack with retained resources"
            );
            self.provider
                .destroy_stack(&remote, &stack.retain_resources)
                .await?;
            return Ok(Status::Complete("stack destroyed".to_string()));
        }

        if self.provider.is_stack_destroyed(&remote) {
            return Ok(Status::Complete("stack destroyed".to_string()));
        }
        if self.provider.is_stack_in_progress(&remote) {
            return Ok(Status::Submitted("submitted for destruction".to_string()));
        }
        if self.provider.is_stack_failed(&remote) {
            return Ok(Status::Failed("stack destroy failed".to_string()));
        }

        Ok(Status::Submitted("submitted for destruction".to_string()))
    }
}

/// Responsible for destroying stacks.
pub struct DestroyAction {
    context: Context,
    provider: Arc<dyn Provider>,
    cancel: CancellationToken,
    registry: HookRegistry,
    poll_interval: Duration,
}

impl DestroyAction {
    pub fn new(context: Context, provider: Arc<dyn Provider>) -> Self {
        Self {
            context,
            provider,
            cancel: CancellationToken::new(),
            registry: HookRegistry::new(),
            poll_interval: STACK_POLL_INTERVAL,
        }
    }

    /// Override the poll interval (tests use a short one).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Supply the hook registry consulted by pre/post hooks.
    pub fn with_hook_registry(mut self, registry: HookRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Token observed between polls; cancel it to interrupt the run. Already
    /// issued remote operations are allowed to finish.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The context this action operates on.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Build the destruction plan: reversed graph, restricted to the
    /// context's targets.
    pub fn generate_plan(&self, tail: bool) -> Result<Plan> {
        let action = Arc::new(DestroyStackAction {
            provider: Arc::clone(&self.provider),
            poll_interval: self.poll_interval,
            tail,
        });
        Plan::build(
            "destroy stacks",
            action,
            self.context.stacks(),
            &self.context.target_fqns(),
            true,
        )
    }

    /// Run the action.
    ///
    /// Without `force`, prints the plan outline and never contacts the
    /// provider. With `force`, runs pre-destroy hooks, executes the plan
    /// with the given concurrency ceiling (0 = unbounded), then runs
    /// post-destroy hooks.
    #[instrument(skip(self), fields(namespace = %self.context.namespace()))]
    pub async fn run(&mut self, force: bool, concurrency: usize, tail: bool) -> Result<RunSummary> {
        if !force {
            let mut plan = self.generate_plan(tail)?;
            plan.outline(Some("to execute this plan, run again with --force"));
            return Ok(RunSummary::from_plan(&plan, true));
        }

        self.pre_run()?;

        let mut outline = self.generate_plan(tail)?;
        outline.outline_debug();

        // The outline marks steps complete for display, so execution uses a
        // freshly generated plan.
        let mut plan = self.generate_plan(tail)?;
        let walker = Walker::new(concurrency);
        let cancel = self.cancel.clone();
        plan.execute(&walker, &cancel).await?;

        for step in plan.steps() {
            info!(stack = %step.fqn(), status = %step.status(), "final status");
        }

        self.post_run()?;
        Ok(RunSummary::from_plan(&plan, false))
    }

    /// Steps taken prior to running the action. Runs before any destroy
    /// step is dispatched.
    fn pre_run(&mut self) -> Result<()> {
        let hooks = self.context.config().pre_destroy.clone();
        run_hooks("pre_destroy", &hooks, &self.registry, &self.provider, &mut self.context)
    }

    /// Steps taken after the plan reaches a final state.
    fn post_run(&mut self) -> Result<()> {
        let hooks = self.context.config().post_destroy.clone();
        run_hooks("post_destroy", &hooks, &self.registry, &self.provider, &mut self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::provider::memory::{DestroyBehavior, MemoryProvider, RemoteStatus};
    use crate::types::StackDefinition;

    fn action(stack: &Stack, provider: Arc<MemoryProvider>) -> (DestroyStackAction, Stack) {
        (
            DestroyStackAction {
                provider,
                poll_interval: Duration::from_millis(1),
                tail: false,
            },
            stack.clone(),
        )
    }

    fn stack(name: &str, retain: &[&str]) -> Stack {
        let def = StackDefinition {
            name: name.to_string(),
            requires: vec![],
            retain_resources: retain.iter().map(|r| r.to_string()).collect(),
        };
        Stack::from_definition("prod", &def)
    }

    #[tokio::test]
    async fn test_never_existed_yields_does_not_exist_without_destroy() {
        let provider = Arc::new(MemoryProvider::new());
        let (action, stack) = action(&stack("ghost", &[]), provider.clone());

        let status = action
            .execute(&stack, &Status::Pending, &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(status, Status::DoesNotExist(_)));
        assert!(provider.destroy_calls().is_empty());
    }

    #[tokio::test]
    async fn test_absent_after_submitted_yields_complete() {
        let provider = Arc::new(MemoryProvider::new());
        let (action, stack) = action(&stack("db", &[]), provider.clone());

        let status = action
            .execute(
                &stack,
                &Status::Submitted("submitted for destruction".to_string()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(matches!(status, Status::Complete(_)));
        assert!(provider.destroy_calls().is_empty());
    }

    #[tokio::test]
    async fn test_existing_stack_is_destroyed() {
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-db", RemoteStatus::CreateComplete);
        let (action, stack) = action(&stack("db", &[]), provider.clone());

        let status = action
            .execute(&stack, &Status::Pending, &CancellationToken::new())
            .await
            .unwrap();

        // Synchronous destroy: absent on re-query.
        assert!(matches!(status, Status::Complete(_)));
        assert_eq!(provider.destroy_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_in_progress_destroy_polls_to_completion() {
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-db", RemoteStatus::CreateComplete);
        provider.script_destroy("prod-db", DestroyBehavior::InProgress { polls: 2 });
        let (action, stack) = action(&stack("db", &[]), provider.clone());
        let cancel = CancellationToken::new();

        let mut status = action.execute(&stack, &Status::Pending, &cancel).await.unwrap();
        assert!(matches!(status, Status::Submitted(_)));

        while !status.is_terminal() {
            status = action.execute(&stack, &status, &cancel).await.unwrap();
        }
        assert_eq!(status, Status::Complete("stack destroyed".to_string()));
    }

    #[tokio::test]
    async fn test_retain_resources_two_phase_destroy() {
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-edge", RemoteStatus::CreateComplete);
        provider.script_destroy("prod-edge", DestroyBehavior::Fail);
        let (action, stack) = action(&stack("edge", &["EdgeFunction"]), provider.clone());

        let status = action
            .execute(&stack, &Status::Pending, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, Status::Complete("stack destroyed".to_string()));
        let calls = provider.destroy_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].1.is_empty());
        assert_eq!(calls[1].1, vec!["EdgeFunction".to_string()]);
    }

    #[tokio::test]
    async fn test_destroy_failure_without_retain_is_terminal_failed() {
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-db", RemoteStatus::CreateComplete);
        provider.script_destroy("prod-db", DestroyBehavior::Fail);
        let (action, stack) = action(&stack("db", &[]), provider.clone());

        let status = action
            .execute(&stack, &Status::Pending, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(status, Status::Failed("stack destroy failed".to_string()));
    }

    #[tokio::test]
    async fn test_cancellation_during_poll_makes_no_provider_calls() {
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-db", RemoteStatus::DeleteInProgress);
        let (action, stack) = action(&stack("db", &[]), provider.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let status = action
            .execute(
                &stack,
                &Status::Submitted("submitted for destruction".to_string()),
                &cancel,
            )
            .await
            .unwrap();

        assert!(matches!(status, Status::Interrupted(_)));
        assert_eq!(provider.get_call_count(), 0);
        assert!(provider.destroy_calls().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_after_full_destroy_is_a_provider_noop() {
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-db", RemoteStatus::CreateComplete);
        let (action, stack) = action(&stack("db", &[]), provider.clone());
        let cancel = CancellationToken::new();

        let status = action.execute(&stack, &Status::Pending, &cancel).await.unwrap();
        assert!(matches!(status, Status::Complete(_)));
        let destroys_after_first_run = provider.destroy_calls().len();

        // A later run starts over from Pending: absence is confirmed with a
        // single query and no destroy is ever re-issued.
        let status = action.execute(&stack, &Status::Pending, &cancel).await.unwrap();
        assert!(matches!(status, Status::DoesNotExist(_)));
        assert_eq!(provider.destroy_calls().len(), destroys_after_first_run);
    }

    #[tokio::test]
    async fn test_unforced_run_outlines_without_provider_contact() {
        let config = Config::parse(
            r#"
namespace: prod
stacks:
  - name: vpc
  - name: app
    requires: [vpc]
"#,
        )
        .unwrap();
        let provider = Arc::new(MemoryProvider::new());
        let context = Context::from_config(&config, vec![]);
        let mut action = DestroyAction::new(context, provider.clone());

        let summary = action.run(false, 0, false).await.unwrap();
        assert!(summary.outline_only);
        assert_eq!(provider.get_call_count(), 0);
        assert!(provider.destroy_calls().is_empty());
    }

    #[tokio::test]
    async fn test_forced_run_destroys_in_reverse_order() {
        let config = Config::parse(
            r#"
namespace: prod
stacks:
  - name: vpc
  - name: app
    requires: [vpc]
"#,
        )
        .unwrap();
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-vpc", RemoteStatus::CreateComplete);
        provider.seed("prod-app", RemoteStatus::CreateComplete);

        let context = Context::from_config(&config, vec![]);
        let mut action = DestroyAction::new(context, provider.clone())
            .with_poll_interval(Duration::from_millis(1));

        let summary = action.run(true, 0, false).await.unwrap();
        assert!(summary.is_success());
        assert_eq!(summary.failed(), 0);

        let destroyed: Vec<String> =
            provider.destroy_calls().into_iter().map(|(n, _)| n).collect();
        assert_eq!(destroyed, vec!["prod-app".to_string(), "prod-vpc".to_string()]);
    }

    #[tokio::test]
    async fn test_forced_run_executes_despite_preceding_outline() {
        let config = Config::parse(
            r#"
namespace: prod
stacks:
  - name: vpc
"#,
        )
        .unwrap();
        let provider = Arc::new(MemoryProvider::new());
        provider.seed("prod-vpc", RemoteStatus::CreateComplete);

        let context = Context::from_config(&config, vec![]);
        let mut action = DestroyAction::new(context, provider.clone())
            .with_poll_interval(Duration::from_millis(1));

        // The forced path outlines the plan before walking; the outline's
        // display-only Complete statuses must not suppress the real destroy.
        let summary = action.run(true, 0, false).await.unwrap();
        assert!(summary.is_success());
        assert_eq!(provider.destroy_calls().len(), 1);
        assert_eq!(
            summary.results,
            vec![("prod-vpc".to_string(), Status::Complete("stack destroyed".to_string()))]
        );
    }
}
