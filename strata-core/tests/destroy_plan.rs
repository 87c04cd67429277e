//! Integration tests for the destroy lifecycle.
//!
//! These tests drive the full path: load a YAML configuration, build the
//! reversed plan, walk it against a scripted in-memory provider, and check
//! the per-stack final statuses and the order of provider calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use strata_core::provider::memory::{DestroyBehavior, RemoteStatus};
use strata_core::{
    lookups, Config, Context, DestroyAction, HookConfig, HookRegistry, MemoryProvider, Provider,
    Status,
};

const CONFIG: &str = r#"
namespace: prod
stacks:
  - name: vpc
  - name: db
    requires: [vpc]
  - name: app
    requires: [vpc, db]
  - name: edge
    requires: [app]
    retain_resources: [EdgeFunction]
"#;

fn setup(targets: Vec<String>) -> (Context, Arc<MemoryProvider>) {
    let config = Config::parse(CONFIG).unwrap();
    let provider = Arc::new(MemoryProvider::new());
    for name in ["prod-vpc", "prod-db", "prod-app", "prod-edge"] {
        provider.seed(name, RemoteStatus::CreateComplete);
    }
    (Context::from_config(&config, targets), provider)
}

#[tokio::test]
async fn test_full_destroy_respects_reverse_dependency_order() {
    let (context, provider) = setup(vec![]);
    let mut action = DestroyAction::new(context, provider.clone())
        .with_poll_interval(Duration::from_millis(1));

    let summary = action.run(true, 0, false).await.unwrap();
    assert!(summary.is_success());

    let order: Vec<String> = provider
        .destroy_calls()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    let position = |name: &str| order.iter().position(|n| n == name).unwrap();

    // Each stack is destroyed before everything it required to build.
    assert!(position("prod-edge") < position("prod-app"));
    assert!(position("prod-app") < position("prod-db"));
    assert!(position("prod-app") < position("prod-vpc"));
    assert!(position("prod-db") < position("prod-vpc"));
}

#[tokio::test]
async fn test_failed_destroy_skips_everything_it_blocked() {
    let (context, provider) = setup(vec![]);
    // edge fails but carries a retain set, so it still converges; app fails
    // terminally and blocks db and vpc behind it.
    provider.script_destroy("prod-edge", DestroyBehavior::Fail);
    provider.script_destroy("prod-app", DestroyBehavior::Fail);

    let mut action = DestroyAction::new(context, provider.clone())
        .with_poll_interval(Duration::from_millis(1));

    let summary = action.run(true, 0, false).await.unwrap();
    assert!(!summary.is_success());
    assert_eq!(summary.failed(), 1);

    let by_fqn: HashMap<String, Status> = summary.results.into_iter().collect();
    assert!(matches!(by_fqn["prod-edge"], Status::Complete(_)));
    assert!(matches!(by_fqn["prod-app"], Status::Failed(_)));
    assert!(matches!(by_fqn["prod-db"], Status::Skipped(_)));
    assert!(matches!(by_fqn["prod-vpc"], Status::Skipped(_)));

    // Neither skipped stack was touched on the provider side.
    let destroyed: Vec<String> = provider
        .destroy_calls()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(!destroyed.contains(&"prod-db".to_string()));
    assert!(!destroyed.contains(&"prod-vpc".to_string()));
}

#[tokio::test]
async fn test_in_progress_deletes_poll_until_absent() {
    let (context, provider) = setup(vec![]);
    provider.script_destroy("prod-db", DestroyBehavior::InProgress { polls: 3 });

    let mut action = DestroyAction::new(context, provider.clone())
        .with_poll_interval(Duration::from_millis(1));

    let summary = action.run(true, 0, false).await.unwrap();
    assert!(summary.is_success());
    assert!(provider.get_stack("prod-db").await.unwrap().is_none());
}

#[tokio::test]
async fn test_target_restricts_destroy_to_dependents() {
    // Destroying only app must also take down what the reversed graph puts
    // in front of it (edge), and must leave vpc and db alone.
    let (context, provider) = setup(vec!["app".to_string()]);
    let mut action = DestroyAction::new(context, provider.clone())
        .with_poll_interval(Duration::from_millis(1));

    let summary = action.run(true, 0, false).await.unwrap();
    assert!(summary.is_success());

    let destroyed: Vec<String> = provider
        .destroy_calls()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(destroyed.contains(&"prod-edge".to_string()));
    assert!(destroyed.contains(&"prod-app".to_string()));
    assert!(!destroyed.contains(&"prod-db".to_string()));
    assert!(!destroyed.contains(&"prod-vpc".to_string()));
}

#[tokio::test]
async fn test_unforced_run_is_outline_only() {
    let (context, provider) = setup(vec![]);
    let mut action = DestroyAction::new(context, provider.clone());

    let summary = action.run(false, 0, false).await.unwrap();
    assert!(summary.outline_only);
    assert_eq!(summary.results.len(), 4);
    assert_eq!(provider.get_call_count(), 0);
    assert!(provider.destroy_calls().is_empty());
}

#[tokio::test]
async fn test_pre_destroy_hook_data_feeds_lookup() {
    let config = Config::parse(
        r#"
namespace: prod
stacks:
  - name: vpc
pre_destroy:
  - name: snapshot
"#,
    )
    .unwrap();
    let provider = Arc::new(MemoryProvider::new());
    provider.seed("prod-vpc", RemoteStatus::CreateComplete);

    let mut registry = HookRegistry::new();
    registry.register("snapshot", |_: &HookConfig, _, _| {
        let mut data = HashMap::new();
        data.insert("snapshot_id".to_string(), serde_json::json!("snap-42"));
        Ok(Some(data))
    });

    let mut action = DestroyAction::new(Context::from_config(&config, vec![]), provider)
        .with_poll_interval(Duration::from_millis(1))
        .with_hook_registry(registry);

    let summary = action.run(true, 0, false).await.unwrap();
    assert!(summary.is_success());

    let value = lookups::hook_data::handler("snapshot::snapshot_id", action.context()).unwrap();
    assert_eq!(value, serde_json::json!("snap-42"));
}

#[tokio::test]
async fn test_required_hook_failure_aborts_before_any_destroy() {
    let config = Config::parse(
        r#"
namespace: prod
stacks:
  - name: vpc
pre_destroy:
  - name: guard
"#,
    )
    .unwrap();
    let provider = Arc::new(MemoryProvider::new());
    provider.seed("prod-vpc", RemoteStatus::CreateComplete);

    let mut registry = HookRegistry::new();
    registry.register("guard", |_: &HookConfig, _, _| {
        Err(strata_core::StrataError::Internal("deletion window closed".to_string()))
    });

    let mut action = DestroyAction::new(Context::from_config(&config, vec![]), provider.clone())
        .with_hook_registry(registry);

    assert!(action.run(true, 0, false).await.is_err());
    assert!(provider.destroy_calls().is_empty());
}

#[tokio::test]
async fn test_rerun_after_destroy_converges_to_does_not_exist() {
    let (context, provider) = setup(vec![]);
    let mut action = DestroyAction::new(context, provider.clone())
        .with_poll_interval(Duration::from_millis(1));

    assert!(action.run(true, 0, false).await.unwrap().is_success());
    let destroys = provider.destroy_calls().len();

    // Second run confirms absence with queries only.
    let summary = action.run(true, 0, false).await.unwrap();
    assert!(summary.is_success());
    assert!(summary
        .results
        .iter()
        .all(|(_, s)| matches!(s, Status::DoesNotExist(_))));
    assert_eq!(provider.destroy_calls().len(), destroys);
}
