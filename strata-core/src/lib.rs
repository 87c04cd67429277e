//! strata core library.
//!
//! Dependency-ordered lifecycle orchestration for cloud infrastructure
//! stacks: graph/plan construction, the concurrency-bounded walker, the
//! idempotent destroy reconciliation, and the provider contract they drive.

pub mod actions;
pub mod config;
pub mod context;
pub mod error;
pub mod hooks;
pub mod lookups;
pub mod plan;
pub mod provider;
pub mod status;
pub mod types;

// Re-export commonly used items
pub use actions::{DestroyAction, RunSummary, STACK_POLL_INTERVAL};
pub use config::{Config, YamlCodec};
pub use context::Context;
pub use error::{Result, StrataError};
pub use hooks::{HookConfig, HookData, HookRegistry};
pub use plan::{Graph, Plan, Step, StepAction, Walker};
pub use provider::{MemoryProvider, Provider, ProviderStack};
pub use status::Status;
pub use types::{Stack, StackDefinition};
