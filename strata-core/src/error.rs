//! Error types for strata.
//!
//! All errors use `thiserror` for ergonomic error handling and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for strata operations.
pub type Result<T> = std::result::Result<T, StrataError>;

/// Main error type for strata.
#[derive(Error, Debug)]
pub enum StrataError {
    // Graph construction errors
    #[error("stack '{stack}' requires '{dependency}' which is not defined")]
    MissingDependency { stack: String, dependency: String },

    #[error("circular dependency detected involving: {stacks:?}")]
    CircularDependency { stacks: Vec<String> },

    #[error("unknown stack: {name}")]
    StackNotFound { name: String },

    // Lookup errors
    #[error("{kind} lookup requires <left>::<right> syntax, got: {value}")]
    MalformedLookup { kind: &'static str, value: String },

    #[error("no outputs recorded for stack '{stack}'")]
    NoOutputs { stack: String },

    #[error("output '{name}' not present in outputs of stack '{stack}'")]
    OutputMissing { stack: String, name: String },

    #[error("hook '{hook}' has no recorded data")]
    HookDataMissing { hook: String },

    #[error("key '{key}' not present in data for hook '{hook}'")]
    HookKeyMissing { hook: String, key: String },

    // Hook errors
    #[error("hook '{hook}' is not registered")]
    HookNotRegistered { hook: String },

    #[error("required hook '{hook}' failed: {reason}")]
    HookFailed { hook: String, reason: String },

    // Provider errors
    #[error("provider call failed for stack '{fqn}': {reason}")]
    ProviderError { fqn: String, reason: String },

    #[error("unknown provider: {name}")]
    UnknownProvider { name: String },

    // Configuration errors
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to read {path:?}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {source}")]
    YamlError {
        #[from]
        source: serde_yaml::Error,
    },

    // Plan execution
    #[error("{failed} of {total} steps failed")]
    PlanFailed { failed: usize, total: usize },

    #[error("internal error: {0}")]
    Internal(String),
}
