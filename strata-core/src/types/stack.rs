//! Stack domain types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A stack definition as written in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDefinition {
    /// Stack name (unqualified).
    pub name: String,

    /// Names of stacks this one requires (unqualified).
    #[serde(default)]
    pub requires: Vec<String>,

    /// Logical resource IDs that must survive a destroy.
    #[serde(default)]
    pub retain_resources: Vec<String>,
}

/// A named unit of infrastructure with declared dependencies.
///
/// Immutable once loaded for a run, apart from `outputs` which is populated
/// after a successful create. Identity is the fully-qualified name.
#[derive(Debug, Clone)]
pub struct Stack {
    /// Fully-qualified name, e.g. `"prod-vpc"`.
    pub fqn: String,

    /// Unqualified name from the configuration.
    pub name: String,

    /// Fully-qualified names of stacks this one requires.
    pub requires: BTreeSet<String>,

    /// Logical resource IDs to retain during the two-phase destroy.
    pub retain_resources: Vec<String>,

    /// Output values recorded after a successful create. `None` means the
    /// stack has never been created (or outputs were never resolved).
    pub outputs: Option<HashMap<String, String>>,
}

impl Stack {
    /// Build a stack from its definition, qualifying names with `namespace`.
    pub fn from_definition(namespace: &str, def: &StackDefinition) -> Self {
        Self {
            fqn: fqn(namespace, &def.name),
            name: def.name.clone(),
            requires: def.requires.iter().map(|r| fqn(namespace, r)).collect(),
            retain_resources: def.retain_resources.clone(),
            outputs: None,
        }
    }
}

/// Qualify a stack name with the run namespace.
pub fn fqn(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}-{}", namespace, name)
    }
}
