//! Configuration loading.

pub mod yaml;

pub use yaml::YamlCodec;

use crate::error::{Result, StrataError};
use crate::hooks::HookConfig;
use crate::types::StackDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

fn default_provider() -> String {
    "memory".to_string()
}

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Namespace used to qualify every stack name.
    pub namespace: String,

    /// Stack definitions in dependency-declaration order.
    pub stacks: Vec<StackDefinition>,

    /// Hooks to run before a destroy plan is dispatched.
    pub pre_destroy: Vec<HookConfig>,

    /// Hooks to run after a destroy plan reaches a final state.
    pub post_destroy: Vec<HookConfig>,

    /// Provider factory name.
    pub provider: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            stacks: Vec::new(),
            pre_destroy: Vec::new(),
            post_destroy: Vec::new(),
            provider: default_provider(),
        }
    }
}

impl Config {
    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for def in &self.stacks {
            if def.name.is_empty() {
                return Err(StrataError::InvalidConfig {
                    reason: "stack with empty name".to_string(),
                });
            }
            if !seen.insert(def.name.as_str()) {
                return Err(StrataError::InvalidConfig {
                    reason: format!("duplicate stack name: {}", def.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse(
            r#"
namespace: prod
stacks:
  - name: vpc
  - name: app
    requires: [vpc]
    retain_resources: [EdgeFunction]
"#,
        )
        .unwrap();

        assert_eq!(config.namespace, "prod");
        assert_eq!(config.stacks.len(), 2);
        assert_eq!(config.stacks[1].requires, vec!["vpc".to_string()]);
        assert_eq!(config.provider, "memory");
    }

    #[test]
    fn test_duplicate_stack_name_fails() {
        let err = Config::parse(
            r#"
namespace: prod
stacks:
  - name: vpc
  - name: vpc
"#,
        )
        .unwrap_err();
        assert!(matches!(err, StrataError::InvalidConfig { .. }));
    }

    #[test]
    fn test_hooks_parse_with_defaults() {
        let config = Config::parse(
            r#"
namespace: prod
pre_destroy:
  - name: snapshot
    data_key: backups
  - name: notify
    required: false
"#,
        )
        .unwrap();

        assert_eq!(config.pre_destroy.len(), 2);
        assert!(config.pre_destroy[0].required);
        assert!(config.pre_destroy[0].enabled);
        assert_eq!(config.pre_destroy[0].data_key.as_deref(), Some("backups"));
        assert!(!config.pre_destroy[1].required);
    }
}
