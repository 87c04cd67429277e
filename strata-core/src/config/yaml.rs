//! YAML codec with the `!include` tag.
//!
//! An `!include` node means "treat this scalar as a reference to another
//! document to be inlined". The codec does not expand includes; it preserves
//! the literal tag plus its scalar payload through a load/dump round-trip so
//! an external expansion pass can act on it.
//!
//! The codec is constructed once at process start and threaded through every
//! load/dump call; there is no global tag registration.

use crate::error::{Result, StrataError};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;
use std::path::Path;

/// Tag marking a scalar as a reference to another document.
pub const INCLUDE_TAG: &str = "include";

/// Explicit YAML parser/serializer configuration.
///
/// Never mutated after construction; no teardown required.
#[derive(Debug, Clone, Default)]
pub struct YamlCodec;

impl YamlCodec {
    pub fn new() -> Self {
        Self
    }

    /// Parse a YAML document, preserving `!include` (and any other) tags.
    pub fn load(&self, content: &str) -> Result<Value> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a YAML document from a file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Value> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.load(&content)
    }

    /// Serialize a document, writing preserved tags back out literally.
    pub fn dump(&self, value: &Value) -> Result<String> {
        Ok(serde_yaml::to_string(value)?)
    }

    /// Construct an `!include` node for `target`.
    pub fn include(target: &str) -> Value {
        Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(INCLUDE_TAG),
            value: Value::String(target.to_string()),
        }))
    }

    /// If `value` is an `!include` node, return the referenced document.
    pub fn include_target(value: &Value) -> Option<&str> {
        match value {
            Value::Tagged(tagged) if tagged.tag == Tag::new(INCLUDE_TAG) => {
                tagged.value.as_str()
            }
            _ => None,
        }
    }
}
