//! Hook data lookup.
//!
//! Resolves `<hook_name>::<key>` against data recorded by hooks during a
//! previous stage.

use crate::context::Context;
use crate::error::{Result, StrataError};
use crate::lookups::split_lookup;

pub const TYPE_NAME: &str = "hook_data";

/// Return the value of a key for a given hook in hook data.
pub fn handler(value: &str, context: &Context) -> Result<serde_json::Value> {
    let (hook_name, key) = split_lookup(TYPE_NAME, value)?;

    let data = context
        .hook_data()
        .get(hook_name)
        .ok_or_else(|| StrataError::HookDataMissing { hook: hook_name.to_string() })?;

    data.get(key)
        .cloned()
        .ok_or_else(|| StrataError::HookKeyMissing {
            hook: hook_name.to_string(),
            key: key.to_string(),
        })
}
