//! Stack output lookup.
//!
//! Resolves `<stack_name>::<output_name>` against outputs recorded after a
//! successful create. A stack with no recorded output collection is
//! distinguished from a stack missing one specific key.

use crate::context::Context;
use crate::error::{Result, StrataError};
use crate::lookups::split_lookup;

pub const TYPE_NAME: &str = "output";

/// Fetch an output from the designated stack.
pub fn handler(value: &str, context: &Context) -> Result<String> {
    let (stack_name, output_name) = split_lookup(TYPE_NAME, value)?;

    let stack = context.get_stack(stack_name)?;
    let outputs = stack
        .outputs
        .as_ref()
        .ok_or_else(|| StrataError::NoOutputs { stack: stack_name.to_string() })?;

    outputs
        .get(output_name)
        .cloned()
        .ok_or_else(|| StrataError::OutputMissing {
            stack: stack_name.to_string(),
            name: output_name.to_string(),
        })
}
