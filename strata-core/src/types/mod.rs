//! Shared domain types.

pub mod stack;

pub use stack::{Stack, StackDefinition};
