//! CLI command implementations

pub mod destroy;

pub use destroy::destroy;
