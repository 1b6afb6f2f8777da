//! The `Pipeline` struct: construction, hooks and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Pipeline;
