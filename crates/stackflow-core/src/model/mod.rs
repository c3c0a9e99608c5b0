//! Model definitions
//!
//! The compose document, its flows and their stacks.

mod compose;
mod flow;
mod stack;

// Re-exports
pub use compose::*;
pub use flow::*;
pub use stack::*;
