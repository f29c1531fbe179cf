//! Generic utility primitives with zero domain knowledge.
//!
//! - `shell` - Shell quoting for displayed command lines
//! - `template` - String template rendering
//! - `validation` - Input validation helpers

pub mod shell;
pub mod template;
pub mod validation;
