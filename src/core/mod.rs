// Public modules
pub mod binaries;
pub mod defaults;
pub mod error;
pub mod executor;
pub mod git;
pub mod interface;
pub mod paths;
pub mod pipeline;
pub mod release;
pub mod workspace;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
