pub mod catalog;
pub mod commands;

// Re-exports
pub use catalog::*;
pub use commands::*;
