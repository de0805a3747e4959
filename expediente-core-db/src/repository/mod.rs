pub mod case_filter;
pub mod workflow_store;

// Re-exports
pub use case_filter::*;
pub use workflow_store::*;
