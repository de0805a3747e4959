pub mod engine;
pub mod models;
pub mod repository;
pub mod store;

// Re-exports
pub use engine::*;
pub use models::*;
pub use repository::*;
