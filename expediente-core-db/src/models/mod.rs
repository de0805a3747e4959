pub mod audit;
pub mod case;
pub mod evidence;
pub mod transition;

// Re-exports
pub use audit::*;
pub use case::*;
pub use evidence::*;
pub use transition::*;
