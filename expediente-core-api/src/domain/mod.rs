pub mod action;
pub mod actor;
pub mod policy;
pub mod role;
pub mod state;

// Re-exports
pub use action::*;
pub use actor::*;
pub use policy::*;
pub use role::*;
pub use state::*;
