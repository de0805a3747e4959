pub mod repo_impl;
pub mod rows;

mod create_case;
mod evidence;
mod read;
mod transition;
mod update_case;

pub use repo_impl::PgWorkflowStore;
