pub mod catalog;
pub mod db_init;
pub mod repository;
pub mod utils;

pub use catalog::PgOfficeCatalog;
pub use repository::workflow::PgWorkflowStore;

#[cfg(test)]
pub mod test_helper;
