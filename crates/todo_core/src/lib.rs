//! Core ordering engine for owner-scoped to-do lists.
//! This crate is the single source of truth for the dense position invariant.

pub mod db;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::todo::{OwnerId, Todo, TodoId, TodoValidationError};
pub use ordering::position::{PositionError, PositionUpdate, Slot};
pub use repo::todo_repo::{SqliteTodoStore, StoreError, StoreResult, TodoRows, TodoStore};
pub use service::error::{TodoError, TodoResult};
pub use service::mutation::{MutationOrchestrator, MutationSummary};
pub use service::todo_service::{OrderingReport, TodoService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
