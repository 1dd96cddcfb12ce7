//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the owner-scoped storage contract the todo core depends on.
//! - Isolate SQLite query details from orchestration and business rules.
//!
//! # Invariants
//! - Every read and write is filtered by `owner_id`.
//! - Multi-row writes only happen inside `TodoStore::write_transaction`.

pub mod todo_repo;
