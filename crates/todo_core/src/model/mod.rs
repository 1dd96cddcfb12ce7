//! Domain model for owner-scoped to-do items.
//!
//! # Responsibility
//! - Define the canonical todo record shared by engine, store and services.
//! - Keep input validation rules next to the data they guard.
//!
//! # Invariants
//! - Every todo belongs to exactly one owner for its whole lifetime.
//! - Positions of one owner's todos form the dense range `0..N`.

pub mod todo;
