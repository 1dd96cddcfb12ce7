//! Positional ordering rules for owner-scoped lists.
//!
//! # Responsibility
//! - Compute position assignments for insert, delete, move and compaction.
//! - Stay free of I/O so every rule is testable against plain slices.
//!
//! # Invariants
//! - Inputs are one owner's entries sorted by `(position, id)`.
//! - Outputs contain only entries whose position actually changes.

pub mod position;
