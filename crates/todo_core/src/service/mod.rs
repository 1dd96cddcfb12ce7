//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input for todo use cases.
//! - Run every mutation through the transactional orchestrator.
//! - Keep API/auth layers decoupled from storage details.

pub mod error;
pub mod mutation;
pub mod todo_service;
