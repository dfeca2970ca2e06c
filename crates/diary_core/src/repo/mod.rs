//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entry data access contract.
//! - Isolate SQLite query details from editor/calendar orchestration.
//! - Provide a background store worker with per-request completion handles.
//!
//! # Invariants
//! - Repository writes must enforce `Entry::validate()` before persistence.
//! - Worker requests complete in the order they were issued.

pub mod entry_repo;
pub mod worker;
