//! Domain model for journal entries.
//!
//! # Responsibility
//! - Define the canonical entry record and its date key.
//!
//! # Invariants
//! - Every entry is identified by exactly one `DateKey`.
//! - An entry with a blank body is never a valid persisted entry.

pub mod entry;
