//! # librarian-storage
//!
//! DashMap-backed reference implementations of the collaborator traits.
//! Persistent backends (SQLite and friends) live outside this workspace;
//! these exist so the core is exercised end-to-end and tests share one
//! backend instead of each hand-rolling their own.

mod graph;
mod state;

pub use graph::MemoryGraphStore;
pub use state::MemoryStateStore;
