//! Store layer for Moneta.
//!
//! The persistence engine itself is an external collaborator: this crate
//! defines the interface the engine requires from it - point lookups, range
//! scans, and an atomic multi-write unit - plus an in-memory reference
//! implementation used by the dev runner and the test suites.

pub mod error;
pub mod memory;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{LedgerStore, MaterializeOutcome};
