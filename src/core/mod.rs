//! Core business logic module
//!
//! This module contains the core ledger components:
//! - `traits` - Store and log abstractions plus the commit contract
//! - `engine` - The balance mutation engine
//! - `memory_store` - In-memory versioned store and transaction log

pub mod engine;
pub mod memory_store;
pub mod traits;

pub use engine::{EngineConfig, LedgerEngine};
pub use memory_store::MemoryStore;
pub use traits::{AccountHandle, AccountStore, AccountUpdate, CommitError, TransactionLog};
