//! Adapter implementations
//!
//! Adapters implement the store ports with concrete technologies:
//! - DuckDB for persistent storage
//! - Tokio RwLock-guarded collections for tests and ephemeral use

pub mod duckdb;
pub mod memory;
