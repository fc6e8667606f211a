//! SQLite storage layer.
//!
//! Message store backed by SQLite with WAL mode and split read/write
//! connection pools.

pub mod pool;
pub mod store;
