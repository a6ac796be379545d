//! Larder Store - Local record persistence
//!
//! SQLite-based store for:
//! - Ingredient records and their sync state
//! - Dish (recipe) records
//! - Tombstones awaiting remote deletion
//!
//! ## Architecture
//!
//! This crate implements the `IRecordStore` port from `larder-core`
//! using SQLite as the storage backend. It is a driven (secondary)
//! adapter in the hexagonal architecture, and it is the only component
//! the UI layer reads from.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteRecordStore`] - Full `IRecordStore` implementation
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use larder_store::{DatabasePool, SqliteRecordStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/larder/larder.db")).await?;
//! let store = SqliteRecordStore::new(pool.pool().clone());
//! // Use store as IRecordStore...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteRecordStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
