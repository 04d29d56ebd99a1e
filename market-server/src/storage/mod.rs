//! redb-based persistence for orders and carts
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Orders, soft-deleted in place |
//! | `carts` | `customer_id` | `Cart` (JSON) | One stored cart per customer |
//! | `locations` | `location_id` | `Location` (JSON) | Delivery addresses, user positions |
//! | `user_locations` | `user_id` | `location_id` | Current position of each relocated user |
//! | `counters` | `name` | `u64` | Order number sequence |
//!
//! redb serialises write transactions, so every read-modify-write done
//! inside one write transaction is atomic with respect to other writers.

mod carts;
mod locations;
mod orders;

pub use orders::OrderFilter;

use redb::{Database, ReadableTable, TableDefinition};
use shared::models::OrderStatus;
use shared::{AppError, ErrorCode};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = order_id, value = JSON-serialized Order
pub(crate) const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// key = customer_id, value = JSON-serialized Cart
pub(crate) const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// key = location_id, value = JSON-serialized Location
pub(crate) const LOCATIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("locations");

/// key = user_id, value = location_id
pub(crate) const USER_LOCATIONS_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("user_locations");

/// key = counter name, value = u64
pub(crate) const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

pub(crate) const ORDER_NO_KEY: &str = "order_no";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {order_id} is {actual}, expected {expected}")]
    StatusConflict {
        order_id: String,
        expected: OrderStatus,
        actual: OrderStatus,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderNotFound(order_id) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
            }
            StorageError::StatusConflict { .. } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, err.to_string())
            }
            other => AppError::database(other.to_string()),
        }
    }
}

/// Order and cart storage backed by redb
#[derive(Clone)]
pub struct MarketStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for MarketStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStorage").finish_non_exhaustive()
    }
}

impl MarketStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(LOCATIONS_TABLE)?;
            let _ = write_txn.open_table(USER_LOCATIONS_TABLE)?;
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_NO_KEY)?.is_none() {
                counters.insert(ORDER_NO_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    pub(crate) fn db(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_on_disk_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market.redb");

        {
            let storage = MarketStorage::open(&path).unwrap();
            assert_eq!(storage.next_order_no().unwrap(), 1);
            assert_eq!(storage.next_order_no().unwrap(), 2);
        }

        let storage = MarketStorage::open(&path).unwrap();
        assert_eq!(storage.next_order_no().unwrap(), 3);
    }
}
