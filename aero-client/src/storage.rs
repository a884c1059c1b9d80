//! redb-based local persistence for the client
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `cart` | `"lines"` | JSON array of `CartItem` | Persisted cart lines |
//! | `prefs` | pref key | `&str` | Remembered checkout fields |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default, so a cart line is
//! on disk as soon as `save_cart` returns. The cart survives app restarts
//! but is local to one device.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::CartItem;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for the cart: one JSON array under [`CART_KEY`]
///
/// 整张购物车存成单个数组，恢复时保持加入顺序 (按 id 分行会被键序打乱)。
const CART_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cart");

const CART_KEY: &str = "lines";

/// Table for small client preferences: key = pref name, value = string
const PREFS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("prefs");

const TAIL_NUMBER_KEY: &str = "tail_number";

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
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Client-local store backed by redb
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create tables up front so readers never see a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CART_TABLE)?;
            let _ = write_txn.open_table(PREFS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    // ========== Cart Operations ==========

    /// Load the persisted cart lines, in the order they were saved
    pub fn load_cart(&self) -> StorageResult<Vec<CartItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CART_TABLE)?;
        match table.get(CART_KEY)? {
            Some(guard) => Ok(serde_json::from_slice(guard.value())?),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the persisted cart with the given lines
    pub fn save_cart(&self, items: &[CartItem]) -> StorageResult<()> {
        let bytes = serde_json::to_vec(items)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CART_TABLE)?;
            table.insert(CART_KEY, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove all persisted cart lines
    pub fn clear_cart(&self) -> StorageResult<()> {
        self.save_cart(&[])
    }

    // ========== Preference Operations ==========

    /// Last tail number used at checkout, if any
    pub fn remembered_tail(&self) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PREFS_TABLE)?;
        Ok(table
            .get(TAIL_NUMBER_KEY)?
            .map(|guard| guard.value().to_string()))
    }

    /// Remember the tail number for the next checkout
    pub fn set_remembered_tail(&self, tail: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PREFS_TABLE)?;
            table.insert(TAIL_NUMBER_KEY, tail)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Forget the remembered tail number
    pub fn forget_tail(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PREFS_TABLE)?;
            table.remove(TAIL_NUMBER_KEY)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
