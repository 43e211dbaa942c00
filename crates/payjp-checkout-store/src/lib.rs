//! Customer-record storage for the Pay.jp checkout gateway.
//!
//! Maps a store-front user to the Pay.jp customer and saved cards created for
//! them. Records are partitioned by [`ApiMode`] so test-mode data can be
//! purged without touching live customers.
//!
//! Two backends are provided:
//!
//! - `RocksStore` (feature `rocksdb-backend`): one column family per mode,
//!   values encoded as CBOR
//! - `MemoryStore`: a process-local map for tests and ephemeral deployments
//!
//! # Example
//!
//! ```
//! use payjp_checkout_core::{ApiMode, UserId};
//! use payjp_checkout_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! assert!(store.get_customer(ApiMode::Test, &UserId::new(1)).unwrap().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use payjp_checkout_core::{ApiMode, CustomerRecord, UserId};

/// The storage trait defining all customer-record operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    /// Get the customer record of a user, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_customer(&self, mode: ApiMode, user_id: &UserId) -> Result<Option<CustomerRecord>>;

    /// Insert or replace the customer record of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_customer(&self, mode: ApiMode, user_id: &UserId, record: &CustomerRecord)
        -> Result<()>;

    /// Delete every customer record of a mode. Returns the number removed.
    ///
    /// This is the only bulk deletion; records are never removed implicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn purge_customers(&self, mode: ApiMode) -> Result<usize>;
}
