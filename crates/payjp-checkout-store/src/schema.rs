//! Column families.

use payjp_checkout_core::ApiMode;

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Test-mode customer records, keyed by `user_id`.
    pub const CUSTOMERS_TEST: &str = "customers_test";

    /// Live-mode customer records, keyed by `user_id`.
    pub const CUSTOMERS_LIVE: &str = "customers_live";
}

/// Column family holding customer records for `mode`.
#[must_use]
pub const fn customers_cf(mode: ApiMode) -> &'static str {
    match mode {
        ApiMode::Test => cf::CUSTOMERS_TEST,
        ApiMode::Live => cf::CUSTOMERS_LIVE,
    }
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::CUSTOMERS_TEST, cf::CUSTOMERS_LIVE]
}
