//! In-memory storage implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use payjp_checkout_core::{ApiMode, CustomerRecord, UserId};

use crate::error::{Result, StoreError};
use crate::Store;

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<HashMap<(ApiMode, UserId), CustomerRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Database("memory store lock poisoned".into())
    }
}

impl Store for MemoryStore {
    fn get_customer(&self, mode: ApiMode, user_id: &UserId) -> Result<Option<CustomerRecord>> {
        let customers = self.customers.read().map_err(Self::poisoned)?;
        Ok(customers.get(&(mode, *user_id)).cloned())
    }

    fn put_customer(
        &self,
        mode: ApiMode,
        user_id: &UserId,
        record: &CustomerRecord,
    ) -> Result<()> {
        let mut customers = self.customers.write().map_err(Self::poisoned)?;
        customers.insert((mode, *user_id), record.clone());
        Ok(())
    }

    fn purge_customers(&self, mode: ApiMode) -> Result<usize> {
        let mut customers = self.customers.write().map_err(Self::poisoned)?;
        let before = customers.len();
        customers.retain(|(record_mode, _), _| *record_mode != mode);
        Ok(before - customers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payjp_checkout_core::CardSummary;

    fn record(customer: &str) -> CustomerRecord {
        CustomerRecord::new(
            customer.parse().unwrap(),
            CardSummary {
                id: "car_1".parse().unwrap(),
                brand: "Visa".into(),
                last4: "4242".into(),
                exp_month: 1,
                exp_year: 2031,
            },
        )
    }

    #[test]
    fn customer_crud() {
        let store = MemoryStore::new();
        let user = UserId::new(7);

        store.put_customer(ApiMode::Test, &user, &record("cus_a")).unwrap();
        let fetched = store.get_customer(ApiMode::Test, &user).unwrap().unwrap();
        assert_eq!(fetched.customer_id.as_str(), "cus_a");

        // Modes are separate namespaces.
        assert!(store.get_customer(ApiMode::Live, &user).unwrap().is_none());

        // Writing again replaces the record.
        store.put_customer(ApiMode::Test, &user, &record("cus_b")).unwrap();
        let replaced = store.get_customer(ApiMode::Test, &user).unwrap().unwrap();
        assert_eq!(replaced.customer_id.as_str(), "cus_b");
    }

    #[test]
    fn purge_only_touches_one_mode() {
        let store = MemoryStore::new();
        store.put_customer(ApiMode::Test, &UserId::new(1), &record("cus_t1")).unwrap();
        store.put_customer(ApiMode::Test, &UserId::new(2), &record("cus_t2")).unwrap();
        store.put_customer(ApiMode::Live, &UserId::new(1), &record("cus_l1")).unwrap();

        assert_eq!(store.purge_customers(ApiMode::Test).unwrap(), 2);
        assert!(store.get_customer(ApiMode::Test, &UserId::new(1)).unwrap().is_none());
        assert!(store.get_customer(ApiMode::Live, &UserId::new(1)).unwrap().is_some());
    }
}
