//! Caller-supplied customisation of customer and charge data.
//!
//! Hooks may add metadata and rewrite descriptions. They never see or return
//! the amount, currency, capture flag, card, customer, email or token, so
//! they cannot alter them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use payjp_checkout_core::{FormData, Order};

/// Extra provider metadata derived from the attempt.
pub type MetadataHook = Arc<dyn Fn(&FormData, &Order) -> BTreeMap<String, String> + Send + Sync>;

/// Rewrites a default description.
pub type DescriptionHook = Arc<dyn Fn(String, &FormData, &Order) -> String + Send + Sync>;

/// Optional hooks; every unset hook is the identity.
#[derive(Clone, Default)]
pub struct CheckoutHooks {
    customer_data: Option<MetadataHook>,
    customer_description: Option<DescriptionHook>,
    charge_data: Option<MetadataHook>,
    charge_description: Option<DescriptionHook>,
}

impl fmt::Debug for CheckoutHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutHooks")
            .field("customer_data", &self.customer_data.is_some())
            .field("customer_description", &self.customer_description.is_some())
            .field("charge_data", &self.charge_data.is_some())
            .field("charge_description", &self.charge_description.is_some())
            .finish()
    }
}

impl CheckoutHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add metadata to newly created customers.
    #[must_use]
    pub fn with_customer_data(
        mut self,
        hook: impl Fn(&FormData, &Order) -> BTreeMap<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.customer_data = Some(Arc::new(hook));
        self
    }

    /// Rewrite the description of newly created customers.
    #[must_use]
    pub fn with_customer_description(
        mut self,
        hook: impl Fn(String, &FormData, &Order) -> String + Send + Sync + 'static,
    ) -> Self {
        self.customer_description = Some(Arc::new(hook));
        self
    }

    /// Add metadata to charges.
    #[must_use]
    pub fn with_charge_data(
        mut self,
        hook: impl Fn(&FormData, &Order) -> BTreeMap<String, String> + Send + Sync + 'static,
    ) -> Self {
        self.charge_data = Some(Arc::new(hook));
        self
    }

    /// Rewrite the charge description.
    #[must_use]
    pub fn with_charge_description(
        mut self,
        hook: impl Fn(String, &FormData, &Order) -> String + Send + Sync + 'static,
    ) -> Self {
        self.charge_description = Some(Arc::new(hook));
        self
    }

    pub(crate) fn customer_data(&self, form: &FormData, order: &Order) -> BTreeMap<String, String> {
        self.customer_data
            .as_ref()
            .map(|hook| hook(form, order))
            .unwrap_or_default()
    }

    pub(crate) fn customer_description(
        &self,
        default: String,
        form: &FormData,
        order: &Order,
    ) -> String {
        match &self.customer_description {
            Some(hook) => hook(default, form, order),
            None => default,
        }
    }

    pub(crate) fn charge_data(&self, form: &FormData, order: &Order) -> BTreeMap<String, String> {
        self.charge_data
            .as_ref()
            .map(|hook| hook(form, order))
            .unwrap_or_default()
    }

    pub(crate) fn charge_description(
        &self,
        default: String,
        form: &FormData,
        order: &Order,
    ) -> String {
        match &self.charge_description {
            Some(hook) => hook(default, form, order),
            None => default,
        }
    }
}
