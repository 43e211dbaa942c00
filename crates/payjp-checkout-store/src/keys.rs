//! Key encoding.

use payjp_checkout_core::UserId;

/// Create a customer-record key from a user ID.
///
/// Big-endian so that keys iterate in user-id order.
#[must_use]
pub fn customer_key(user_id: &UserId) -> Vec<u8> {
    user_id.to_be_bytes().to_vec()
}
