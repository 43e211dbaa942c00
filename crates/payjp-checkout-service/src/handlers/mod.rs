//! API handlers.

pub mod admin;
pub mod checkout;
pub mod health;
pub mod payments;
