//! Foundational types: fixed-point arithmetic, currency keys, account ids.

pub mod account;
pub mod currency;
pub mod fixed;
