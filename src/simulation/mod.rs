//! Randomized simulation of issuance activity under moving rates.

pub mod rate_volatility;
pub mod scenario;
