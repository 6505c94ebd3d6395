//! Proportional debt-pool tracking: the cumulative-factor ledger and the
//! per-account ownership records anchored to it.

pub mod issuance;
pub mod ledger;
