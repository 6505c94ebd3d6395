//! Exchange rates: oracle-published per-currency rates and conversion.

pub mod convert;
pub mod oracle;
