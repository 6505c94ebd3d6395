//! # nomin-engine
//!
//! Multi-currency synthetic token issuance engine.
//!
//! Issues currency-pegged tokens ("nomins") against a single collateral
//! asset, tracking each issuer's proportional share of the system-wide
//! debt pool. Rate movement and other issuers' activity change what an
//! account owes without touching its record: a cumulative rescaling
//! ledger makes every debt query O(1) in the number of accounts.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: 18-decimal fixed point, currency keys, accounts
//! - **rates** — Oracle-fed exchange rates and cross-currency conversion
//! - **debt** — The rescaling debt ledger and per-account issuance records
//! - **token** — Balance-and-allowance ledgers for collateral and pegged tokens
//! - **registry** — The set of registered currencies and their ledger addresses
//! - **engine** — The issuance engine tying it all together
//! - **simulation** — Randomized scenarios under moving rates

pub mod core;
pub mod debt;
pub mod engine;
pub mod rates;
pub mod registry;
pub mod simulation;
pub mod token;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::account::AccountId;
    pub use crate::core::currency::CurrencyKey;
    pub use crate::core::fixed::Wad;
    pub use crate::debt::issuance::IssuanceAccounting;
    pub use crate::debt::ledger::DebtLedger;
    pub use crate::engine::{EngineError, NominEngine};
    pub use crate::rates::oracle::ExchangeRates;
    pub use crate::registry::CurrencyRegistry;
    pub use crate::token::ledger::TokenLedger;
}
