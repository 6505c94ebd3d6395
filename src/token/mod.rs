//! Fungible-token account books: one per pegged currency plus one for the
//! collateral asset. The engine drives mint/burn after its own accounting
//! succeeds; debt tracking never reads these balances.

pub mod ledger;
