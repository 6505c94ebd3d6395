//! Registry of enabled currency keys and their token ledger addresses.

use crate::core::currency::CurrencyKey;
use crate::token::ledger::LedgerAddress;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors arising from registry administration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("currency {0} is not registered")]
    UnknownCurrency(CurrencyKey),
    #[error("currency key {0} is already registered")]
    DuplicateCurrencyKey(CurrencyKey),
    #[error("token ledger {0} is already registered under another key")]
    DuplicateAddress(LedgerAddress),
}

/// The set of enabled currency keys, each mapped to its token ledger.
///
/// Keeps an ordered key list for enumeration alongside the key→address
/// map. Removal compacts the list in place, preserving the relative order
/// of the remaining keys so external iteration stays coherent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyRegistry {
    keys: Vec<CurrencyKey>,
    ledgers: HashMap<CurrencyKey, LedgerAddress>,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a currency key with its token ledger address.
    pub fn add(&mut self, key: CurrencyKey, address: LedgerAddress) -> Result<(), RegistryError> {
        if self.ledgers.contains_key(&key) {
            return Err(RegistryError::DuplicateCurrencyKey(key));
        }
        if self.ledgers.values().any(|&a| a == address) {
            return Err(RegistryError::DuplicateAddress(address));
        }
        self.keys.push(key);
        self.ledgers.insert(key, address);
        Ok(())
    }

    /// Deregister a currency key, returning its ledger address.
    pub fn remove(&mut self, key: CurrencyKey) -> Result<LedgerAddress, RegistryError> {
        let address = self
            .ledgers
            .remove(&key)
            .ok_or(RegistryError::UnknownCurrency(key))?;
        self.keys.retain(|&k| k != key);
        Ok(address)
    }

    pub fn contains(&self, key: CurrencyKey) -> bool {
        self.ledgers.contains_key(&key)
    }

    pub fn ledger_address(&self, key: CurrencyKey) -> Option<LedgerAddress> {
        self.ledgers.get(&key).copied()
    }

    /// Registered keys in insertion order.
    pub fn keys(&self) -> &[CurrencyKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CurrencyKey {
        CurrencyKey::new(s)
    }

    #[test]
    fn test_add_and_lookup() {
        let mut registry = CurrencyRegistry::new();
        let address = LedgerAddress::new();
        registry.add(key("nUSD"), address).unwrap();

        assert!(registry.contains(key("nUSD")));
        assert_eq!(registry.ledger_address(key("nUSD")), Some(address));
        assert_eq!(registry.keys(), &[key("nUSD")]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = CurrencyRegistry::new();
        registry.add(key("nUSD"), LedgerAddress::new()).unwrap();
        assert_eq!(
            registry.add(key("nUSD"), LedgerAddress::new()),
            Err(RegistryError::DuplicateCurrencyKey(key("nUSD")))
        );
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut registry = CurrencyRegistry::new();
        let address = LedgerAddress::new();
        registry.add(key("nUSD"), address).unwrap();
        assert_eq!(
            registry.add(key("nAUD"), address),
            Err(RegistryError::DuplicateAddress(address))
        );
    }

    #[test]
    fn test_remove_unknown_rejected() {
        let mut registry = CurrencyRegistry::new();
        assert_eq!(
            registry.remove(key("NOPE")),
            Err(RegistryError::UnknownCurrency(key("NOPE")))
        );
    }

    #[test]
    fn test_remove_preserves_enumeration_order() {
        let mut registry = CurrencyRegistry::new();
        registry.add(key("nUSD"), LedgerAddress::new()).unwrap();
        registry.add(key("nAUD"), LedgerAddress::new()).unwrap();
        registry.add(key("nEUR"), LedgerAddress::new()).unwrap();

        registry.remove(key("nAUD")).unwrap();
        assert_eq!(registry.keys(), &[key("nUSD"), key("nEUR")]);

        // Re-adding lands at the end, not the old slot.
        registry.add(key("nAUD"), LedgerAddress::new()).unwrap();
        assert_eq!(registry.keys(), &[key("nUSD"), key("nEUR"), key("nAUD")]);
    }
}
