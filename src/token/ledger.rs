use crate::core::account::AccountId;
use crate::core::currency::CurrencyKey;
use crate::core::fixed::{MathError, Wad};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Errors arising from token ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance for {account}: need {required}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        required: Wad,
        available: Wad,
    },
    #[error("insufficient allowance for {spender} on {owner}: need {required}, have {available}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        required: Wad,
        available: Wad,
    },
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Unique address identifying a deployed token ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerAddress(Uuid);

impl LedgerAddress {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LedgerAddress {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LedgerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fungible-token account book with standard transfer and allowance
/// semantics.
///
/// Balances, allowances and total supply are all the ledger knows; it has
/// no opinion about debt or collateral. Supply only changes through
/// `mint`/`burn`, which the engine calls once its own bookkeeping has
/// already succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    address: LedgerAddress,
    currency: CurrencyKey,
    name: String,
    balances: HashMap<AccountId, Wad>,
    allowances: HashMap<(AccountId, AccountId), Wad>,
    total_supply: Wad,
}

impl TokenLedger {
    pub fn new(currency: CurrencyKey, name: impl Into<String>) -> Self {
        Self {
            address: LedgerAddress::new(),
            currency,
            name: name.into(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: Wad::ZERO,
        }
    }

    pub fn address(&self) -> LedgerAddress {
        self.address
    }

    pub fn currency(&self) -> CurrencyKey {
        self.currency
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_supply(&self) -> Wad {
        self.total_supply
    }

    pub fn balance_of(&self, account: &AccountId) -> Wad {
        self.balances.get(account).copied().unwrap_or(Wad::ZERO)
    }

    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Wad {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Wad::ZERO)
    }

    /// Create `amount` new tokens in `account`'s balance.
    pub fn mint(&mut self, account: &AccountId, amount: Wad) -> Result<(), TokenError> {
        let balance = self.balance_of(account).checked_add(amount)?;
        self.total_supply = self.total_supply.checked_add(amount)?;
        self.balances.insert(account.clone(), balance);
        Ok(())
    }

    /// Destroy `amount` tokens from `account`'s balance.
    pub fn burn(&mut self, account: &AccountId, amount: Wad) -> Result<(), TokenError> {
        let available = self.balance_of(account);
        if amount > available {
            return Err(TokenError::InsufficientBalance {
                account: account.clone(),
                required: amount,
                available,
            });
        }
        self.balances
            .insert(account.clone(), available.checked_sub(amount)?);
        self.total_supply = self.total_supply.checked_sub(amount)?;
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Wad,
    ) -> Result<(), TokenError> {
        let from_balance = self.balance_of(from);
        if amount > from_balance {
            return Err(TokenError::InsufficientBalance {
                account: from.clone(),
                required: amount,
                available: from_balance,
            });
        }
        let to_balance = self.balance_of(to).checked_add(amount)?;
        self.balances
            .insert(from.clone(), from_balance.checked_sub(amount)?);
        self.balances.insert(to.clone(), to_balance);
        Ok(())
    }

    /// Authorize `spender` to move up to `amount` of `owner`'s balance.
    pub fn approve(&mut self, owner: &AccountId, spender: &AccountId, amount: Wad) {
        self.allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    /// Transfer on behalf of `from`, consuming `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Wad,
    ) -> Result<(), TokenError> {
        let available = self.allowance(from, spender);
        if amount > available {
            return Err(TokenError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                required: amount,
                available,
            });
        }
        self.transfer(from, to, amount)?;
        self.allowances
            .insert((from.clone(), spender.clone()), available.checked_sub(amount)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn nusd_ledger() -> TokenLedger {
        TokenLedger::new(CurrencyKey::new("nUSD"), "Nomin USD")
    }

    #[test]
    fn test_mint_and_supply() {
        let mut ledger = nusd_ledger();
        ledger.mint(&acct("alice"), Wad::from_int(100)).unwrap();
        assert_eq!(ledger.balance_of(&acct("alice")), Wad::from_int(100));
        assert_eq!(ledger.total_supply(), Wad::from_int(100));
    }

    #[test]
    fn test_burn_respects_balance() {
        let mut ledger = nusd_ledger();
        ledger.mint(&acct("alice"), Wad::from_int(100)).unwrap();
        ledger.burn(&acct("alice"), Wad::from_int(40)).unwrap();
        assert_eq!(ledger.balance_of(&acct("alice")), Wad::from_int(60));
        assert_eq!(ledger.total_supply(), Wad::from_int(60));

        let err = ledger.burn(&acct("alice"), Wad::from_int(61));
        assert!(matches!(err, Err(TokenError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_transfer() {
        let mut ledger = nusd_ledger();
        ledger.mint(&acct("alice"), Wad::from_int(100)).unwrap();
        ledger
            .transfer(&acct("alice"), &acct("bob"), Wad::from_int(30))
            .unwrap();
        assert_eq!(ledger.balance_of(&acct("alice")), Wad::from_int(70));
        assert_eq!(ledger.balance_of(&acct("bob")), Wad::from_int(30));
        // Supply unchanged by transfers.
        assert_eq!(ledger.total_supply(), Wad::from_int(100));
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = nusd_ledger();
        let (alice, bob, carol) = (acct("alice"), acct("bob"), acct("carol"));
        ledger.mint(&alice, Wad::from_int(100)).unwrap();
        ledger.approve(&alice, &bob, Wad::from_int(10));

        ledger
            .transfer_from(&bob, &alice, &carol, Wad::from_int(10))
            .unwrap();
        assert_eq!(ledger.balance_of(&carol), Wad::from_int(10));
        assert_eq!(ledger.allowance(&alice, &bob), Wad::ZERO);

        // Exhausted allowance blocks further spending despite the balance.
        let err = ledger.transfer_from(&bob, &alice, &carol, Wad::from_raw(1));
        assert!(matches!(err, Err(TokenError::InsufficientAllowance { .. })));
    }

    #[test]
    fn test_distinct_addresses() {
        assert_ne!(nusd_ledger().address(), nusd_ledger().address());
    }
}
