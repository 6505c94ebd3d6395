use crate::core::account::AccountId;
use crate::core::fixed::{MathError, Wad};
use crate::debt::ledger::DebtLedger;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors arising from issuance accounting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssuanceError {
    /// The account has no outstanding debt to burn against.
    #[error("account has no outstanding debt")]
    ExcessBurn,
    #[error(transparent)]
    Math(#[from] MathError),
}

/// An account's recorded share of the debt pool.
///
/// `initial_debt_ownership` is the fraction of the pool the account owned
/// at the moment `debt_entry_index` was appended. The live fraction is
/// recovered lazily by rescaling against the ledger; the record itself is
/// only rewritten when this account issues or burns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRecord {
    /// Fraction of the pool owned, in [0, 1], valid as of the anchor entry.
    pub initial_debt_ownership: Wad,
    /// Index into the debt ledger this fraction is anchored to.
    pub debt_entry_index: usize,
}

/// Per-account ownership records plus the debt ledger they anchor to.
///
/// Only the issuing or burning account's record is touched by an event;
/// every other account's share is implicit in the ledger ratio, which is
/// what makes `ownership` O(1) regardless of how many accounts exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuanceAccounting {
    records: HashMap<AccountId, IssuanceRecord>,
    ledger: DebtLedger,
}

impl IssuanceAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &DebtLedger {
        &self.ledger
    }

    pub fn record(&self, account: &AccountId) -> Option<&IssuanceRecord> {
        self.records.get(account)
    }

    /// The account's current fraction of the debt pool: zero without a
    /// record, otherwise the anchored fraction rescaled through the ledger.
    pub fn ownership(&self, account: &AccountId) -> Result<Wad, MathError> {
        let record = match self.records.get(account) {
            Some(r) => r,
            None => return Ok(Wad::ZERO),
        };
        let anchor = self
            .ledger
            .cumulative_value_at(record.debt_entry_index)
            .unwrap_or(Wad::ZERO);
        if anchor.is_zero() {
            // A record can only anchor at a zero entry if its debt was
            // already zero; it owns nothing.
            return Ok(Wad::ZERO);
        }
        record
            .initial_debt_ownership
            .multiply_decimal(self.ledger.last_value())?
            .divide_decimal(anchor)
    }

    /// Record that `account` issued `issued` reference units of debt.
    ///
    /// `existing_debt` is the account's debt and `total_before` the whole
    /// pool's value, both in reference units as of the instant before this
    /// event. Appends one ledger entry and re-anchors the account's record.
    pub fn record_issuance(
        &mut self,
        account: &AccountId,
        issued: Wad,
        existing_debt: Wad,
        total_before: Wad,
    ) -> Result<(), IssuanceError> {
        let new_total = total_before.checked_add(issued)?;
        let new_debt = existing_debt.checked_add(issued)?;
        self.ledger.append(new_total, total_before)?;
        self.anchor(account, new_debt, new_total)?;
        debug!(
            "issuance recorded: {} +{} (debt {}, pool {})",
            account, issued, new_debt, new_total
        );
        Ok(())
    }

    /// Record that `account` burned debt. The burned amount is clamped to
    /// the account's current debt — burning can never push a debt negative.
    /// Burning with no debt at all is an error.
    ///
    /// Returns the amount actually burned after clamping.
    pub fn record_burn(
        &mut self,
        account: &AccountId,
        burned: Wad,
        existing_debt: Wad,
        total_before: Wad,
    ) -> Result<Wad, IssuanceError> {
        if existing_debt.is_zero() {
            return Err(IssuanceError::ExcessBurn);
        }
        let burned = burned.min(existing_debt);
        let new_total = total_before.checked_sub(burned)?;
        let new_debt = existing_debt.checked_sub(burned)?;
        self.ledger.append(new_total, total_before)?;
        self.anchor(account, new_debt, new_total)?;
        debug!(
            "burn recorded: {} -{} (debt {}, pool {})",
            account, burned, new_debt, new_total
        );
        Ok(burned)
    }

    /// Store the account's new `(fraction, anchor)` pair against the entry
    /// just appended, or clear the record once the debt is gone so the
    /// account re-anchors fresh on its next issuance.
    fn anchor(
        &mut self,
        account: &AccountId,
        new_debt: Wad,
        new_total: Wad,
    ) -> Result<(), MathError> {
        if new_debt.is_zero() {
            self.records.remove(account);
            return Ok(());
        }
        let ownership = new_debt.divide_decimal(new_total)?;
        self.records.insert(
            account.clone(),
            IssuanceRecord {
                initial_debt_ownership: ownership,
                debt_entry_index: self.ledger.len() - 1,
            },
        );
        Ok(())
    }
}
