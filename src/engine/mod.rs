//! The issuance engine: collateral policy, debt queries, and orchestration
//! of the accounting, registry, oracle, and token ledgers.

pub mod config;

use crate::core::account::AccountId;
use crate::core::currency::CurrencyKey;
use crate::core::fixed::{MathError, Wad};
use crate::debt::issuance::{IssuanceAccounting, IssuanceError};
use crate::rates::convert::RateConverter;
use crate::rates::oracle::{ExchangeRates, RateError};
use crate::registry::{CurrencyRegistry, RegistryError};
use crate::token::ledger::{LedgerAddress, TokenError, TokenLedger};
use config::{ConfigError, EngineConfig};
use log::info;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors arising from engine operations.
///
/// Every error aborts the whole requested operation before any state has
/// changed; callers observe a clean failure and may retry with corrected
/// inputs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("caller is not the owner")]
    Unauthorized,
    #[error("currency {0} is not registered")]
    UnknownCurrency(CurrencyKey),
    #[error("{0} is not an authorized issuer")]
    NotAuthorizedIssuer(AccountId),
    #[error("issuing {requested} exceeds the remaining issuable {remaining}")]
    ExceedsIssuableLimit { requested: Wad, remaining: Wad },
    #[error("cannot deregister {0}: {1} of it is still issued")]
    NonZeroDebt(CurrencyKey, Wad),
    #[error("transferring {requested} exceeds the unlocked collateral {transferable}")]
    InsufficientUnlockedCollateral { requested: Wad, transferable: Wad },
    #[error(transparent)]
    OutOfRangeConfig(#[from] ConfigError),
    #[error(transparent)]
    Rate(#[from] RateError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Issuance(#[from] IssuanceError),
    #[error(transparent)]
    Math(#[from] MathError),
}

/// The multi-currency synthetic issuance engine.
///
/// Owns the collateral token ledger, one pegged-token ledger per registered
/// currency, the currency registry, the oracle-written exchange rates, the
/// debt ledger with its per-account issuance records, and the configuration
/// surface. All state-mutating calls are strictly serialized through
/// `&mut self`: an operation validates everything it needs first and only
/// then applies its effects, so a failing check never leaves partial state.
///
/// Debt amounts are tracked internally in the reference unit (`nUSD` by
/// default) and converted to the requested currency at query time.
#[derive(Debug)]
pub struct NominEngine {
    owner: AccountId,
    collateral_key: CurrencyKey,
    reference_key: CurrencyKey,
    collateral: TokenLedger,
    nomins: HashMap<LedgerAddress, TokenLedger>,
    registry: CurrencyRegistry,
    rates: ExchangeRates,
    accounting: IssuanceAccounting,
    config: EngineConfig,
    issuers: HashSet<AccountId>,
}

impl NominEngine {
    /// Create an engine whose entire collateral supply starts in the
    /// owner's balance.
    pub fn new(owner: AccountId, collateral_supply: Wad) -> Self {
        let collateral_key = CurrencyKey::new("HAV");
        let mut collateral = TokenLedger::new(collateral_key, "Havven");
        collateral
            .mint(&owner, collateral_supply)
            .expect("minting into a fresh ledger cannot overflow");
        Self {
            owner,
            collateral_key,
            reference_key: CurrencyKey::new("nUSD"),
            collateral,
            nomins: HashMap::new(),
            registry: CurrencyRegistry::new(),
            rates: ExchangeRates::new(),
            accounting: IssuanceAccounting::new(),
            config: EngineConfig::default(),
            issuers: HashSet::new(),
        }
    }

    // --- Accessors ---

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn collateral_key(&self) -> CurrencyKey {
        self.collateral_key
    }

    pub fn reference_key(&self) -> CurrencyKey {
        self.reference_key
    }

    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn accounting(&self) -> &IssuanceAccounting {
        &self.accounting
    }

    pub fn collateral(&self) -> &TokenLedger {
        &self.collateral
    }

    /// The token ledger for a registered currency.
    pub fn nomin(&self, key: CurrencyKey) -> Option<&TokenLedger> {
        let address = self.registry.ledger_address(key)?;
        self.nomins.get(&address)
    }

    /// Read access to oracle state.
    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    /// The oracle's write surface. Rates may move underneath the engine at
    /// any time between operations; every consumer re-checks staleness at
    /// point of use.
    pub fn rates_mut(&mut self) -> &mut ExchangeRates {
        &mut self.rates
    }

    fn converter(&self) -> RateConverter<'_> {
        RateConverter::new(&self.rates)
    }

    fn require_owner(&self, caller: &AccountId) -> Result<(), EngineError> {
        if caller != &self.owner {
            return Err(EngineError::Unauthorized);
        }
        Ok(())
    }

    // --- Administration (privileged) ---

    /// Register a pegged-token ledger under its currency key.
    pub fn add_nomin(
        &mut self,
        caller: &AccountId,
        ledger: TokenLedger,
    ) -> Result<LedgerAddress, EngineError> {
        self.require_owner(caller)?;
        let address = ledger.address();
        self.registry.add(ledger.currency(), address)?;
        info!("nomin added: {} at {}", ledger.currency(), address);
        self.nomins.insert(address, ledger);
        Ok(address)
    }

    /// Deregister a currency, returning its token ledger. Fails while any
    /// of the currency is still issued.
    pub fn remove_nomin(
        &mut self,
        caller: &AccountId,
        key: CurrencyKey,
    ) -> Result<TokenLedger, EngineError> {
        self.require_owner(caller)?;
        let ledger = self.nomin(key).ok_or(EngineError::UnknownCurrency(key))?;
        let supply = ledger.total_supply();
        if !supply.is_zero() {
            return Err(EngineError::NonZeroDebt(key, supply));
        }
        let address = self.registry.remove(key)?;
        info!("nomin removed: {} at {}", key, address);
        // The registry entry existed, so the ledger must too.
        self.nomins
            .remove(&address)
            .ok_or(EngineError::UnknownCurrency(key))
    }

    /// Grant or revoke an account's right to issue.
    pub fn set_issuer(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        authorized: bool,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        if authorized {
            self.issuers.insert(account.clone());
        } else {
            self.issuers.remove(account);
        }
        info!("issuer {}: authorized={}", account, authorized);
        Ok(())
    }

    pub fn is_issuer(&self, account: &AccountId) -> bool {
        self.issuers.contains(account)
    }

    pub fn set_issuance_ratio(
        &mut self,
        caller: &AccountId,
        ratio: Wad,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        self.config.set_issuance_ratio(ratio)?;
        info!("issuance ratio set to {}", ratio);
        Ok(())
    }

    pub fn set_fee_period_duration(
        &mut self,
        caller: &AccountId,
        duration: chrono::Duration,
    ) -> Result<(), EngineError> {
        self.require_owner(caller)?;
        self.config.set_fee_period_duration(duration)?;
        info!("fee period duration set to {}", duration);
        Ok(())
    }

    // --- Queries ---

    /// The value of `amount` of `from`, expressed in `to`.
    pub fn effective_value(
        &self,
        from: CurrencyKey,
        amount: Wad,
        to: CurrencyKey,
    ) -> Result<Wad, EngineError> {
        Ok(self.converter().effective_value(from, amount, to)?)
    }

    /// Total issued debt across all registered currencies, expressed in
    /// `currency`. Every registered currency's rate must be fresh.
    pub fn total_issued(&self, currency: CurrencyKey) -> Result<Wad, EngineError> {
        let mut total = Wad::ZERO;
        for &key in self.registry.keys() {
            let supply = self
                .nomin(key)
                .map(|ledger| ledger.total_supply())
                .unwrap_or(Wad::ZERO);
            let value = self.converter().effective_value(key, supply, currency)?;
            total = total.checked_add(value)?;
        }
        Ok(total)
    }

    /// The account's share of the debt pool, expressed in `currency`.
    /// Zero for accounts with no issuance record — no rates required.
    pub fn debt_balance_of(
        &self,
        account: &AccountId,
        currency: CurrencyKey,
    ) -> Result<Wad, EngineError> {
        let ownership = self.accounting.ownership(account)?;
        if ownership.is_zero() {
            return Ok(Wad::ZERO);
        }
        let total = self.total_issued(currency)?;
        Ok(total.multiply_decimal(ownership)?)
    }

    /// The most debt an account could carry in `currency`, given its
    /// collateral balance and the issuance ratio. Zero for accounts that
    /// are not authorized issuers.
    pub fn max_issuable(
        &self,
        account: &AccountId,
        currency: CurrencyKey,
    ) -> Result<Wad, EngineError> {
        if !self.is_issuer(account) {
            return Ok(Wad::ZERO);
        }
        let collateral_value = self.converter().effective_value(
            self.collateral_key,
            self.collateral.balance_of(account),
            currency,
        )?;
        Ok(collateral_value.multiply_decimal(self.config.issuance_ratio())?)
    }

    /// How much more the account may issue in `currency`, floored at zero.
    pub fn remaining_issuable(
        &self,
        account: &AccountId,
        currency: CurrencyKey,
    ) -> Result<Wad, EngineError> {
        let max = self.max_issuable(account, currency)?;
        let debt = self.debt_balance_of(account, currency)?;
        Ok(max.saturating_sub(debt))
    }

    /// Collateral that must stay put to back the account's current debt.
    pub fn locked_collateral(&self, account: &AccountId) -> Result<Wad, EngineError> {
        let debt = self.debt_balance_of(account, self.reference_key)?;
        if debt.is_zero() {
            return Ok(Wad::ZERO);
        }
        let ratio = self.config.issuance_ratio();
        if ratio.is_zero() {
            // Debt exists but nothing may back it at ratio zero: the whole
            // balance stays locked.
            return Ok(self.collateral.balance_of(account));
        }
        let debt_in_collateral =
            self.converter()
                .effective_value(self.reference_key, debt, self.collateral_key)?;
        Ok(debt_in_collateral.divide_decimal(ratio)?)
    }

    /// Collateral free to transfer out: balance minus the locked portion,
    /// floored at zero.
    pub fn transferable_collateral(&self, account: &AccountId) -> Result<Wad, EngineError> {
        let balance = self.collateral.balance_of(account);
        let locked = self.locked_collateral(account)?;
        Ok(balance.saturating_sub(locked))
    }

    // --- Issuance and burning ---

    /// Issue `amount` of `currency` against the account's collateral.
    ///
    /// Issuing zero is a legal no-op: it re-anchors the account's record
    /// without changing any observable balance.
    pub fn issue(
        &mut self,
        account: &AccountId,
        currency: CurrencyKey,
        amount: Wad,
    ) -> Result<(), EngineError> {
        if !self.registry.contains(currency) {
            return Err(EngineError::UnknownCurrency(currency));
        }
        if !self.is_issuer(account) {
            return Err(EngineError::NotAuthorizedIssuer(account.clone()));
        }
        let remaining = self.remaining_issuable(account, currency)?;
        if amount > remaining {
            return Err(EngineError::ExceedsIssuableLimit {
                requested: amount,
                remaining,
            });
        }

        // Everything the mutation needs, gathered before any state changes.
        let issued_ref = self
            .converter()
            .effective_value(currency, amount, self.reference_key)?;
        let existing_debt = self.debt_balance_of(account, self.reference_key)?;
        let total_before = self.total_issued(self.reference_key)?;
        let minted_balance = self
            .nomin(currency)
            .ok_or(EngineError::UnknownCurrency(currency))?
            .balance_of(account)
            .checked_add(amount)?;

        self.accounting
            .record_issuance(account, issued_ref, existing_debt, total_before)?;
        self.nomin_ledger_mut(currency)?.mint(account, amount)?;
        info!(
            "issued {} {} to {} (balance now {})",
            amount, currency, account, minted_balance
        );
        Ok(())
    }

    /// Issue as much of `currency` as the account's collateral allows.
    pub fn issue_max(
        &mut self,
        account: &AccountId,
        currency: CurrencyKey,
    ) -> Result<Wad, EngineError> {
        let remaining = self.remaining_issuable(account, currency)?;
        self.issue(account, currency, remaining)?;
        Ok(remaining)
    }

    /// Burn up to `amount` of the account's `currency` debt, forgiving it.
    ///
    /// The amount is clamped to the account's actual debt — the one legal
    /// silent clamp in the system. The account must hold enough of the
    /// token to cover the clamped amount. Returns what was actually burned.
    pub fn burn(
        &mut self,
        account: &AccountId,
        currency: CurrencyKey,
        amount: Wad,
    ) -> Result<Wad, EngineError> {
        if !self.registry.contains(currency) {
            return Err(EngineError::UnknownCurrency(currency));
        }
        let debt = self.debt_balance_of(account, currency)?;
        if debt.is_zero() {
            return Err(EngineError::Issuance(IssuanceError::ExcessBurn));
        }
        let to_burn = amount.min(debt);

        let balance = self
            .nomin(currency)
            .ok_or(EngineError::UnknownCurrency(currency))?
            .balance_of(account);
        if to_burn > balance {
            return Err(EngineError::Token(TokenError::InsufficientBalance {
                account: account.clone(),
                required: to_burn,
                available: balance,
            }));
        }

        let burned_ref = self
            .converter()
            .effective_value(currency, to_burn, self.reference_key)?;
        let existing_debt = self.debt_balance_of(account, self.reference_key)?;
        let total_before = self.total_issued(self.reference_key)?;

        self.accounting
            .record_burn(account, burned_ref, existing_debt, total_before)?;
        self.nomin_ledger_mut(currency)?.burn(account, to_burn)?;
        info!("burned {} {} from {}", to_burn, currency, account);
        Ok(to_burn)
    }

    // --- Collateral movement ---

    /// Transfer collateral, honoring the debt-backing lock.
    pub fn transfer_collateral(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Wad,
    ) -> Result<(), EngineError> {
        self.check_unlocked(from, amount)?;
        self.collateral.transfer(from, to, amount)?;
        Ok(())
    }

    /// Transfer collateral on behalf of `from`, consuming `spender`'s
    /// allowance and honoring the debt-backing lock.
    pub fn transfer_collateral_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: Wad,
    ) -> Result<(), EngineError> {
        self.check_unlocked(from, amount)?;
        self.collateral.transfer_from(spender, from, to, amount)?;
        Ok(())
    }

    pub fn approve_collateral(&mut self, owner: &AccountId, spender: &AccountId, amount: Wad) {
        self.collateral.approve(owner, spender, amount);
    }

    /// Transfer a pegged token between accounts (no lock applies).
    pub fn transfer_nomin(
        &mut self,
        currency: CurrencyKey,
        from: &AccountId,
        to: &AccountId,
        amount: Wad,
    ) -> Result<(), EngineError> {
        self.nomin_ledger_mut(currency)?.transfer(from, to, amount)?;
        Ok(())
    }

    fn check_unlocked(&self, from: &AccountId, amount: Wad) -> Result<(), EngineError> {
        let transferable = self.transferable_collateral(from)?;
        if amount > transferable {
            return Err(EngineError::InsufficientUnlockedCollateral {
                requested: amount,
                transferable,
            });
        }
        Ok(())
    }

    fn nomin_ledger_mut(&mut self, key: CurrencyKey) -> Result<&mut TokenLedger, EngineError> {
        let address = self
            .registry
            .ledger_address(key)
            .ok_or(EngineError::UnknownCurrency(key))?;
        self.nomins
            .get_mut(&address)
            .ok_or(EngineError::UnknownCurrency(key))
    }
}
