use crate::core::currency::CurrencyKey;
use crate::core::fixed::{MathError, Wad};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors arising from rate lookups and conversions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    /// The rate exists but was last published longer ago than the stale period.
    #[error("exchange rate for {0} is stale")]
    StaleRate(CurrencyKey),
    /// No rate has ever been published for this key.
    #[error("no exchange rate published for {0}")]
    UnconvertibleCurrency(CurrencyKey),
    #[error(transparent)]
    Math(#[from] MathError),
}

/// A published exchange rate and when it was last updated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateEntry {
    /// Value of one unit of the currency, expressed in the reference unit.
    pub rate: Wad,
    pub last_updated: DateTime<Utc>,
}

/// Oracle-owned exchange rate state.
///
/// Each currency key maps to its most recent rate against the reference
/// unit plus the timestamp of that update. The oracle is the only writer;
/// the engine reads rates and must treat anything older than the stale
/// period as unusable. A zero rate is publishable — it is distinguished
/// from a key that has never had a rate at all.
///
/// # Examples
///
/// ```
/// use nomin_engine::core::currency::CurrencyKey;
/// use nomin_engine::core::fixed::Wad;
/// use nomin_engine::rates::oracle::ExchangeRates;
/// use chrono::Utc;
///
/// let mut rates = ExchangeRates::new();
/// rates.update_rates(&[(CurrencyKey::new("nUSD"), Wad::ONE)], Utc::now());
/// assert_eq!(rates.rate_for_currency(CurrencyKey::new("nUSD")), Wad::ONE);
/// ```
#[derive(Debug, Clone)]
pub struct ExchangeRates {
    rates: HashMap<CurrencyKey, RateEntry>,
    stale_period: Duration,
}

impl ExchangeRates {
    /// Default staleness window: three hours.
    pub fn new() -> Self {
        Self::with_stale_period(Duration::hours(3))
    }

    pub fn with_stale_period(stale_period: Duration) -> Self {
        Self {
            rates: HashMap::new(),
            stale_period,
        }
    }

    /// Publish a batch of rates, all stamped with the same update time.
    pub fn update_rates(&mut self, updates: &[(CurrencyKey, Wad)], timestamp: DateTime<Utc>) {
        for &(key, rate) in updates {
            debug!("rate update: {} = {} @ {}", key, rate, timestamp);
            self.rates.insert(
                key,
                RateEntry {
                    rate,
                    last_updated: timestamp,
                },
            );
        }
    }

    /// The latest rate for a currency, zero if none was ever published.
    pub fn rate_for_currency(&self, key: CurrencyKey) -> Wad {
        self.rates.get(&key).map(|e| e.rate).unwrap_or(Wad::ZERO)
    }

    pub fn last_update_time(&self, key: CurrencyKey) -> Option<DateTime<Utc>> {
        self.rates.get(&key).map(|e| e.last_updated)
    }

    pub fn rate_stale_period(&self) -> Duration {
        self.stale_period
    }

    pub fn set_rate_stale_period(&mut self, period: Duration) {
        self.stale_period = period;
    }

    /// Whether a rate is too old to use. A never-published rate is stale.
    pub fn rate_is_stale(&self, key: CurrencyKey) -> bool {
        match self.rates.get(&key) {
            Some(entry) => Utc::now().signed_duration_since(entry.last_updated) > self.stale_period,
            None => true,
        }
    }

    /// Fetch a rate, distinguishing missing keys from stale ones.
    pub fn fresh_rate(&self, key: CurrencyKey) -> Result<Wad, RateError> {
        let entry = self
            .rates
            .get(&key)
            .ok_or(RateError::UnconvertibleCurrency(key))?;
        if Utc::now().signed_duration_since(entry.last_updated) > self.stale_period {
            return Err(RateError::StaleRate(key));
        }
        Ok(entry.rate)
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> CurrencyKey {
        CurrencyKey::new(s)
    }

    #[test]
    fn test_update_and_read_rates() {
        let mut rates = ExchangeRates::new();
        let now = Utc::now();
        rates.update_rates(
            &[
                (key("nUSD"), Wad::ONE),
                (key("nAUD"), "0.5".parse().unwrap()),
            ],
            now,
        );

        assert_eq!(rates.rate_for_currency(key("nUSD")), Wad::ONE);
        assert_eq!(rates.last_update_time(key("nAUD")), Some(now));
        assert_eq!(rates.rate_for_currency(key("nXYZ")), Wad::ZERO);
    }

    #[test]
    fn test_unpublished_rate_is_stale() {
        let rates = ExchangeRates::new();
        assert!(rates.rate_is_stale(key("nUSD")));
        assert_eq!(
            rates.fresh_rate(key("nUSD")),
            Err(RateError::UnconvertibleCurrency(key("nUSD")))
        );
    }

    #[test]
    fn test_rate_goes_stale_after_period() {
        let mut rates = ExchangeRates::new();
        let old = Utc::now() - Duration::hours(4);
        rates.update_rates(&[(key("nUSD"), Wad::ONE)], old);

        assert!(rates.rate_is_stale(key("nUSD")));
        assert_eq!(
            rates.fresh_rate(key("nUSD")),
            Err(RateError::StaleRate(key("nUSD")))
        );
    }

    #[test]
    fn test_republishing_clears_staleness() {
        let mut rates = ExchangeRates::new();
        rates.update_rates(&[(key("nUSD"), Wad::ONE)], Utc::now() - Duration::hours(4));
        assert!(rates.rate_is_stale(key("nUSD")));

        rates.update_rates(&[(key("nUSD"), Wad::ONE)], Utc::now());
        assert!(!rates.rate_is_stale(key("nUSD")));
        assert_eq!(rates.fresh_rate(key("nUSD")), Ok(Wad::ONE));
    }

    #[test]
    fn test_zero_rate_is_publishable() {
        let mut rates = ExchangeRates::new();
        rates.update_rates(&[(key("nXYZ"), Wad::ZERO)], Utc::now());
        assert_eq!(rates.fresh_rate(key("nXYZ")), Ok(Wad::ZERO));
    }
}
