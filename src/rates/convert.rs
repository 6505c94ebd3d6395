use crate::core::currency::CurrencyKey;
use crate::core::fixed::Wad;
use crate::rates::oracle::{ExchangeRates, RateError};

/// Converts amounts between currencies through their reference-unit rates.
///
/// A conversion reads both rates at point of use and rejects the whole
/// operation if either is stale or was never published; rates are never
/// cached across a call boundary. Conversion is a pure function of oracle
/// state — no side effects.
///
/// # Examples
///
/// ```
/// use nomin_engine::core::currency::CurrencyKey;
/// use nomin_engine::core::fixed::Wad;
/// use nomin_engine::rates::convert::RateConverter;
/// use nomin_engine::rates::oracle::ExchangeRates;
/// use chrono::Utc;
///
/// let nusd = CurrencyKey::new("nUSD");
/// let naud = CurrencyKey::new("nAUD");
///
/// let mut rates = ExchangeRates::new();
/// rates.update_rates(&[(nusd, Wad::ONE), (naud, "0.5".parse().unwrap())], Utc::now());
///
/// // 1 nUSD is worth 2 nAUD.
/// let converter = RateConverter::new(&rates);
/// let value = converter.effective_value(nusd, Wad::from_int(1), naud).unwrap();
/// assert_eq!(value, Wad::from_int(2));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RateConverter<'a> {
    rates: &'a ExchangeRates,
}

impl<'a> RateConverter<'a> {
    pub fn new(rates: &'a ExchangeRates) -> Self {
        Self { rates }
    }

    /// The value of `amount` of `from` expressed in `to`.
    ///
    /// Computed as `amount * rate(from) / rate(to)` with the multiplication
    /// performed first to preserve precision. Both rates must be fresh,
    /// even when `from == to`.
    pub fn effective_value(
        &self,
        from: CurrencyKey,
        amount: Wad,
        to: CurrencyKey,
    ) -> Result<Wad, RateError> {
        let from_rate = self.rates.fresh_rate(from)?;
        let to_rate = self.rates.fresh_rate(to)?;
        if from == to {
            return Ok(amount);
        }
        Ok(amount.multiply_decimal(from_rate)?.divide_decimal(to_rate)?)
    }
}
