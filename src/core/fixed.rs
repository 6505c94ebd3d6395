use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors arising from fixed-point arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("fixed-point addition overflowed")]
    Overflow,
    #[error("fixed-point subtraction underflowed")]
    Underflow,
    #[error("fixed-point division by zero")]
    DivisionByZero,
}

/// An unsigned fixed-point number with 18 decimal places of precision,
/// stored as a scaled integer ("wad": 1.0 == 10^18).
///
/// All arithmetic is checked — overflow is an error, never a wrap — and
/// every division truncates toward zero. Products are computed through a
/// 256-bit intermediate so that `a * b / UNIT` never loses precision or
/// overflows before the rescale.
///
/// # Examples
///
/// ```
/// use nomin_engine::core::fixed::Wad;
///
/// let price: Wad = "0.5".parse().unwrap();
/// let amount = Wad::from_int(20);
/// assert_eq!(amount.multiply_decimal(price).unwrap(), Wad::from_int(10));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Wad(u128);

impl Wad {
    /// The scaling factor: one whole unit.
    pub const UNIT: u128 = 1_000_000_000_000_000_000;

    pub const ZERO: Wad = Wad(0);
    pub const ONE: Wad = Wad(Self::UNIT);

    /// Construct from a raw pre-scaled integer.
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Construct from a whole number of units.
    pub fn from_int(n: u64) -> Self {
        // u64::MAX * UNIT fits comfortably in a u128.
        Self(n as u128 * Self::UNIT)
    }

    /// The raw scaled-integer representation.
    pub const fn raw(self) -> u128 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Wad) -> Result<Wad, MathError> {
        self.0.checked_add(other.0).map(Wad).ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, other: Wad) -> Result<Wad, MathError> {
        self.0.checked_sub(other.0).map(Wad).ok_or(MathError::Underflow)
    }

    /// Subtraction floored at zero.
    pub fn saturating_sub(self, other: Wad) -> Wad {
        Wad(self.0.saturating_sub(other.0))
    }

    /// Fixed-point multiplication: `⌊self · other / UNIT⌋`.
    ///
    /// Multiplies first, then rescales, so no intermediate precision is lost.
    pub fn multiply_decimal(self, other: Wad) -> Result<Wad, MathError> {
        let product = U256::from(self.0) * U256::from(other.0);
        let scaled = product / U256::from(Self::UNIT);
        if scaled > U256::from(u128::MAX) {
            return Err(MathError::Overflow);
        }
        Ok(Wad(scaled.as_u128()))
    }

    /// Fixed-point division: `⌊self · UNIT / other⌋`, truncating toward zero.
    pub fn divide_decimal(self, other: Wad) -> Result<Wad, MathError> {
        if other.0 == 0 {
            return Err(MathError::DivisionByZero);
        }
        let scaled = U256::from(self.0) * U256::from(Self::UNIT) / U256::from(other.0);
        if scaled > U256::from(u128::MAX) {
            return Err(MathError::Overflow);
        }
        Ok(Wad(scaled.as_u128()))
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int = self.0 / Self::UNIT;
        let frac = self.0 % Self::UNIT;
        if frac == 0 {
            return write!(f, "{}", int);
        }
        let frac = format!("{:018}", frac);
        write!(f, "{}.{}", int, frac.trim_end_matches('0'))
    }
}

/// Error parsing a decimal string into a [`Wad`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid fixed-point literal: {0}")]
pub struct ParseWadError(String);

impl FromStr for Wad {
    type Err = ParseWadError;

    /// Parse a decimal literal with at most 18 fractional digits, e.g.
    /// `"1"`, `"0.5"`, `"1.25"`. Excess fractional digits are rejected
    /// rather than silently rounded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseWadError(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        if frac_part.len() > 18 {
            return Err(bad());
        }
        let int: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| bad())?
        };
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<18}", frac_part);
            padded.parse().map_err(|_| bad())?
        };
        int.checked_mul(Self::UNIT)
            .and_then(|scaled| scaled.checked_add(frac))
            .map(Wad)
            .ok_or_else(bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad(s: &str) -> Wad {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_int() {
        assert_eq!(Wad::from_int(1), Wad::ONE);
        assert_eq!(Wad::from_int(0), Wad::ZERO);
        assert_eq!(Wad::from_int(3).raw(), 3 * Wad::UNIT);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(wad("1"), Wad::ONE);
        assert_eq!(wad("0.5").raw(), Wad::UNIT / 2);
        assert_eq!(wad("1.25").to_string(), "1.25");
        assert_eq!(wad("10").to_string(), "10");
        assert_eq!(wad("0.000000000000000001").raw(), 1);
        assert!("".parse::<Wad>().is_err());
        assert!("1.2.3".parse::<Wad>().is_err());
        assert!("0.0000000000000000001".parse::<Wad>().is_err());
    }

    #[test]
    fn test_multiply_decimal() {
        assert_eq!(
            Wad::from_int(20).multiply_decimal(wad("0.5")).unwrap(),
            Wad::from_int(10)
        );
        assert_eq!(
            wad("1.25").multiply_decimal(Wad::from_int(2)).unwrap(),
            wad("2.5")
        );
        assert_eq!(Wad::ZERO.multiply_decimal(Wad::ONE).unwrap(), Wad::ZERO);
    }

    #[test]
    fn test_multiply_large_operands() {
        // Both operands far beyond what a raw u128 product could hold.
        let big = Wad::from_int(10_000_000_000_000);
        let product = big.multiply_decimal(big).unwrap();
        assert_eq!(product.raw() / Wad::UNIT, 10u128.pow(26));
    }

    #[test]
    fn test_divide_truncates_toward_zero() {
        // 1 / 3 = 0.333... truncated at 18 places.
        let third = Wad::ONE.divide_decimal(Wad::from_int(3)).unwrap();
        assert_eq!(third.raw(), 333_333_333_333_333_333);
        // 2 / 3 truncates too: the residue is dropped, not rounded up.
        let two_thirds = Wad::from_int(2).divide_decimal(Wad::from_int(3)).unwrap();
        assert_eq!(two_thirds.raw(), 666_666_666_666_666_666);
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            Wad::ONE.divide_decimal(Wad::ZERO),
            Err(MathError::DivisionByZero)
        );
    }

    #[test]
    fn test_checked_sub_underflow() {
        assert_eq!(
            Wad::from_int(1).checked_sub(Wad::from_int(2)),
            Err(MathError::Underflow)
        );
        assert_eq!(
            Wad::from_int(1).saturating_sub(Wad::from_int(2)),
            Wad::ZERO
        );
    }

    #[test]
    fn test_multiply_then_divide_preserves_precision() {
        // (10 * 0.1) / 0.5 must be computed as multiply-then-divide.
        let v = Wad::from_int(10)
            .multiply_decimal(wad("0.1"))
            .unwrap()
            .divide_decimal(wad("0.5"))
            .unwrap();
        assert_eq!(v, Wad::from_int(2));
    }

    #[test]
    fn test_ordering() {
        assert!(wad("0.5") < Wad::ONE);
        assert!(Wad::from_int(2) > wad("1.999999999999999999"));
    }
}
