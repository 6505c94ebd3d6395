use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-width currency key naming a pegged asset or the collateral asset.
///
/// Keys are at most four ASCII bytes, zero-padded, and are `Copy` — they
/// are passed around by value throughout the engine. By convention pegged
/// currencies carry an `n` prefix (`nUSD`, `nAUD`, `nEUR`) and the
/// collateral asset is `HAV`.
///
/// # Examples
///
/// ```
/// use nomin_engine::core::currency::CurrencyKey;
///
/// let usd = CurrencyKey::new("nUSD");
/// let aud = CurrencyKey::new("nAUD");
/// assert_ne!(usd, aud);
/// assert_eq!(usd.as_str(), "nUSD");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct CurrencyKey([u8; 4]);

impl CurrencyKey {
    /// Create a new currency key.
    ///
    /// # Panics
    ///
    /// Panics if the key is empty, longer than four bytes, or not ASCII.
    pub fn new(key: impl AsRef<str>) -> Self {
        match Self::try_new(key.as_ref()) {
            Some(k) => k,
            None => panic!("currency key must be 1-4 ASCII bytes"),
        }
    }

    /// Fallible constructor used by deserialization.
    pub fn try_new(key: &str) -> Option<Self> {
        if key.is_empty() || key.len() > 4 || !key.is_ascii() || key.as_bytes().contains(&0) {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes[..key.len()].copy_from_slice(key.as_bytes());
        Some(Self(bytes))
    }

    pub fn as_str(&self) -> &str {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(4);
        // Constructors only admit ASCII, so this cannot fail.
        std::str::from_utf8(&self.0[..len]).unwrap_or("")
    }
}

impl fmt::Display for CurrencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for CurrencyKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<CurrencyKey> for String {
    fn from(key: CurrencyKey) -> Self {
        key.as_str().to_string()
    }
}

impl TryFrom<String> for CurrencyKey {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(&s).ok_or_else(|| format!("invalid currency key: {s:?}"))
    }
}
