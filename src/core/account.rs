use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account participating in the system.
///
/// An account can issue pegged tokens against its collateral balance,
/// hold token balances, and receive transfers. Identifiers are opaque
/// strings; tests and the demo use short labels like `"alice"`.
///
/// # Examples
///
/// ```
/// use nomin_engine::core::account::AccountId;
///
/// let alice = AccountId::new("alice");
/// let bob = AccountId::new("bob");
/// assert_ne!(alice, bob);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_equality() {
        let a = AccountId::new("alice");
        let b = AccountId::new("alice");
        let c = AccountId::new("bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_account_display() {
        let a = AccountId::new("treasury");
        assert_eq!(format!("{}", a), "treasury");
    }
}
