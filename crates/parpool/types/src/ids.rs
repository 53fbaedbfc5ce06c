use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a balance-holding party: users, the ledger, the hook, the
/// venue escrow, and the yield venue all hold balances under an `AccountId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved zero account. Transfers to it burn value irrecoverably,
    /// so configuration surfaces reject it as a recipient.
    pub fn zero() -> Self {
        Self(String::new())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "<zero>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_account_is_recognized() {
        assert!(AccountId::zero().is_zero());
        assert!(!AccountId::new("treasury").is_zero());
    }

    #[test]
    fn display_marks_the_zero_account() {
        assert_eq!(AccountId::zero().to_string(), "<zero>");
        assert_eq!(AccountId::new("alice").to_string(), "alice");
    }

    #[test]
    fn round_trips_through_serde() {
        let id = AccountId::new("escrow");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(serde_json::from_str::<AccountId>(&json).unwrap(), id);
    }
}
