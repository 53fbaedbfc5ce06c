//! Core type definitions for the parpool workspace.
//!
//! This crate provides the shared substrate the ledger, hook, and settlement
//! crates agree on: account identities, the asset enumeration, the balance
//! book, scaled fractions, and swap intent/delta types.

#![deny(unsafe_code)]

pub mod asset;
pub mod book;
pub mod fraction;
pub mod ids;
pub mod swap;

// Re-export primary types at crate root for ergonomic use.
pub use asset::Asset;
pub use book::{AssetBook, BookError};
pub use fraction::Fraction;
pub use ids::AccountId;
pub use swap::{PoolKey, SwapDirection, SwapIntent, TradeDelta};

#[cfg(test)]
mod tests {
    use super::{AccountId, Asset};

    #[test]
    fn primary_types_are_available() {
        let account = AccountId::new("alice");
        assert!(!account.is_zero());
        assert_ne!(Asset::Native, Asset::Issued);
    }
}
