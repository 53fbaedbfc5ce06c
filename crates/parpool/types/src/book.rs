use std::collections::HashMap;

use thiserror::Error;

use crate::asset::Asset;
use crate::ids::AccountId;

/// Errors raised by balance-book primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("insufficient {asset} balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        asset: Asset,
        required: u128,
        available: u128,
    },

    #[error("balance overflow crediting {amount} {asset} to {account}")]
    Overflow {
        account: AccountId,
        asset: Asset,
        amount: u128,
    },
}

/// In-memory balance table standing in for the asset substrate underneath
/// every component: one `u128` balance per (account, asset).
///
/// All arithmetic is exact and checked; a failed operation leaves the book
/// untouched. Missing entries read as zero.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssetBook {
    balances: HashMap<(AccountId, Asset), u128>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    pub fn balance_of(&self, account: &AccountId, asset: Asset) -> u128 {
        self.balances
            .get(&(account.clone(), asset))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amount` of `asset` at `account` out of nothing.
    ///
    /// Used for genesis seeding, issued-token minting by the ledger, and
    /// simulating external venue appreciation in tests.
    pub fn credit(
        &mut self,
        account: &AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), BookError> {
        let current = self.balance_of(account, asset);
        let updated = current.checked_add(amount).ok_or(BookError::Overflow {
            account: account.clone(),
            asset,
            amount,
        })?;
        self.balances.insert((account.clone(), asset), updated);
        Ok(())
    }

    /// Destroy `amount` of `asset` held by `account`.
    pub fn debit(
        &mut self,
        account: &AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), BookError> {
        let current = self.balance_of(account, asset);
        let updated = current
            .checked_sub(amount)
            .ok_or(BookError::InsufficientBalance {
                account: account.clone(),
                asset,
                required: amount,
                available: current,
            })?;
        self.balances.insert((account.clone(), asset), updated);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), BookError> {
        if from == to {
            // Self-transfers only need the balance to exist.
            let available = self.balance_of(from, asset);
            if available < amount {
                return Err(BookError::InsufficientBalance {
                    account: from.clone(),
                    asset,
                    required: amount,
                    available,
                });
            }
            return Ok(());
        }

        // Validate both sides before mutating either.
        let from_balance = self.balance_of(from, asset);
        if from_balance < amount {
            return Err(BookError::InsufficientBalance {
                account: from.clone(),
                asset,
                required: amount,
                available: from_balance,
            });
        }
        let to_balance = self.balance_of(to, asset);
        let to_updated = to_balance.checked_add(amount).ok_or(BookError::Overflow {
            account: to.clone(),
            asset,
            amount,
        })?;

        self.balances
            .insert((from.clone(), asset), from_balance - amount);
        self.balances.insert((to.clone(), asset), to_updated);
        Ok(())
    }

    /// Convert `amount` of the wrapped representation held by `account` into
    /// native form, one-to-one.
    pub fn unwrap_native(&mut self, account: &AccountId, amount: u128) -> Result<(), BookError> {
        self.debit(account, Asset::Wrapped, amount)?;
        self.credit(account, Asset::Native, amount)
    }
}
