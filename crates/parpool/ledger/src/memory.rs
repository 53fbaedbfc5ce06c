use parpool_types::{AccountId, Asset, AssetBook};
use tracing::debug;

use crate::error::LedgerError;
use crate::venue::YieldVenue;

/// In-memory yield venue used for tests, demos, and local embedding.
///
/// Holds all value as native balance at its own book account; external
/// appreciation is simulated by crediting that account directly.
#[derive(Debug, Clone)]
pub struct InMemoryYieldVenue {
    account: AccountId,
    unwinding: bool,
}

impl InMemoryYieldVenue {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            unwinding: false,
        }
    }
}

impl YieldVenue for InMemoryYieldVenue {
    fn account(&self) -> &AccountId {
        &self.account
    }

    fn convert_to_yield_form(
        &mut self,
        book: &mut AssetBook,
        from: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        book.transfer(from, &self.account, Asset::Native, amount)?;
        debug!(amount, venue = %self.account, "native converted to yield form");
        Ok(())
    }

    fn withdraw(
        &mut self,
        book: &mut AssetBook,
        amount: u128,
        recipient: &AccountId,
    ) -> Result<(), LedgerError> {
        book.transfer(&self.account, recipient, Asset::Native, amount)?;
        debug!(amount, recipient = %recipient, "withdrawn from yield venue");
        Ok(())
    }

    fn balance_in_native(&self, book: &AssetBook) -> u128 {
        book.balance_of(&self.account, Asset::Native)
    }

    fn is_unwinding(&self) -> bool {
        self.unwinding
    }

    fn set_unwinding(&mut self, unwinding: bool) {
        self.unwinding = unwinding;
    }

    fn unwind_to_native(
        &mut self,
        book: &mut AssetBook,
        recipient: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        book.transfer(&self.account, recipient, Asset::Native, amount)?;
        Ok(())
    }

    fn rescue(&mut self, book: &mut AssetBook, recipient: &AccountId) -> Result<u128, LedgerError> {
        let balance = book.balance_of(&self.account, Asset::Native);
        if balance > 0 {
            book.transfer(&self.account, recipient, Asset::Native, balance)?;
        }
        Ok(balance)
    }

    fn clone_box(&self) -> Box<dyn YieldVenue> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue_account() -> AccountId {
        AccountId::new("venue")
    }

    #[test]
    fn deposits_and_withdrawals_move_native() {
        let mut book = AssetBook::new();
        let ledger = AccountId::new("ledger");
        book.credit(&ledger, Asset::Native, 1_000).unwrap();

        let mut venue = InMemoryYieldVenue::new(venue_account());
        venue
            .convert_to_yield_form(&mut book, &ledger, 600)
            .unwrap();
        assert_eq!(venue.balance_in_native(&book), 600);

        venue.withdraw(&mut book, 250, &ledger).unwrap();
        assert_eq!(venue.balance_in_native(&book), 350);
        assert_eq!(book.balance_of(&ledger, Asset::Native), 650);
    }

    #[test]
    fn rescue_drains_the_venue() {
        let mut book = AssetBook::new();
        let owner = AccountId::new("owner");
        book.credit(&venue_account(), Asset::Native, 420).unwrap();

        let mut venue = InMemoryYieldVenue::new(venue_account());
        let drained = venue.rescue(&mut book, &owner).unwrap();
        assert_eq!(drained, 420);
        assert_eq!(venue.balance_in_native(&book), 0);
        assert_eq!(book.balance_of(&owner, Asset::Native), 420);
    }

    #[test]
    fn unwinding_flag_round_trips() {
        let mut venue = InMemoryYieldVenue::new(venue_account());
        assert!(!venue.is_unwinding());
        venue.set_unwinding(true);
        assert!(venue.is_unwinding());
    }
}
