use std::fmt;

use parpool_types::{AccountId, AssetBook};

use crate::error::LedgerError;

/// External yield venue boundary, consumed by the reserve ledger.
///
/// The venue is an opaque balance holder: it accepts native deposits,
/// returns native on demand, and reports a current value. Implementations
/// are injected into the ledger and swappable at runtime, subject to the
/// empty-balance precondition enforced by the ledger itself.
///
/// All monetary methods are invoked by the ledger only; the venue's own
/// administrative surface (`set_unwinding`, `unwind_to_native`, `rescue`)
/// is reachable through the ledger's owner-gated passthroughs.
pub trait YieldVenue: fmt::Debug {
    /// The venue's balance-holding account.
    fn account(&self) -> &AccountId;

    /// Deposit `amount` native from `from` into yield-bearing form.
    fn convert_to_yield_form(
        &mut self,
        book: &mut AssetBook,
        from: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Withdraw exactly `amount` of native-equivalent value to `recipient`.
    fn withdraw(
        &mut self,
        book: &mut AssetBook,
        amount: u128,
        recipient: &AccountId,
    ) -> Result<(), LedgerError>;

    /// Current native-equivalent value held by the venue.
    fn balance_in_native(&self, book: &AssetBook) -> u128;

    /// Transitional flag: while true, rebalance pushes are suppressed.
    fn is_unwinding(&self) -> bool;

    fn set_unwinding(&mut self, unwinding: bool);

    /// Convert `amount` of invested value back to native form at `recipient`.
    fn unwind_to_native(
        &mut self,
        book: &mut AssetBook,
        recipient: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError>;

    /// Escape hatch: move everything the venue holds to `recipient`.
    fn rescue(&mut self, book: &mut AssetBook, recipient: &AccountId) -> Result<u128, LedgerError>;

    /// Clone into a boxed trait object, so ledger snapshots stay plain
    /// `Clone` despite the injected venue.
    fn clone_box(&self) -> Box<dyn YieldVenue>;
}

impl Clone for Box<dyn YieldVenue> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
