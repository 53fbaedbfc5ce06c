use parpool_types::{AccountId, BookError};
use thiserror::Error;

/// Errors returned by reserve-ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("caller {caller} is not the ledger owner")]
    NotOwner { caller: AccountId },

    #[error("caller {caller} is not the pending owner")]
    NotPendingOwner { caller: AccountId },

    #[error("yield receiver must not be the zero account")]
    ZeroYieldReceiver,

    #[error("rebalance threshold {requested} exceeds 100%")]
    ThresholdAboveOne { requested: u128 },

    #[error("yield venue still holds {balance}; unwind it before changing venues")]
    VenueBalanceNonzero { balance: u128 },

    #[error("no yield venue configured")]
    NoVenueConfigured,

    #[error("insufficient backing for withdrawal: requested {requested}, available {available}")]
    InsufficientBacking { requested: u128, available: u128 },

    #[error("amount overflow")]
    AmountOverflow,

    #[error(transparent)]
    Book(#[from] BookError),
}
