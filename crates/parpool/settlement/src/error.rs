use parpool_hook::VenueError;
use parpool_types::{AccountId, Asset, BookError};
use thiserror::Error;

/// Errors that abort a coordinated swap.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("callback invoked for opener {expected}, got {actual}")]
    CallbackIdentityMismatch {
        expected: AccountId,
        actual: AccountId,
    },

    #[error("stale pending delta {delta} on {asset} before the trade")]
    StalePendingDelta { asset: Asset, delta: i128 },

    #[error("input delta {delta} on {asset} fell below the requested {requested}")]
    InputDeltaBelowRequested {
        asset: Asset,
        delta: i128,
        requested: i128,
    },

    #[error("input delta {delta} on {asset} must not be positive for exact-output")]
    InputDeltaPositive { asset: Asset, delta: i128 },

    #[error("venue reported {reported} on {asset} but the observed delta is {observed}")]
    TradeDeltaMismatch {
        asset: Asset,
        reported: i128,
        observed: i128,
    },

    #[error("output delta {delta} on {asset} is negative")]
    OutputDeltaNegative { asset: Asset, delta: i128 },

    #[error("output delta {delta} on {asset} exceeds the requested {requested}")]
    OutputDeltaAboveRequested {
        asset: Asset,
        delta: i128,
        requested: i128,
    },

    #[error("venue closed the unlock context without invoking the callback")]
    CallbackNotInvoked,

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error(transparent)]
    Book(#[from] BookError),
}
