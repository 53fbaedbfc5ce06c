use parpool_types::{Asset, BookError};
use parpool_ledger::LedgerError;
use thiserror::Error;

/// Errors returned by the settlement hook.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("pool pair must be (native, issued), got ({asset0}, {asset1})")]
    PairMismatch { asset0: Asset, asset1: Asset },

    #[error("pool fee must be zero, got {fee}")]
    NonzeroFee { fee: u32 },

    #[error("liquidity provisioning is not accepted on the conversion pair")]
    LiquidityNotAccepted,

    #[error("hook is already registered against a pool")]
    PoolAlreadyRegistered,

    #[error("no pool registered for this hook")]
    PoolNotRegistered,

    #[error("swap amount {amount} is outside the settleable range")]
    AmountOutOfRange { amount: i128 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Book(#[from] BookError),
}
