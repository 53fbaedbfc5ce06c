use parpool_ledger::ReserveLedger;
use parpool_types::{AccountId, Asset, AssetBook, PoolKey, SwapIntent, TradeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::HookError;

/// Capability flags a venue reads at hook registration.
///
/// This hook declares interest in exactly four callbacks; everything else
/// stays with the venue's default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPermissions {
    pub before_initialize: bool,
    pub before_add_liquidity: bool,
    pub before_swap: bool,
    pub before_swap_returns_delta: bool,
}

/// The settlement hook: admits the single (native, issued) zero-fee pool,
/// blocks liquidity provisioning, and reroutes every swap through the
/// reserve ledger's one-to-one conversion.
#[derive(Debug, Clone)]
pub struct ConversionHook {
    account: AccountId,
    ledger: ReserveLedger,
    pool: Option<PoolKey>,
}

impl ConversionHook {
    pub fn new(account: AccountId, ledger: ReserveLedger) -> Self {
        Self {
            account,
            ledger,
            pool: None,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn ledger(&self) -> &ReserveLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ReserveLedger {
        &mut self.ledger
    }

    pub fn registered_pool(&self) -> Option<&PoolKey> {
        self.pool.as_ref()
    }

    pub fn permissions(&self) -> HookPermissions {
        HookPermissions {
            before_initialize: true,
            before_add_liquidity: true,
            before_swap: true,
            before_swap_returns_delta: true,
        }
    }

    /// Pair/fee admission, run once at pool initialization.
    ///
    /// Any fee would leak value against the one-to-one guarantee, so only
    /// exactly zero is admitted, and only for the fixed (native, issued)
    /// pair order.
    pub fn before_initialize(&mut self, key: &PoolKey) -> Result<(), HookError> {
        if self.pool.is_some() {
            return Err(HookError::PoolAlreadyRegistered);
        }
        if key.asset0 != Asset::Native || key.asset1 != Asset::Issued {
            warn!(asset0 = %key.asset0, asset1 = %key.asset1, "rejected pool pair");
            return Err(HookError::PairMismatch {
                asset0: key.asset0,
                asset1: key.asset1,
            });
        }
        if key.fee != 0 {
            warn!(fee = key.fee, "rejected nonzero pool fee");
            return Err(HookError::NonzeroFee { fee: key.fee });
        }
        self.pool = Some(*key);
        info!(granularity = key.granularity, "conversion pool admitted");
        Ok(())
    }

    /// Liquidity admission: unconditionally rejected.
    pub fn before_add_liquidity(
        &self,
        _provider: &AccountId,
        _amount: u128,
    ) -> Result<(), HookError> {
        Err(HookError::LiquidityNotAccepted)
    }

    /// Swap interception, run before the venue applies its own pricing.
    ///
    /// Pulls the input out of `escrow`, converts through the ledger, pushes
    /// the output back, and returns the overriding trade delta in swapper
    /// perspective: (−amount, +amount) on (input, output). The venue adopts
    /// it verbatim: the trade is already fully settled, so its own curve
    /// contributes nothing.
    pub fn before_swap(
        &mut self,
        book: &mut AssetBook,
        escrow: &AccountId,
        key: &PoolKey,
        intent: &SwapIntent,
    ) -> Result<TradeDelta, HookError> {
        match self.pool {
            Some(registered) if registered == *key => {}
            _ => return Err(HookError::PoolNotRegistered),
        }

        let magnitude = intent.magnitude();
        if magnitude == 0 || magnitude > i128::MAX as u128 {
            return Err(HookError::AmountOutOfRange {
                amount: intent.amount,
            });
        }

        let input = intent.direction.input(key);
        let output = intent.direction.output(key);

        book.transfer(escrow, &self.account, input, magnitude)?;
        match input {
            Asset::Native => {
                self.ledger.deposit(book, &self.account, magnitude, 0)?;
            }
            Asset::Issued => {
                self.ledger.withdraw(book, &self.account, magnitude)?;
            }
            Asset::Wrapped => {
                return Err(HookError::PairMismatch {
                    asset0: key.asset0,
                    asset1: key.asset1,
                })
            }
        }
        book.transfer(&self.account, escrow, output, magnitude)?;

        let signed = magnitude as i128;
        let delta = match input {
            Asset::Native => TradeDelta::new(-signed, signed),
            _ => TradeDelta::new(signed, -signed),
        };
        debug!(
            input = %input,
            output = %output,
            magnitude,
            "swap rerouted through the reserve ledger"
        );
        Ok(delta)
    }
}
