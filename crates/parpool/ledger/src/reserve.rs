use parpool_types::{AccountId, Asset, AssetBook, Fraction};
use tracing::{debug, info, warn};

use crate::error::LedgerError;
use crate::venue::YieldVenue;

/// How a withdrawal will be sourced, decided before any state changes.
enum WithdrawalPlan {
    /// Idle reserve alone covers the request.
    FromIdle,
    /// Idle reserve pays down to the new threshold; the venue pays the rest
    /// straight to the caller.
    SplitWithVenue { from_idle: u128, from_venue: u128 },
    /// The venue replenishes the ledger first; the caller is then paid from
    /// idle reserve, which lands on the new threshold.
    ReplenishThenPay { pull: u128 },
}

/// The reserve accounting engine for the par-backed issued token.
///
/// Tracks outstanding issued supply and keeps the idle reserve near a
/// configured fraction of it, pushing the excess into an injected
/// [`YieldVenue`]. Backing above issued supply is yield, harvestable to the
/// configured receiver at any time.
///
/// State mutation always precedes external venue calls (burn before payment,
/// credit before rebalance), and failure paths are pre-validated so a failed
/// call leaves no partial effects.
#[derive(Debug, Clone)]
pub struct ReserveLedger {
    account: AccountId,
    owner: AccountId,
    pending_owner: Option<AccountId>,
    yield_receiver: AccountId,
    rebalance_threshold: Fraction,
    total_issued: u128,
    venue: Option<Box<dyn YieldVenue>>,
}

impl ReserveLedger {
    /// Create a ledger holding its reserve at `account`, administered by
    /// `owner`. Yield initially accrues to the owner; no venue is configured
    /// and the rebalance threshold starts at zero (everything is pushed once
    /// a venue exists).
    pub fn new(account: AccountId, owner: AccountId) -> Self {
        Self {
            account,
            yield_receiver: owner.clone(),
            owner,
            pending_owner: None,
            rebalance_threshold: Fraction::ZERO,
            total_issued: 0,
            venue: None,
        }
    }

    // ── Views ───────────────────────────────────────────────────────

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn pending_owner(&self) -> Option<&AccountId> {
        self.pending_owner.as_ref()
    }

    pub fn yield_receiver(&self) -> &AccountId {
        &self.yield_receiver
    }

    pub fn rebalance_threshold(&self) -> Fraction {
        self.rebalance_threshold
    }

    pub fn total_issued(&self) -> u128 {
        self.total_issued
    }

    pub fn has_venue(&self) -> bool {
        self.venue.is_some()
    }

    /// Native balance held directly by the ledger.
    pub fn idle_reserve(&self, book: &AssetBook) -> u128 {
        book.balance_of(&self.account, Asset::Native)
    }

    /// Native-equivalent value reported by the configured venue.
    pub fn venue_balance(&self, book: &AssetBook) -> u128 {
        self.venue
            .as_ref()
            .map(|venue| venue.balance_in_native(book))
            .unwrap_or(0)
    }

    /// Idle reserve plus venue balance.
    pub fn underlying_balance(&self, book: &AssetBook) -> u128 {
        self.idle_reserve(book)
            .saturating_add(self.venue_balance(book))
    }

    /// Instantaneous excess of total holdings over issued supply.
    pub fn yield_accumulated(&self, book: &AssetBook) -> u128 {
        self.underlying_balance(book)
            .saturating_sub(self.total_issued)
    }

    // ── Core operations ─────────────────────────────────────────────

    /// Deposit native (plus an optional wrapped-native amount, unwrapped
    /// first) and mint issued tokens one-to-one to the caller. Returns the
    /// minted amount.
    pub fn deposit(
        &mut self,
        book: &mut AssetBook,
        caller: &AccountId,
        native_amount: u128,
        wrapped_amount: u128,
    ) -> Result<u128, LedgerError> {
        let total = native_amount
            .checked_add(wrapped_amount)
            .ok_or(LedgerError::AmountOverflow)?;
        let issued_after = self
            .total_issued
            .checked_add(total)
            .ok_or(LedgerError::AmountOverflow)?;

        if wrapped_amount > 0 {
            book.unwrap_native(caller, wrapped_amount)?;
        }
        book.transfer(caller, &self.account, Asset::Native, total)?;
        book.credit(caller, Asset::Issued, total)?;
        self.total_issued = issued_after;

        info!(
            caller = %caller,
            native = native_amount,
            wrapped = wrapped_amount,
            total_issued = self.total_issued,
            "deposit minted issued tokens at par"
        );

        self.rebalance(book)?;
        Ok(total)
    }

    /// Push idle reserve above the threshold into the venue. Idempotent and
    /// permissionless; a no-op without a venue or while the venue unwinds.
    /// Returns the amount pushed.
    pub fn rebalance(&mut self, book: &mut AssetBook) -> Result<u128, LedgerError> {
        let Some(venue) = self.venue.as_mut() else {
            return Ok(0);
        };
        if venue.is_unwinding() {
            debug!("rebalance skipped: venue is unwinding");
            return Ok(0);
        }

        let threshold_amount = self.rebalance_threshold.of(self.total_issued);
        let idle = book.balance_of(&self.account, Asset::Native);
        if idle <= threshold_amount {
            return Ok(0);
        }

        let excess = idle - threshold_amount;
        venue.convert_to_yield_form(book, &self.account, excess)?;
        info!(
            pushed = excess,
            idle = threshold_amount,
            "excess idle reserve pushed to yield venue"
        );
        Ok(excess)
    }

    /// Burn `amount` issued from the caller and return native, sourcing it
    /// from idle reserve and the venue so that idle reserve lands on the
    /// threshold implied by the post-burn supply whenever the venue can
    /// cover it.
    pub fn withdraw(
        &mut self,
        book: &mut AssetBook,
        caller: &AccountId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        // Decide the full sourcing plan before any state changes, so a
        // failed withdrawal has no effect.
        let issued_after =
            self.total_issued
                .checked_sub(amount)
                .ok_or(LedgerError::InsufficientBacking {
                    requested: amount,
                    available: self.total_issued,
                })?;
        let idle = book.balance_of(&self.account, Asset::Native);
        let plan = if amount <= idle {
            WithdrawalPlan::FromIdle
        } else {
            let venue = self
                .venue
                .as_ref()
                .ok_or(LedgerError::InsufficientBacking {
                    requested: amount,
                    available: idle,
                })?;
            let new_threshold = self.rebalance_threshold.of(issued_after);
            let venue_balance = venue.balance_in_native(book);

            if new_threshold <= idle {
                let from_idle = idle - new_threshold;
                let from_venue = amount - from_idle;
                if venue_balance < from_venue {
                    return Err(LedgerError::InsufficientBacking {
                        requested: amount,
                        available: idle.saturating_add(venue_balance),
                    });
                }
                WithdrawalPlan::SplitWithVenue {
                    from_idle,
                    from_venue,
                }
            } else {
                // Withdraw the maximum the venue reports rather than
                // trusting the requested figure to the unit.
                let replenish = new_threshold - idle;
                let pull = amount
                    .checked_add(replenish)
                    .ok_or(LedgerError::AmountOverflow)?
                    .min(venue_balance);
                if idle.saturating_add(pull) < amount {
                    return Err(LedgerError::InsufficientBacking {
                        requested: amount,
                        available: idle.saturating_add(venue_balance),
                    });
                }
                WithdrawalPlan::ReplenishThenPay { pull }
            }
        };

        // Burn first: issued supply is already reduced for the remainder of
        // this operation, before any external payment happens.
        book.debit(caller, Asset::Issued, amount)?;
        self.total_issued = issued_after;

        match plan {
            WithdrawalPlan::FromIdle => {
                book.transfer(&self.account, caller, Asset::Native, amount)?;
            }
            WithdrawalPlan::SplitWithVenue {
                from_idle,
                from_venue,
            } => {
                if from_idle > 0 {
                    book.transfer(&self.account, caller, Asset::Native, from_idle)?;
                }
                let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
                venue.withdraw(book, from_venue, caller)?;
            }
            WithdrawalPlan::ReplenishThenPay { pull } => {
                let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
                venue.withdraw(book, pull, &self.account)?;
                book.transfer(&self.account, caller, Asset::Native, amount)?;
            }
        }

        info!(
            caller = %caller,
            amount,
            total_issued = self.total_issued,
            "withdrawal settled at par"
        );
        Ok(())
    }

    /// Pay the accumulated yield to the configured receiver, preferring the
    /// venue as the source and covering any shortfall from idle reserve.
    /// Returns the harvested amount; zero yield is a successful no-op.
    pub fn harvest(&mut self, book: &mut AssetBook) -> Result<u128, LedgerError> {
        let yield_amount = self.yield_accumulated(book);
        if yield_amount == 0 {
            debug!("harvest skipped: no yield accumulated");
            return Ok(0);
        }

        let receiver = self.yield_receiver.clone();
        let venue_balance = self.venue_balance(book);

        if venue_balance >= yield_amount {
            let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
            venue.withdraw(book, yield_amount, &receiver)?;
        } else {
            if venue_balance > 0 {
                let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
                venue.withdraw(book, venue_balance, &receiver)?;
            }
            let shortfall = yield_amount - venue_balance;
            book.transfer(&self.account, &receiver, Asset::Native, shortfall)?;
        }

        info!(
            harvested = yield_amount,
            receiver = %receiver,
            "yield harvested"
        );
        Ok(yield_amount)
    }

    // ── Administrative surface ──────────────────────────────────────

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), LedgerError> {
        if caller != &self.owner {
            warn!(caller = %caller, "rejected non-owner administrative call");
            return Err(LedgerError::NotOwner {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Set the fraction of issued supply kept as idle reserve. Values up to
    /// and including 100% are accepted.
    pub fn set_rebalance_threshold(
        &mut self,
        caller: &AccountId,
        threshold: Fraction,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if threshold > Fraction::ONE {
            return Err(LedgerError::ThresholdAboveOne {
                requested: threshold.scaled(),
            });
        }
        self.rebalance_threshold = threshold;
        info!(threshold = %threshold, "rebalance threshold updated");
        Ok(())
    }

    pub fn set_yield_receiver(
        &mut self,
        caller: &AccountId,
        receiver: AccountId,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if receiver.is_zero() {
            return Err(LedgerError::ZeroYieldReceiver);
        }
        info!(receiver = %receiver, "yield receiver updated");
        self.yield_receiver = receiver;
        Ok(())
    }

    /// Swap (or clear) the yield venue. Rejected while the current venue
    /// still reports a balance, which would otherwise orphan funds.
    pub fn change_venue(
        &mut self,
        caller: &AccountId,
        book: &AssetBook,
        venue: Option<Box<dyn YieldVenue>>,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        if let Some(current) = &self.venue {
            let balance = current.balance_in_native(book);
            if balance > 0 {
                return Err(LedgerError::VenueBalanceNonzero { balance });
            }
        }
        self.venue = venue;
        info!(configured = self.venue.is_some(), "yield venue changed");
        Ok(())
    }

    /// Escape hatch: move the entire idle reserve to the owner, bypassing
    /// all accounting checks. Returns the rescued amount.
    pub fn emergency_rescue(
        &mut self,
        caller: &AccountId,
        book: &mut AssetBook,
    ) -> Result<u128, LedgerError> {
        self.ensure_owner(caller)?;
        let idle = book.balance_of(&self.account, Asset::Native);
        if idle > 0 {
            book.transfer(&self.account, &self.owner, Asset::Native, idle)?;
        }
        warn!(rescued = idle, "emergency rescue drained idle reserve");
        Ok(idle)
    }

    /// Nominate a new owner. The handoff completes only when the nominee
    /// calls [`ReserveLedger::accept_ownership`].
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        nominee: AccountId,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        info!(nominee = %nominee, "ownership handoff opened");
        self.pending_owner = Some(nominee);
        Ok(())
    }

    pub fn accept_ownership(&mut self, caller: &AccountId) -> Result<(), LedgerError> {
        match &self.pending_owner {
            Some(nominee) if nominee == caller => {
                self.owner = caller.clone();
                self.pending_owner = None;
                info!(owner = %self.owner, "ownership handoff completed");
                Ok(())
            }
            _ => Err(LedgerError::NotPendingOwner {
                caller: caller.clone(),
            }),
        }
    }

    // ── Venue administrative passthroughs (gated on the ledger owner) ──

    pub fn set_venue_unwinding(
        &mut self,
        caller: &AccountId,
        unwinding: bool,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
        venue.set_unwinding(unwinding);
        info!(unwinding, "venue unwinding flag updated");
        Ok(())
    }

    /// Pull `amount` out of the venue's yield form back into idle reserve.
    pub fn unwind_venue(
        &mut self,
        caller: &AccountId,
        book: &mut AssetBook,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        let account = self.account.clone();
        let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
        venue.unwind_to_native(book, &account, amount)?;
        info!(amount, "venue holdings unwound to idle reserve");
        Ok(())
    }

    /// Venue escape hatch: drain everything the venue holds to the owner.
    pub fn rescue_venue(
        &mut self,
        caller: &AccountId,
        book: &mut AssetBook,
    ) -> Result<u128, LedgerError> {
        self.ensure_owner(caller)?;
        let owner = self.owner.clone();
        let venue = self.venue.as_mut().ok_or(LedgerError::NoVenueConfigured)?;
        let rescued = venue.rescue(book, &owner)?;
        warn!(rescued, "emergency rescue drained yield venue");
        Ok(rescued)
    }
}
