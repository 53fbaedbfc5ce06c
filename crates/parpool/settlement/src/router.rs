use parpool_hook::{TradingVenue, UnlockCallback, UnlockPayload};
use parpool_types::{
    AccountId, Asset, AssetBook, PoolKey, SwapDirection, SwapIntent, TradeDelta,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SettlementError;

/// Per-request lifecycle of a coordinated swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementState {
    Settled,
    Aborted,
}

/// Outcome of a settled swap: the context that carried it and the final
/// observed deltas for both pair assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub context_id: Uuid,
    pub state: SettlementState,
    pub requester: AccountId,
    pub delta: TradeDelta,
}

/// The atomic swap coordinator.
///
/// Opens the venue's unlock context, executes the trade inside the single
/// registered callback, verifies the observed deltas for the requested
/// direction and amount-sign case, then settles debts and claims on behalf
/// of the original requester. Any failure aborts the whole unit of work with
/// no partial effects; the venue restores its snapshot.
#[derive(Debug, Clone)]
pub struct SwapRouter {
    account: AccountId,
    outcome: Option<TradeDelta>,
}

impl SwapRouter {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            outcome: None,
        }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Coordinate one swap end to end. Returns the settlement report on
    /// success; on any error the venue has rolled the window back and the
    /// request had no effect.
    pub fn swap<V: TradingVenue>(
        &mut self,
        venue: &mut V,
        book: &mut AssetBook,
        key: PoolKey,
        intent: SwapIntent,
        requester: AccountId,
        referrer: Option<AccountId>,
    ) -> Result<SettlementReport, SettlementError> {
        let context_id = Uuid::new_v4();
        let payload = UnlockPayload {
            context_id,
            opener: self.account.clone(),
            requester: requester.clone(),
            referrer,
            key,
            intent,
        };

        self.outcome = None;
        match venue.unlock(book, &mut *self, payload) {
            Ok(()) => {
                let delta = self.outcome.take().ok_or(SettlementError::CallbackNotInvoked)?;
                info!(
                    context = %context_id,
                    requester = %requester,
                    amount0 = delta.amount0,
                    amount1 = delta.amount1,
                    "swap settled"
                );
                Ok(SettlementReport {
                    context_id,
                    state: SettlementState::Settled,
                    requester,
                    delta,
                })
            }
            Err(err) => {
                warn!(
                    context = %context_id,
                    requester = %requester,
                    error = %err,
                    "swap aborted"
                );
                Err(err)
            }
        }
    }
}

impl UnlockCallback for SwapRouter {
    type Error = SettlementError;

    fn on_unlock<V: TradingVenue>(
        &mut self,
        venue: &mut V,
        book: &mut AssetBook,
        payload: &UnlockPayload,
    ) -> Result<(), SettlementError> {
        // Only the party that opened the context may be called back.
        if payload.opener != self.account {
            return Err(SettlementError::CallbackIdentityMismatch {
                expected: self.account.clone(),
                actual: payload.opener.clone(),
            });
        }

        let key = payload.key;

        // No leftover claims from a prior operation may leak in.
        for asset in [key.asset0, key.asset1] {
            let delta = venue.pending_delta(&self.account, asset);
            if delta != 0 {
                return Err(SettlementError::StalePendingDelta { asset, delta });
            }
        }

        let trade = venue.swap(book, &self.account, payload.intent)?;
        let delta0 = venue.pending_delta(&self.account, key.asset0);
        let delta1 = venue.pending_delta(&self.account, key.asset1);
        debug!(delta0, delta1, "post-trade deltas sampled");

        verify_deltas(payload.intent, &key, trade, delta0, delta1)?;

        // Pay debts in first, then claim credits out, both on behalf of the
        // original requester.
        for (asset, delta) in [(key.asset0, delta0), (key.asset1, delta1)] {
            if delta < 0 {
                venue.settle_from(
                    book,
                    &self.account,
                    &payload.requester,
                    asset,
                    delta.unsigned_abs(),
                )?;
            }
        }
        for (asset, delta) in [(key.asset0, delta0), (key.asset1, delta1)] {
            if delta > 0 {
                venue.take(
                    book,
                    &self.account,
                    asset,
                    &payload.requester,
                    delta.unsigned_abs(),
                )?;
            }
        }

        // Sweep any native transiently stranded with the coordinator.
        let leftover = book.balance_of(&self.account, Asset::Native);
        if leftover > 0 {
            book.transfer(&self.account, &payload.requester, Asset::Native, leftover)?;
        }

        self.outcome = Some(TradeDelta::new(delta0, delta1));
        Ok(())
    }
}

/// The four direction × amount-sign verification cases, all checked before
/// any payment is made.
fn verify_deltas(
    intent: SwapIntent,
    key: &PoolKey,
    trade: TradeDelta,
    delta0: i128,
    delta1: i128,
) -> Result<(), SettlementError> {
    let requested = intent.amount;
    match intent.direction {
        SwapDirection::ZeroForOne => {
            if intent.is_exact_input() {
                if delta0 < requested {
                    return Err(SettlementError::InputDeltaBelowRequested {
                        asset: key.asset0,
                        delta: delta0,
                        requested,
                    });
                }
                if trade.amount0 != delta0 {
                    return Err(SettlementError::TradeDeltaMismatch {
                        asset: key.asset0,
                        reported: trade.amount0,
                        observed: delta0,
                    });
                }
                if delta1 < 0 {
                    return Err(SettlementError::OutputDeltaNegative {
                        asset: key.asset1,
                        delta: delta1,
                    });
                }
            } else {
                if delta0 > 0 {
                    return Err(SettlementError::InputDeltaPositive {
                        asset: key.asset0,
                        delta: delta0,
                    });
                }
                if trade.amount1 != delta1 {
                    return Err(SettlementError::TradeDeltaMismatch {
                        asset: key.asset1,
                        reported: trade.amount1,
                        observed: delta1,
                    });
                }
                if delta1 > requested {
                    return Err(SettlementError::OutputDeltaAboveRequested {
                        asset: key.asset1,
                        delta: delta1,
                        requested,
                    });
                }
            }
        }
        SwapDirection::OneForZero => {
            if intent.is_exact_input() {
                if delta1 < requested {
                    return Err(SettlementError::InputDeltaBelowRequested {
                        asset: key.asset1,
                        delta: delta1,
                        requested,
                    });
                }
                if trade.amount1 != delta1 {
                    return Err(SettlementError::TradeDeltaMismatch {
                        asset: key.asset1,
                        reported: trade.amount1,
                        observed: delta1,
                    });
                }
                if delta0 < 0 {
                    return Err(SettlementError::OutputDeltaNegative {
                        asset: key.asset0,
                        delta: delta0,
                    });
                }
            } else {
                if delta1 > 0 {
                    return Err(SettlementError::InputDeltaPositive {
                        asset: key.asset1,
                        delta: delta1,
                    });
                }
                if trade.amount0 != delta0 {
                    return Err(SettlementError::TradeDeltaMismatch {
                        asset: key.asset0,
                        reported: trade.amount0,
                        observed: delta0,
                    });
                }
                if delta0 > requested {
                    return Err(SettlementError::OutputDeltaAboveRequested {
                        asset: key.asset0,
                        delta: delta0,
                        requested,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> PoolKey {
        PoolKey::conversion_pair(1)
    }

    #[test]
    fn exact_input_zero_for_one_accepts_matching_deltas() {
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(-100, 100);
        assert!(verify_deltas(intent, &key(), trade, -100, 100).is_ok());
    }

    #[test]
    fn exact_input_rejects_overspending_the_input() {
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(-101, 100);
        assert!(matches!(
            verify_deltas(intent, &key(), trade, -101, 100),
            Err(SettlementError::InputDeltaBelowRequested { .. })
        ));
    }

    #[test]
    fn exact_input_rejects_a_trade_delta_mismatch() {
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(-99, 100);
        assert!(matches!(
            verify_deltas(intent, &key(), trade, -100, 100),
            Err(SettlementError::TradeDeltaMismatch { .. })
        ));
    }

    #[test]
    fn exact_input_rejects_a_negative_output() {
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(-100, -1);
        assert!(matches!(
            verify_deltas(intent, &key(), trade, -100, -1),
            Err(SettlementError::OutputDeltaNegative { .. })
        ));
    }

    #[test]
    fn exact_output_zero_for_one_accepts_matching_deltas() {
        let intent = SwapIntent::exact_output(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(-100, 100);
        assert!(verify_deltas(intent, &key(), trade, -100, 100).is_ok());
    }

    #[test]
    fn exact_output_rejects_a_positive_input_delta() {
        let intent = SwapIntent::exact_output(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(1, 100);
        assert!(matches!(
            verify_deltas(intent, &key(), trade, 1, 100),
            Err(SettlementError::InputDeltaPositive { .. })
        ));
    }

    #[test]
    fn exact_output_rejects_exceeding_the_requested_output() {
        let intent = SwapIntent::exact_output(SwapDirection::ZeroForOne, 100);
        let trade = TradeDelta::new(-101, 101);
        assert!(matches!(
            verify_deltas(intent, &key(), trade, -101, 101),
            Err(SettlementError::OutputDeltaAboveRequested { .. })
        ));
    }

    #[test]
    fn one_for_zero_cases_swap_the_asset_roles() {
        let exact_in = SwapIntent::exact_input(SwapDirection::OneForZero, 100);
        assert!(verify_deltas(exact_in, &key(), TradeDelta::new(100, -100), 100, -100).is_ok());
        assert!(matches!(
            verify_deltas(exact_in, &key(), TradeDelta::new(100, -101), 100, -101),
            Err(SettlementError::InputDeltaBelowRequested { .. })
        ));

        let exact_out = SwapIntent::exact_output(SwapDirection::OneForZero, 100);
        assert!(verify_deltas(exact_out, &key(), TradeDelta::new(100, -100), 100, -100).is_ok());
        assert!(matches!(
            verify_deltas(exact_out, &key(), TradeDelta::new(101, -101), 101, -101),
            Err(SettlementError::OutputDeltaAboveRequested { .. })
        ));
    }
}
