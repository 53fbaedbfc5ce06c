use std::collections::HashMap;

use parpool_types::{AccountId, Asset, AssetBook, PoolKey, SwapIntent, TradeDelta};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::hook::ConversionHook;
use crate::venue::{TradingVenue, UnlockCallback, UnlockPayload, VenueError};

#[derive(Debug, Clone)]
struct UnlockContext {
    id: Uuid,
    opener: AccountId,
}

/// In-memory trading venue used for tests, demos, and local embedding.
///
/// Holds one pool, an escrow account in the shared book, and per-unlock
/// signed delta bookkeeping. The escrow is expected to carry a working float
/// of both pair assets, the way a production venue carries pooled balances
/// across many pairs; every completed settlement conserves the float.
#[derive(Debug, Clone)]
pub struct InMemoryPoolVenue {
    escrow: AccountId,
    hook: ConversionHook,
    pool: Option<PoolKey>,
    deltas: HashMap<(AccountId, Asset), i128>,
    context: Option<UnlockContext>,
    synced: Option<(Asset, u128)>,
}

impl InMemoryPoolVenue {
    pub fn new(escrow: AccountId, hook: ConversionHook) -> Self {
        Self {
            escrow,
            hook,
            pool: None,
            deltas: HashMap::new(),
            context: None,
            synced: None,
        }
    }

    pub fn hook(&self) -> &ConversionHook {
        &self.hook
    }

    pub fn hook_mut(&mut self) -> &mut ConversionHook {
        &mut self.hook
    }

    pub fn pool(&self) -> Option<&PoolKey> {
        self.pool.as_ref()
    }

    pub fn context_open(&self) -> bool {
        self.context.is_some()
    }

    /// Who opened the currently open unlock context, if any.
    pub fn context_opener(&self) -> Option<&AccountId> {
        self.context.as_ref().map(|context| &context.opener)
    }
}

impl TradingVenue for InMemoryPoolVenue {
    fn escrow(&self) -> &AccountId {
        &self.escrow
    }

    fn initialize(&mut self, key: PoolKey) -> Result<(), VenueError> {
        if self.pool.is_some() {
            return Err(VenueError::PoolAlreadyInitialized);
        }
        self.hook.before_initialize(&key)?;
        self.pool = Some(key);
        info!(fee = key.fee, "pool initialized with conversion hook");
        Ok(())
    }

    fn add_liquidity(
        &mut self,
        _book: &mut AssetBook,
        provider: &AccountId,
        amount: u128,
    ) -> Result<(), VenueError> {
        if self.pool.is_none() {
            return Err(VenueError::PoolNotInitialized);
        }
        self.hook.before_add_liquidity(provider, amount)?;
        Ok(())
    }

    fn unlock<C: UnlockCallback>(
        &mut self,
        book: &mut AssetBook,
        callback: &mut C,
        payload: UnlockPayload,
    ) -> Result<(), C::Error> {
        if self.context.is_some() {
            return Err(C::Error::from(VenueError::AlreadyUnlocked));
        }

        let venue_snapshot = self.clone();
        let book_snapshot = book.clone();
        self.context = Some(UnlockContext {
            id: payload.context_id,
            opener: payload.opener.clone(),
        });
        debug!(context = %payload.context_id, opener = %payload.opener, "unlock context opened");

        let mut result = callback.on_unlock(&mut *self, book, &payload);
        if result.is_ok() {
            // No claim may survive the context.
            if let Some((key, delta)) = self.deltas.iter().find(|(_, delta)| **delta != 0) {
                result = Err(C::Error::from(VenueError::NonzeroDeltaAtClose {
                    holder: key.0.clone(),
                    asset: key.1,
                    delta: *delta,
                }));
            }
        }

        match result {
            Ok(()) => {
                self.deltas.clear();
                self.context = None;
                self.synced = None;
                info!(context = %payload.context_id, "unlock context settled");
                Ok(())
            }
            Err(err) => {
                *self = venue_snapshot;
                *book = book_snapshot;
                warn!(context = %payload.context_id, "unlock context aborted, state rolled back");
                Err(err)
            }
        }
    }

    fn swap(
        &mut self,
        book: &mut AssetBook,
        sender: &AccountId,
        intent: SwapIntent,
    ) -> Result<TradeDelta, VenueError> {
        let context_id = match &self.context {
            Some(context) => context.id,
            None => return Err(VenueError::NotUnlocked),
        };
        let key = self.pool.ok_or(VenueError::PoolNotInitialized)?;

        // The hook settles the conversion against the ledger; its returned
        // delta supersedes any curve pricing.
        let delta = self.hook.before_swap(book, &self.escrow, &key, &intent)?;
        *self
            .deltas
            .entry((sender.clone(), key.asset0))
            .or_insert(0) += delta.amount0;
        *self
            .deltas
            .entry((sender.clone(), key.asset1))
            .or_insert(0) += delta.amount1;

        debug!(
            context = %context_id,
            sender = %sender,
            amount0 = delta.amount0,
            amount1 = delta.amount1,
            "swap executed with hook override"
        );
        Ok(delta)
    }

    fn take(
        &mut self,
        book: &mut AssetBook,
        holder: &AccountId,
        asset: Asset,
        recipient: &AccountId,
        amount: u128,
    ) -> Result<(), VenueError> {
        if self.context.is_none() {
            return Err(VenueError::NotUnlocked);
        }
        let signed = i128::try_from(amount).map_err(|_| VenueError::AmountOutOfRange { amount })?;
        book.transfer(&self.escrow, recipient, asset, amount)?;
        *self.deltas.entry((holder.clone(), asset)).or_insert(0) -= signed;
        Ok(())
    }

    fn settle_from(
        &mut self,
        book: &mut AssetBook,
        holder: &AccountId,
        payer: &AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), VenueError> {
        if self.context.is_none() {
            return Err(VenueError::NotUnlocked);
        }
        let signed = i128::try_from(amount).map_err(|_| VenueError::AmountOutOfRange { amount })?;
        book.transfer(payer, &self.escrow, asset, amount)?;
        *self.deltas.entry((holder.clone(), asset)).or_insert(0) += signed;
        Ok(())
    }

    fn sync(&mut self, book: &AssetBook, asset: Asset) {
        self.synced = Some((asset, book.balance_of(&self.escrow, asset)));
    }

    fn settle_synced(&mut self, book: &AssetBook, holder: &AccountId) -> Result<u128, VenueError> {
        if self.context.is_none() {
            return Err(VenueError::NotUnlocked);
        }
        let (asset, prior) = self.synced.take().ok_or(VenueError::NoSyncedBalance)?;
        let current = book.balance_of(&self.escrow, asset);
        let paid = current.saturating_sub(prior);
        let signed =
            i128::try_from(paid).map_err(|_| VenueError::AmountOutOfRange { amount: paid })?;
        *self.deltas.entry((holder.clone(), asset)).or_insert(0) += signed;
        Ok(paid)
    }

    fn pending_delta(&self, holder: &AccountId, asset: Asset) -> i128 {
        self.deltas
            .get(&(holder.clone(), asset))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parpool_ledger::ReserveLedger;
    use parpool_types::SwapDirection;

    fn escrow() -> AccountId {
        AccountId::new("escrow")
    }

    fn router() -> AccountId {
        AccountId::new("router")
    }

    fn requester() -> AccountId {
        AccountId::new("alice")
    }

    fn venue_with_pool(book: &mut AssetBook, float: u128) -> InMemoryPoolVenue {
        book.credit(&escrow(), Asset::Native, float).unwrap();
        let ledger = ReserveLedger::new(AccountId::new("reserve"), AccountId::new("owner"));
        let hook = ConversionHook::new(AccountId::new("hook"), ledger);
        let mut venue = InMemoryPoolVenue::new(escrow(), hook);
        venue.initialize(PoolKey::conversion_pair(1)).unwrap();
        venue
    }

    fn payload(intent: SwapIntent) -> UnlockPayload {
        UnlockPayload {
            context_id: Uuid::new_v4(),
            opener: router(),
            requester: requester(),
            referrer: None,
            key: PoolKey::conversion_pair(1),
            intent,
        }
    }

    /// Callback that performs no balance movement at all.
    struct NoopCallback;

    impl UnlockCallback for NoopCallback {
        type Error = VenueError;

        fn on_unlock<V: TradingVenue>(
            &mut self,
            _venue: &mut V,
            _book: &mut AssetBook,
            _payload: &UnlockPayload,
        ) -> Result<(), VenueError> {
            Ok(())
        }
    }

    /// Callback that trades but never settles its claims.
    struct UnsettledCallback;

    impl UnlockCallback for UnsettledCallback {
        type Error = VenueError;

        fn on_unlock<V: TradingVenue>(
            &mut self,
            venue: &mut V,
            book: &mut AssetBook,
            payload: &UnlockPayload,
        ) -> Result<(), VenueError> {
            venue.swap(book, &payload.opener, payload.intent)?;
            Ok(())
        }
    }

    /// Callback that trades, pays in the debt, and claims the credit.
    struct SettlingCallback;

    impl UnlockCallback for SettlingCallback {
        type Error = VenueError;

        fn on_unlock<V: TradingVenue>(
            &mut self,
            venue: &mut V,
            book: &mut AssetBook,
            payload: &UnlockPayload,
        ) -> Result<(), VenueError> {
            let delta = venue.swap(book, &payload.opener, payload.intent)?;
            let (input, owed) = if delta.amount0 < 0 {
                (payload.key.asset0, delta.amount0.unsigned_abs())
            } else {
                (payload.key.asset1, delta.amount1.unsigned_abs())
            };
            let (output, due) = if delta.amount0 > 0 {
                (payload.key.asset0, delta.amount0.unsigned_abs())
            } else {
                (payload.key.asset1, delta.amount1.unsigned_abs())
            };

            venue.settle_from(book, &payload.opener, &payload.requester, input, owed)?;
            venue.take(book, &payload.opener, output, &payload.requester, due)?;
            Ok(())
        }
    }

    #[test]
    fn noop_unlock_settles_trivially() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 1_000);
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);

        venue
            .unlock(&mut book, &mut NoopCallback, payload(intent))
            .unwrap();
        assert!(!venue.context_open());
    }

    #[test]
    fn swap_requires_an_open_context() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 1_000);
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);

        assert!(matches!(
            venue.swap(&mut book, &router(), intent),
            Err(VenueError::NotUnlocked)
        ));
    }

    #[test]
    fn unsettled_claims_abort_and_roll_back() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 1_000);
        let book_before = book.clone();
        let issued_before = venue.hook().ledger().total_issued();

        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);
        let err = venue
            .unlock(&mut book, &mut UnsettledCallback, payload(intent))
            .unwrap_err();
        assert!(matches!(err, VenueError::NonzeroDeltaAtClose { .. }));

        // The whole window rolled back: book, ledger, and delta table.
        assert_eq!(book, book_before);
        assert_eq!(venue.hook().ledger().total_issued(), issued_before);
        assert_eq!(venue.pending_delta(&router(), Asset::Native), 0);
        assert!(!venue.context_open());
    }

    #[test]
    fn settled_swap_conserves_the_escrow_float() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 1_000);
        book.credit(&requester(), Asset::Native, 100).unwrap();

        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);
        venue
            .unlock(&mut book, &mut SettlingCallback, payload(intent))
            .unwrap();

        assert_eq!(book.balance_of(&requester(), Asset::Native), 0);
        assert_eq!(book.balance_of(&requester(), Asset::Issued), 100);
        assert_eq!(book.balance_of(&escrow(), Asset::Native), 1_000);
        assert_eq!(book.balance_of(&escrow(), Asset::Issued), 0);
        assert_eq!(venue.hook().ledger().total_issued(), 100);
    }

    #[test]
    fn reentrant_unlock_is_rejected() {
        struct ReenterCallback;

        impl UnlockCallback for ReenterCallback {
            type Error = VenueError;

            fn on_unlock<V: TradingVenue>(
                &mut self,
                venue: &mut V,
                book: &mut AssetBook,
                payload: &UnlockPayload,
            ) -> Result<(), VenueError> {
                venue.unlock(book, &mut NoopCallback, payload.clone())
            }
        }

        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 1_000);
        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 100);

        let err = venue
            .unlock(&mut book, &mut ReenterCallback, payload(intent))
            .unwrap_err();
        assert!(matches!(err, VenueError::AlreadyUnlocked));
        assert!(!venue.context_open());
    }

    #[test]
    fn liquidity_provisioning_is_blocked_at_the_venue() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 0);

        let err = venue
            .add_liquidity(&mut book, &AccountId::new("lp"), 5_000)
            .unwrap_err();
        assert!(matches!(
            err,
            VenueError::Hook(crate::HookError::LiquidityNotAccepted)
        ));
    }

    #[test]
    fn pool_initializes_once_and_only_through_admission() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 0);
        assert!(matches!(
            venue.initialize(PoolKey::conversion_pair(1)),
            Err(VenueError::PoolAlreadyInitialized)
        ));

        // A venue whose hook rejects the key registers nothing.
        let ledger = ReserveLedger::new(AccountId::new("reserve-2"), AccountId::new("owner"));
        let hook = ConversionHook::new(AccountId::new("hook-2"), ledger);
        let mut rejected = InMemoryPoolVenue::new(AccountId::new("escrow-2"), hook);
        let bad_key = PoolKey {
            fee: 100,
            ..PoolKey::conversion_pair(1)
        };
        assert!(rejected.initialize(bad_key).is_err());
        assert!(rejected.pool().is_none());
    }

    #[test]
    fn sync_then_settle_credits_the_balance_difference() {
        let mut book = AssetBook::new();
        let mut venue = venue_with_pool(&mut book, 1_000);
        book.credit(&requester(), Asset::Native, 100).unwrap();

        /// Settle the input by direct transfer plus sync, instead of
        /// `settle_from`.
        struct SyncSettleCallback;

        impl UnlockCallback for SyncSettleCallback {
            type Error = VenueError;

            fn on_unlock<V: TradingVenue>(
                &mut self,
                venue: &mut V,
                book: &mut AssetBook,
                payload: &UnlockPayload,
            ) -> Result<(), VenueError> {
                let delta = venue.swap(book, &payload.opener, payload.intent)?;

                venue.sync(book, Asset::Native);
                let escrow = venue.escrow().clone();
                book.transfer(
                    &payload.requester,
                    &escrow,
                    Asset::Native,
                    delta.amount0.unsigned_abs(),
                )?;
                let credited = venue.settle_synced(book, &payload.opener)?;
                assert_eq!(credited, delta.amount0.unsigned_abs());

                venue.take(
                    book,
                    &payload.opener,
                    Asset::Issued,
                    &payload.requester,
                    delta.amount1.unsigned_abs(),
                )?;
                Ok(())
            }
        }

        let intent = SwapIntent::exact_input(SwapDirection::ZeroForOne, 60);
        venue
            .unlock(&mut book, &mut SyncSettleCallback, payload(intent))
            .unwrap();

        assert_eq!(book.balance_of(&requester(), Asset::Native), 40);
        assert_eq!(book.balance_of(&requester(), Asset::Issued), 60);
        assert_eq!(book.balance_of(&escrow(), Asset::Native), 1_000);
    }
}
