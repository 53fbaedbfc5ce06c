use parpool_types::{AccountId, Asset, AssetBook, BookError, PoolKey, SwapIntent, TradeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::HookError;

/// Errors returned by trading-venue operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VenueError {
    #[error("operation requires an open unlock context")]
    NotUnlocked,

    #[error("an unlock context is already open")]
    AlreadyUnlocked,

    #[error("pool is not initialized")]
    PoolNotInitialized,

    #[error("pool is already initialized")]
    PoolAlreadyInitialized,

    #[error("unlock context closed with nonzero delta {delta} on {asset} for {holder}")]
    NonzeroDeltaAtClose {
        holder: AccountId,
        asset: Asset,
        delta: i128,
    },

    #[error("no synced balance to settle against")]
    NoSyncedBalance,

    #[error("amount {amount} is outside the settleable range")]
    AmountOutOfRange { amount: u128 },

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Book(#[from] BookError),
}

/// Capability token passed through the unlock context to the registered
/// callback: everything the callback needs to execute and verify one trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockPayload {
    pub context_id: Uuid,
    /// Identity of the party that opened the context; the callback verifies
    /// this is itself before doing anything else.
    pub opener: AccountId,
    /// The party paying in and claiming out at settlement.
    pub requester: AccountId,
    pub referrer: Option<AccountId>,
    pub key: PoolKey,
    pub intent: SwapIntent,
}

/// The single registered callback invoked inside an unlock context.
///
/// Real balance movements happen only here; the venue closes the context by
/// asserting every pending delta is zero, and rolls the whole window back on
/// any error.
pub trait UnlockCallback {
    type Error: From<VenueError>;

    fn on_unlock<V: TradingVenue>(
        &mut self,
        venue: &mut V,
        book: &mut AssetBook,
        payload: &UnlockPayload,
    ) -> Result<(), Self::Error>;
}

/// Trading-venue boundary consumed by the hook's settlement flow.
///
/// The venue owns an escrow account, per-unlock signed delta bookkeeping,
/// and the transactional `unlock` window in which a single callback may
/// move balances before atomic settlement.
pub trait TradingVenue {
    /// The venue's escrow account.
    fn escrow(&self) -> &AccountId;

    /// Initialize the pool, running hook admission. One pool per venue.
    fn initialize(&mut self, key: PoolKey) -> Result<(), VenueError>;

    /// Provision liquidity. Routed through hook admission, which blocks it
    /// unconditionally on the conversion pair.
    fn add_liquidity(
        &mut self,
        book: &mut AssetBook,
        provider: &AccountId,
        amount: u128,
    ) -> Result<(), VenueError>;

    /// Open the transactional context, invoke `callback` exactly once, and
    /// close atomically: on success every pending delta must be zero; on any
    /// error all venue and book state from the window is rolled back.
    fn unlock<C: UnlockCallback>(
        &mut self,
        book: &mut AssetBook,
        callback: &mut C,
        payload: UnlockPayload,
    ) -> Result<(), C::Error>;

    /// Execute a swap for `sender` inside an open context. The hook settles
    /// the conversion and its returned delta supersedes the venue's pricing;
    /// the same delta is credited to `sender`'s pending claims and returned.
    fn swap(
        &mut self,
        book: &mut AssetBook,
        sender: &AccountId,
        intent: SwapIntent,
    ) -> Result<TradeDelta, VenueError>;

    /// Pay `amount` of `asset` out of escrow to `recipient`, debiting
    /// `holder`'s pending delta.
    fn take(
        &mut self,
        book: &mut AssetBook,
        holder: &AccountId,
        asset: Asset,
        recipient: &AccountId,
        amount: u128,
    ) -> Result<(), VenueError>;

    /// Pay `amount` of `asset` from `payer` into escrow, crediting
    /// `holder`'s pending delta.
    fn settle_from(
        &mut self,
        book: &mut AssetBook,
        holder: &AccountId,
        payer: &AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), VenueError>;

    /// Record the current escrow balance of `asset` ahead of a direct
    /// transfer, for settlement by balance difference.
    fn sync(&mut self, book: &AssetBook, asset: Asset);

    /// Credit `holder` with whatever arrived in escrow since the last
    /// `sync`. Returns the credited amount.
    fn settle_synced(&mut self, book: &AssetBook, holder: &AccountId) -> Result<u128, VenueError>;

    /// Signed pending claim of `holder` against escrow for `asset`.
    fn pending_delta(&self, holder: &AccountId, asset: Asset) -> i128;
}
