//! Settlement hook and trading-venue boundary.
//!
//! The [`ConversionHook`] is registered against exactly one pool, the
//! (native, issued) pair at zero fee, and intercepts every swap on it,
//! substituting the reserve ledger's one-to-one conversion for the venue's
//! own pricing. Liquidity provisioning into the pair is blocked outright:
//! the pool exists as a routing surface, not a market.
//!
//! The [`TradingVenue`] trait specifies the escrow and transactional-unlock
//! surface this system needs from the venue; [`InMemoryPoolVenue`] is the
//! reference implementation used by tests, demos, and local embedding.

pub mod error;
pub mod hook;
pub mod memory;
pub mod venue;

pub use error::HookError;
pub use hook::{ConversionHook, HookPermissions};
pub use memory::InMemoryPoolVenue;
pub use venue::{TradingVenue, UnlockCallback, UnlockPayload, VenueError};
