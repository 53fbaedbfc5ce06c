use serde::{Deserialize, Serialize};

use crate::asset::Asset;

/// Identity of a trading pool: ordered asset pair, fee in hundredths of a
/// basis point, and the venue's price-granularity parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub asset0: Asset,
    pub asset1: Asset,
    pub fee: u32,
    pub granularity: u32,
}

impl PoolKey {
    /// The fixed-conversion pair: (native, issued), zero fee.
    pub fn conversion_pair(granularity: u32) -> Self {
        Self {
            asset0: Asset::Native,
            asset1: Asset::Issued,
            fee: 0,
            granularity,
        }
    }
}

/// Which asset of the pair is the swap input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// asset0 in, asset1 out.
    ZeroForOne,
    /// asset1 in, asset0 out.
    OneForZero,
}

impl SwapDirection {
    pub fn input(&self, key: &PoolKey) -> Asset {
        match self {
            SwapDirection::ZeroForOne => key.asset0,
            SwapDirection::OneForZero => key.asset1,
        }
    }

    pub fn output(&self, key: &PoolKey) -> Asset {
        match self {
            SwapDirection::ZeroForOne => key.asset1,
            SwapDirection::OneForZero => key.asset0,
        }
    }
}

/// A single swap request: direction plus signed amount.
///
/// Negative amounts request exact-input semantics (spend exactly this much);
/// non-negative amounts request exact-output (receive exactly this much).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIntent {
    pub direction: SwapDirection,
    pub amount: i128,
}

impl SwapIntent {
    pub fn exact_input(direction: SwapDirection, magnitude: u128) -> Self {
        Self {
            direction,
            amount: -(magnitude.min(i128::MAX as u128) as i128),
        }
    }

    pub fn exact_output(direction: SwapDirection, magnitude: u128) -> Self {
        Self {
            direction,
            amount: magnitude.min(i128::MAX as u128) as i128,
        }
    }

    pub fn is_exact_input(&self) -> bool {
        self.amount < 0
    }

    pub fn magnitude(&self) -> u128 {
        self.amount.unsigned_abs()
    }
}

/// Net signed balance change for both pool assets, in swapper perspective:
/// negative means the swapper owes the venue, positive means the venue owes
/// the swapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDelta {
    pub amount0: i128,
    pub amount1: i128,
}

impl TradeDelta {
    pub const ZERO: TradeDelta = TradeDelta {
        amount0: 0,
        amount1: 0,
    };

    pub fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount0 == 0 && self.amount1 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_resolves_input_and_output() {
        let key = PoolKey::conversion_pair(1);
        assert_eq!(SwapDirection::ZeroForOne.input(&key), Asset::Native);
        assert_eq!(SwapDirection::ZeroForOne.output(&key), Asset::Issued);
        assert_eq!(SwapDirection::OneForZero.input(&key), Asset::Issued);
        assert_eq!(SwapDirection::OneForZero.output(&key), Asset::Native);
    }

    #[test]
    fn intent_sign_encodes_amount_semantics() {
        let exact_in = SwapIntent::exact_input(SwapDirection::ZeroForOne, 500);
        assert!(exact_in.is_exact_input());
        assert_eq!(exact_in.amount, -500);
        assert_eq!(exact_in.magnitude(), 500);

        let exact_out = SwapIntent::exact_output(SwapDirection::OneForZero, 500);
        assert!(!exact_out.is_exact_input());
        assert_eq!(exact_out.amount, 500);
        assert_eq!(exact_out.magnitude(), 500);
    }

    #[test]
    fn conversion_pair_is_native_issued_at_zero_fee() {
        let key = PoolKey::conversion_pair(8);
        assert_eq!(key.asset0, Asset::Native);
        assert_eq!(key.asset1, Asset::Issued);
        assert_eq!(key.fee, 0);
    }
}
