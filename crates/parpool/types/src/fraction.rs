use std::fmt;

use serde::{Deserialize, Serialize};

/// Scale used for fixed-point fractions: `SCALE` represents 100%.
const SCALE: u128 = 1_000_000_000_000_000_000;

/// A fixed-point fraction scaled by 1e18, used for the rebalance threshold.
///
/// Multiplication via [`Fraction::of`] is exact for fractions up to
/// [`Fraction::ONE`]; results round down to the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fraction(u128);

impl Fraction {
    pub const ZERO: Fraction = Fraction(0);
    pub const ONE: Fraction = Fraction(SCALE);

    /// Build from a raw 1e18-scaled value. Callers enforcing an upper bound
    /// check against [`Fraction::ONE`] themselves.
    pub fn from_scaled(raw: u128) -> Self {
        Self(raw)
    }

    pub fn from_percent(percent: u64) -> Self {
        Self(u128::from(percent) * (SCALE / 100))
    }

    pub fn scaled(&self) -> u128 {
        self.0
    }

    /// `amount × fraction`, rounded down.
    ///
    /// Split into whole and remainder parts so the intermediate products fit
    /// in `u128` for any `amount` when the fraction is at most `ONE`.
    pub fn of(&self, amount: u128) -> u128 {
        let whole = amount / SCALE;
        let rem = amount % SCALE;
        whole * self.0 + rem * self.0 / SCALE
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / (SCALE / 100);
        let frac = self.0 % (SCALE / 100);
        if frac == 0 {
            write!(f, "{}%", whole)
        } else {
            write!(f, "{}.{:016}%", whole, frac)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_constructor_scales() {
        assert_eq!(Fraction::from_percent(100), Fraction::ONE);
        assert_eq!(Fraction::from_percent(10).scaled(), SCALE / 10);
    }

    #[test]
    fn of_rounds_down() {
        let tenth = Fraction::from_percent(10);
        assert_eq!(tenth.of(10), 1);
        assert_eq!(tenth.of(19), 1);
        assert_eq!(tenth.of(20), 2);
    }

    #[test]
    fn of_is_exact_at_the_extremes() {
        assert_eq!(Fraction::ZERO.of(u128::MAX), 0);
        assert_eq!(Fraction::ONE.of(u128::MAX), u128::MAX);
    }

    #[test]
    fn of_handles_amounts_above_the_scale() {
        let half = Fraction::from_percent(50);
        let amount = 3 * SCALE + 2;
        assert_eq!(half.of(amount), amount / 2);
    }

    #[test]
    fn display_renders_percentages() {
        assert_eq!(Fraction::from_percent(10).to_string(), "10%");
        assert_eq!(Fraction::ONE.to_string(), "100%");
    }
}
