use std::fmt;

use serde::{Deserialize, Serialize};

/// The three asset kinds the system moves.
///
/// `Native` backs `Issued` one-to-one; `Wrapped` is the wrapped-native
/// representation accepted by deposits and unwrapped on arrival. The trading
/// pair is always (`Native`, `Issued`) in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
    Native,
    Issued,
    Wrapped,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Issued => write!(f, "issued"),
            Asset::Wrapped => write!(f, "wrapped"),
        }
    }
}
