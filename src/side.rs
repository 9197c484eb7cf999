//! Trade direction (Buy/Sell) and position side (Long/Short)

use std::fmt;

/// Direction bucket of an order class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Which exposure an order acts on.
///
/// For a long position "buy" opens and "sell" closes. For a short position
/// "buy" opens the short and "sell" covers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositionType {
    Long,
    Short,
}

impl PositionType {
    pub const ALL: [PositionType; 2] = [PositionType::Long, PositionType::Short];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PositionType::Long => "Long",
            PositionType::Short => "Short",
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
