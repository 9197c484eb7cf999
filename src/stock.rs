//! Quoted instruments.

use crate::{Price, Quantity, Symbol};

/// An instrument quoted by the market.
///
/// `price` is written only by the quote source (see
/// [`Market::set_price`](crate::Market::set_price)); the order engine reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stock {
    pub symbol: Symbol,
    pub name: String,
    /// Current quote
    pub price: Price,
    /// Most shares a single account may hold across long and short
    pub max_shares: Quantity,
}

impl Stock {
    pub fn new(symbol: Symbol, name: impl Into<String>, price: Price, max_shares: Quantity) -> Self {
        Self {
            symbol,
            name: name.into(),
            price,
            max_shares,
        }
    }
}
