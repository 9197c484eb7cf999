//! Resting order representation

use std::fmt;
use std::str::FromStr;

use crate::{Error, OrderId, PositionType, Price, Quantity, Side, Symbol};

/// The four resting order classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderType {
    /// Buy when the quote reaches a favorable level.
    LimitBuy,
    /// Sell when the quote reaches a favorable level.
    LimitSell,
    /// Buy when the quote moves adversely (protective stop).
    StopBuy,
    /// Sell when the quote moves adversely (protective stop).
    StopSell,
}

impl OrderType {
    pub const ALL: [OrderType; 4] = [
        OrderType::LimitBuy,
        OrderType::LimitSell,
        OrderType::StopBuy,
        OrderType::StopSell,
    ];

    /// Buy or sell bucket of this class.
    #[inline]
    pub fn side(self) -> Side {
        match self {
            OrderType::LimitBuy | OrderType::StopBuy => Side::Buy,
            OrderType::LimitSell | OrderType::StopSell => Side::Sell,
        }
    }

    #[inline]
    pub fn is_buy(self) -> bool {
        self.side() == Side::Buy
    }

    /// Human-readable label, used in notifications and persisted books.
    pub fn label(self) -> &'static str {
        match self {
            OrderType::LimitBuy => "Limit Buy Order",
            OrderType::LimitSell => "Limit Sell Order",
            OrderType::StopBuy => "Stop Buy Order",
            OrderType::StopSell => "Stop Sell Order",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderType {
    type Err = Error;

    /// Accepts the full label (`"Limit Buy Order"`) or a short form
    /// (`"limitbuy"`, `"limit-buy"`, `"stop_sell"`), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(ty) = OrderType::ALL.iter().find(|t| t.label() == s) {
            return Ok(*ty);
        }
        let compact: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.trim_end_matches("order") {
            "limitbuy" => Ok(OrderType::LimitBuy),
            "limitsell" => Ok(OrderType::LimitSell),
            "stopbuy" => Ok(OrderType::StopBuy),
            "stopsell" => Ok(OrderType::StopSell),
            _ => Err(Error::UnsupportedOrderClass(s.to_string())),
        }
    }
}

/// A pending order resting in the book.
///
/// Immutable once created; it leaves the book whole, either filled or
/// cancelled. Identity is `id`, not the field values.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    /// Identity assigned by the book
    pub id: OrderId,
    /// Instrument the order targets
    pub symbol: Symbol,
    /// Limit/Stop × Buy/Sell
    pub order_type: OrderType,
    /// Long or short exposure
    pub position: PositionType,
    /// Trigger price; also the reported execution price
    pub price: Price,
    /// Share count, executed all-or-nothing
    pub shares: Quantity,
}

impl Order {
    pub fn new(
        id: OrderId,
        symbol: Symbol,
        order_type: OrderType,
        position: PositionType,
        price: Price,
        shares: Quantity,
    ) -> Self {
        Self {
            id,
            symbol,
            order_type,
            position,
            price,
            shares,
        }
    }

    /// Returns true if this order belongs to the given class and side.
    #[inline]
    pub fn is_class(&self, order_type: OrderType, position: PositionType) -> bool {
        self.order_type == order_type && self.position == position
    }
}
