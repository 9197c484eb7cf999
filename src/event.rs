//! Fill and failure notifications.
//!
//! The engine describes what happened as an [`OrderEvent`] and hands it to a
//! [`NotificationSink`]. Rendering is up to the sink; `Display` gives the
//! plain-text form.

use std::fmt;

use crate::types::group_thousands;
use crate::{Order, OrderType, PositionType, Price, Quantity, Symbol, TradeRejection};

/// Outcome of a triggered order, as reported to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderEvent {
    /// The order executed in full at its trigger price.
    Filled {
        order_type: OrderType,
        symbol: Symbol,
        price: Price,
        position: PositionType,
        shares: Quantity,
    },
    /// A buy-class order triggered but the trade was refused; it keeps resting.
    Failed {
        order_type: OrderType,
        symbol: Symbol,
        price: Price,
        position: PositionType,
        reason: TradeRejection,
    },
}

impl OrderEvent {
    pub fn filled(order: &Order) -> Self {
        OrderEvent::Filled {
            order_type: order.order_type,
            symbol: order.symbol,
            price: order.price,
            position: order.position,
            shares: order.shares,
        }
    }

    pub fn failed(order: &Order, reason: TradeRejection) -> Self {
        OrderEvent::Failed {
            order_type: order.order_type,
            symbol: order.symbol,
            price: order.price,
            position: order.position,
            reason,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, OrderEvent::Filled { .. })
    }

    pub fn symbol(&self) -> Symbol {
        match self {
            OrderEvent::Filled { symbol, .. } | OrderEvent::Failed { symbol, .. } => *symbol,
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderEvent::Filled {
                order_type,
                symbol,
                price,
                position,
                shares,
            } => write!(
                f,
                "{order_type} for {symbol} @ {price} ({position}) was filled ({} shares)",
                group_thousands(*shares)
            ),
            OrderEvent::Failed {
                order_type,
                symbol,
                price,
                position,
                reason,
            } => write!(
                f,
                "Failed to execute {order_type} for {symbol} @ {price} ({position}): {reason}"
            ),
        }
    }
}

/// Receives order notifications.
pub trait NotificationSink {
    fn notify(&mut self, event: OrderEvent);
}

/// Collects events in memory.
impl NotificationSink for Vec<OrderEvent> {
    fn notify(&mut self, event: OrderEvent) {
        self.push(event);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, event: OrderEvent) {
        (**self).notify(event);
    }
}

/// Writes events to the `log` facade: fills at `info`, failures at `warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, event: OrderEvent) {
        if event.is_fill() {
            log::info!("{event}");
        } else {
            log::warn!("{event}");
        }
    }
}
