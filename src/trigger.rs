//! Trigger table: when does a resting order fire against the quote?
//!
//! | Class     | Long            | Short           |
//! |-----------|-----------------|-----------------|
//! | LimitBuy  | quote ≤ trigger | quote ≥ trigger |
//! | LimitSell | quote ≥ trigger | quote ≤ trigger |
//! | StopBuy   | quote ≥ trigger | quote ≤ trigger |
//! | StopSell  | quote ≤ trigger | quote ≥ trigger |
//!
//! Limit orders fire at a favorable level and stops at an adverse one; a
//! short position inverts the direction of both.

use crate::{Order, OrderType, PositionType, Price};

/// Direction the quote must reach relative to the trigger price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Fires when `quote <= trigger`.
    AtOrBelow,
    /// Fires when `quote >= trigger`.
    AtOrAbove,
}

impl Trigger {
    /// Look up the trigger direction for a class and side.
    pub fn for_class(order_type: OrderType, position: PositionType) -> Trigger {
        use OrderType::*;
        use PositionType::*;
        match (order_type, position) {
            (LimitBuy, Long) | (LimitSell, Short) | (StopBuy, Short) | (StopSell, Long) => {
                Trigger::AtOrBelow
            }
            (LimitBuy, Short) | (LimitSell, Long) | (StopBuy, Long) | (StopSell, Short) => {
                Trigger::AtOrAbove
            }
        }
    }

    #[inline]
    pub fn is_met(self, quote: Price, trigger: Price) -> bool {
        match self {
            Trigger::AtOrBelow => quote <= trigger,
            Trigger::AtOrAbove => quote >= trigger,
        }
    }
}

/// Returns true if an order of this class and side at `trigger` fires at `quote`.
#[inline]
pub fn fires(order_type: OrderType, position: PositionType, quote: Price, trigger: Price) -> bool {
    Trigger::for_class(order_type, position).is_met(quote, trigger)
}

/// Returns true if the order fires at `quote`.
#[inline]
pub fn order_fires(order: &Order, quote: Price) -> bool {
    fires(order.order_type, order.position, quote, order.price)
}
