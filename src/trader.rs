//! Trade primitives consumed by the execution step.
//!
//! The engine never moves cash or shares itself. It calls one of the four
//! primitives on a [`Trader`] and observes success or failure; each call is
//! atomic from the engine's point of view.

use crate::{PositionType, Price, Quantity, Side, Stock};

/// Options passed to every primitive call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TradeOptions {
    /// The primitive must not raise user-facing notifications of its own.
    pub suppress_dialog: bool,
}

impl TradeOptions {
    /// Options used for triggered orders.
    pub const SILENT: TradeOptions = TradeOptions {
        suppress_dialog: true,
    };
}

/// Why a trade primitive refused to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TradeRejection {
    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("order would exceed the stock's maximum number of shares")]
    ExceedsMaxShares,

    #[error("insufficient shares in position")]
    InsufficientPosition,
}

/// Account-side trade execution: one primitive per Buy/Sell × Long/Short.
///
/// `price` overrides the stock's quote when set; triggered orders pass `None`.
pub trait Trader {
    /// Open or increase a long position.
    fn buy_long(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection>;

    /// Open or increase a short position.
    fn open_short(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection>;

    /// Close or reduce a long position.
    fn sell_long(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection>;

    /// Close or reduce a short position.
    fn cover_short(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection>;

    /// Route a trade to the primitive for this direction and position side.
    fn trade(
        &mut self,
        side: Side,
        position: PositionType,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection> {
        match (side, position) {
            (Side::Buy, PositionType::Long) => self.buy_long(stock, shares, price, opts),
            (Side::Buy, PositionType::Short) => self.open_short(stock, shares, price, opts),
            (Side::Sell, PositionType::Long) => self.sell_long(stock, shares, price, opts),
            (Side::Sell, PositionType::Short) => self.cover_short(stock, shares, price, opts),
        }
    }
}
