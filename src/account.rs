//! Simulated trading account implementing the four trade primitives.
//!
//! Cash and prices are in cents. Every trade pays a flat commission. An
//! account may hold at most `stock.max_shares` shares of an instrument,
//! long and short combined.

use log::info;
use rustc_hash::FxHashMap;

use crate::{Price, Quantity, Stock, Symbol, TradeOptions, TradeRejection, Trader};

/// Long and short exposure in one instrument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Holding {
    pub long_shares: Quantity,
    /// Average entry price of the long shares (cents)
    pub long_avg_price: Price,
    pub short_shares: Quantity,
    /// Average entry price of the short shares (cents)
    pub short_avg_price: Price,
}

impl Holding {
    /// Long plus short shares.
    pub fn total_shares(&self) -> Quantity {
        self.long_shares + self.short_shares
    }

    pub fn is_flat(&self) -> bool {
        self.total_shares() == 0
    }
}

/// A cash account with per-symbol holdings.
#[derive(Clone, Debug, Default)]
pub struct SimAccount {
    cash: i64,
    commission: i64,
    holdings: FxHashMap<Symbol, Holding>,
}

impl SimAccount {
    /// Create an account with starting cash and no commission.
    pub fn new(cash: Price) -> Self {
        Self {
            cash: cash.0,
            commission: 0,
            holdings: FxHashMap::default(),
        }
    }

    /// Set the flat per-trade commission.
    pub fn with_commission(mut self, commission: Price) -> Self {
        self.commission = commission.0;
        self
    }

    pub fn cash(&self) -> Price {
        Price(self.cash)
    }

    pub fn commission(&self) -> Price {
        Price(self.commission)
    }

    /// Holding for a symbol (flat if never traded).
    pub fn holding(&self, symbol: &Symbol) -> Holding {
        self.holdings.get(symbol).copied().unwrap_or_default()
    }

    /// Non-flat holdings.
    pub fn holdings(&self) -> impl Iterator<Item = (&Symbol, &Holding)> {
        self.holdings.iter().filter(|(_, h)| !h.is_flat())
    }

    /// Check the share cap and cash for an opening trade; returns the cost.
    fn opening_cost(
        &self,
        stock: &Stock,
        shares: Quantity,
        price: Price,
    ) -> Result<i64, TradeRejection> {
        let held = self.holding(&stock.symbol).total_shares();
        if held.saturating_add(shares) > stock.max_shares {
            return Err(TradeRejection::ExceedsMaxShares);
        }
        let cost = notional(shares, price)
            .and_then(|n| n.checked_add(self.commission))
            .ok_or(TradeRejection::InsufficientFunds)?;
        if cost > self.cash {
            return Err(TradeRejection::InsufficientFunds);
        }
        Ok(cost)
    }

    /// Cash after crediting `gross` less commission. Refuses on overflow or
    /// a negative balance.
    fn settle(&self, gross: Option<i64>) -> Result<i64, TradeRejection> {
        gross
            .and_then(|g| g.checked_sub(self.commission))
            .and_then(|net| self.cash.checked_add(net))
            .filter(|cash| *cash >= 0)
            .ok_or(TradeRejection::InsufficientFunds)
    }

    fn log_trade(opts: TradeOptions, action: &str, stock: &Stock, shares: Quantity, price: Price) {
        if !opts.suppress_dialog {
            info!("{action} {shares} shares of {} @ {price}", stock.symbol);
        }
    }
}

/// `shares * price` in cents, `None` on overflow.
fn notional(shares: Quantity, price: Price) -> Option<i64> {
    i64::try_from(shares).ok()?.checked_mul(price.0)
}

/// Volume-weighted average of an existing lot and a new one.
fn blended_price(old_shares: Quantity, old_price: Price, shares: Quantity, price: Price) -> Price {
    let total = old_shares as i128 + shares as i128;
    if total == 0 {
        return Price::ZERO;
    }
    let cost = old_shares as i128 * old_price.0 as i128 + shares as i128 * price.0 as i128;
    Price((cost / total) as i64)
}

impl Trader for SimAccount {
    fn buy_long(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection> {
        let price = price.unwrap_or(stock.price);
        let cost = self.opening_cost(stock, shares, price)?;

        self.cash -= cost;
        let h = self.holdings.entry(stock.symbol).or_default();
        h.long_avg_price = blended_price(h.long_shares, h.long_avg_price, shares, price);
        h.long_shares += shares;
        Self::log_trade(opts, "Bought", stock, shares, price);
        Ok(())
    }

    fn open_short(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection> {
        let price = price.unwrap_or(stock.price);
        let cost = self.opening_cost(stock, shares, price)?;

        self.cash -= cost;
        let h = self.holdings.entry(stock.symbol).or_default();
        h.short_avg_price = blended_price(h.short_shares, h.short_avg_price, shares, price);
        h.short_shares += shares;
        Self::log_trade(opts, "Shorted", stock, shares, price);
        Ok(())
    }

    fn sell_long(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection> {
        let price = price.unwrap_or(stock.price);
        let held = self.holding(&stock.symbol);
        if shares == 0 || shares > held.long_shares {
            return Err(TradeRejection::InsufficientPosition);
        }
        let cash = self.settle(notional(shares, price))?;

        self.cash = cash;
        let h = self.holdings.entry(stock.symbol).or_default();
        h.long_shares -= shares;
        if h.long_shares == 0 {
            h.long_avg_price = Price::ZERO;
        }
        Self::log_trade(opts, "Sold", stock, shares, price);
        Ok(())
    }

    fn cover_short(
        &mut self,
        stock: &Stock,
        shares: Quantity,
        price: Option<Price>,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection> {
        let price = price.unwrap_or(stock.price);
        let held = self.holding(&stock.symbol);
        if shares == 0 || shares > held.short_shares {
            return Err(TradeRejection::InsufficientPosition);
        }
        // Return of the original stake plus (entry - exit) per share.
        let per_share = held
            .short_avg_price
            .0
            .checked_mul(2)
            .and_then(|p| p.checked_sub(price.0));
        let cash = self.settle(per_share.and_then(|p| notional(shares, Price(p))))?;

        self.cash = cash;
        let h = self.holdings.entry(stock.symbol).or_default();
        h.short_shares -= shares;
        if h.short_shares == 0 {
            h.short_avg_price = Price::ZERO;
        }
        Self::log_trade(opts, "Covered", stock, shares, price);
        Ok(())
    }
}
