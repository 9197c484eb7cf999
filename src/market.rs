//! Market: instrument registry plus the resting-order book.
//!
//! This is the main entry point. The simulation loop moves quotes with
//! [`Market::set_price`] and then asks the market to evaluate resting orders,
//! either one (class, side) pair at a time with [`Market::process_orders`] or
//! everything for a symbol with [`Market::process_symbol`].

use log::{debug, error, info, warn};
use rustc_hash::FxHashMap;

use crate::{
    error::ValidationError,
    event::{NotificationSink, OrderEvent},
    result::{ExecutionOutcome, ProcessReport},
    trader::{TradeOptions, Trader},
    trigger, Error, Order, OrderBook, OrderId, OrderType, PositionType, Price, Quantity, Result,
    Side, Stock, Symbol,
};

/// Quoted instruments and the orders resting against them.
///
/// ```
/// use tixbook::{Market, OrderEvent, OrderType, PositionType, Price, SimAccount, Stock, Symbol};
///
/// let ecp = Symbol::new("ECP");
/// let mut market = Market::with_stocks([Stock::new(ecp, "ECorp", Price(60_00), 100_000)]);
/// let mut account = SimAccount::new(Price(1_000_000_00));
/// let mut events: Vec<OrderEvent> = Vec::new();
///
/// let id = market
///     .place(&ecp, OrderType::StopSell, PositionType::Long, Price(55_00), 100)
///     .unwrap();
///
/// // Quote still above the stop: the order keeps resting
/// market.process_symbol(&ecp, &mut account, &mut events).unwrap();
/// assert!(market.book().get(&ecp, id).is_some());
///
/// // Quote falls through the stop, but there is no long position to sell.
/// // Sell-side failures are not reported.
/// market.set_price(&ecp, Price(54_00)).unwrap();
/// let report = market.process_symbol(&ecp, &mut account, &mut events).unwrap();
/// assert_eq!(report.rejected, 1);
/// assert!(events.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Market {
    stocks: FxHashMap<Symbol, Stock>,
    book: OrderBook,
    suppress_fill_notifications: bool,
}

impl Market {
    /// Create a market with no instruments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a market and bootstrap an empty order sequence per instrument.
    pub fn with_stocks<I: IntoIterator<Item = Stock>>(stocks: I) -> Self {
        let stocks: FxHashMap<Symbol, Stock> =
            stocks.into_iter().map(|s| (s.symbol, s)).collect();
        let book = OrderBook::for_symbols(stocks.keys().copied());
        Self {
            stocks,
            book,
            suppress_fill_notifications: false,
        }
    }

    // === Instrument registry ===

    /// Register an instrument. Returns the previous entry for the symbol, if any.
    pub fn add_stock(&mut self, stock: Stock) -> Option<Stock> {
        self.book.ensure_initialized([stock.symbol]);
        self.stocks.insert(stock.symbol, stock)
    }

    /// Delist an instrument.
    ///
    /// Its resting orders stay in the book; executing them reports
    /// [`Error::UnknownInstrument`] until the symbol is registered again.
    pub fn remove_stock(&mut self, symbol: &Symbol) -> Option<Stock> {
        self.stocks.remove(symbol)
    }

    pub fn stock(&self, symbol: &Symbol) -> Option<&Stock> {
        self.stocks.get(symbol)
    }

    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.stocks.values()
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.stocks.keys().copied().collect();
        symbols.sort();
        symbols
    }

    /// Move an instrument's quote. Returns the previous quote.
    ///
    /// This is the quote source's only write path; evaluation is not run here.
    pub fn set_price(&mut self, symbol: &Symbol, price: Price) -> Result<Price> {
        if !price.is_positive() {
            return Err(ValidationError::ZeroPrice.into());
        }
        let stock = self
            .stocks
            .get_mut(symbol)
            .ok_or(Error::UnknownInstrument(*symbol))?;
        Ok(std::mem::replace(&mut stock.price, price))
    }

    // === Order book ===

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Replace the order book (e.g. after loading a saved one).
    ///
    /// Registered instruments missing from `book` get an empty sequence.
    pub fn set_book(&mut self, book: OrderBook) {
        self.book = book;
        self.book.ensure_initialized(self.stocks.keys().copied());
    }

    /// Resting orders for a symbol; empty if the symbol has no sequence.
    pub fn resting_orders(&self, symbol: &Symbol) -> &[Order] {
        self.book.orders_for(symbol).unwrap_or_default()
    }

    /// When set, fills are not sent to the notification sink.
    /// Buy-side failures are always sent.
    pub fn set_suppress_fill_notifications(&mut self, suppress: bool) {
        self.suppress_fill_notifications = suppress;
    }

    pub fn suppress_fill_notifications(&self) -> bool {
        self.suppress_fill_notifications
    }

    /// Place a resting order. It is evaluated on the next processing pass.
    pub fn place(
        &mut self,
        symbol: &Symbol,
        order_type: OrderType,
        position: PositionType,
        price: Price,
        shares: Quantity,
    ) -> Result<OrderId> {
        let stock = self
            .stocks
            .get(symbol)
            .ok_or(Error::UnknownInstrument(*symbol))?;
        if shares == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }
        if !price.is_positive() {
            return Err(ValidationError::ZeroPrice.into());
        }
        if shares > stock.max_shares {
            return Err(ValidationError::ExceedsMaxShares {
                max: stock.max_shares,
            }
            .into());
        }

        let id = self.book.next_id();
        self.book
            .insert(Order::new(id, *symbol, order_type, position, price, shares));
        debug!("placed {id}: {order_type} ({position}) {shares} {symbol} @ {price}");
        Ok(id)
    }

    /// Cancel a resting order. Uses the same identity-based removal as fills.
    pub fn cancel(&mut self, symbol: &Symbol, id: OrderId) -> Result<Order> {
        let order = self.book.remove(symbol, id)?;
        debug!("cancelled {id} for {symbol}");
        Ok(order)
    }

    // === Evaluation ===

    /// Evaluate one (class, side) pair for a symbol against its current quote.
    ///
    /// Every resting order of exactly that class and side whose trigger
    /// condition holds is executed; all others are left untouched. A symbol
    /// with no order sequence is logged and treated as empty.
    pub fn process_orders<T, S>(
        &mut self,
        symbol: &Symbol,
        order_type: OrderType,
        position: PositionType,
        trader: &mut T,
        sink: &mut S,
    ) -> Result<ProcessReport>
    where
        T: Trader + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let quote = self
            .stocks
            .get(symbol)
            .map(|s| s.price)
            .ok_or(Error::UnknownInstrument(*symbol))?;

        let resting = match self.book.orders_for(symbol) {
            Ok(orders) => orders,
            Err(e) => {
                warn!("{e}; treating as empty");
                return Ok(ProcessReport::default());
            }
        };

        let candidates: Vec<&Order> = resting
            .iter()
            .filter(|o| o.is_class(order_type, position))
            .collect();
        let mut report = ProcessReport {
            examined: candidates.len(),
            ..Default::default()
        };

        // Snapshot before executing: fills remove from the sequence we scanned.
        let triggered: Vec<Order> = candidates
            .into_iter()
            .filter(|o| trigger::order_fires(o, quote))
            .cloned()
            .collect();
        report.triggered = triggered.len();

        for order in &triggered {
            debug!(
                "{} triggered: {order_type} ({position}) @ {} vs quote {quote}",
                order.id, order.price
            );
            match self.execute_order(order, trader, sink) {
                Ok(outcome) => report.record(outcome),
                Err(e @ Error::UnknownInstrument(_)) => {
                    warn!("{e}; {} stays resting", order.id);
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Evaluate every class and side for one symbol.
    pub fn process_symbol<T, S>(
        &mut self,
        symbol: &Symbol,
        trader: &mut T,
        sink: &mut S,
    ) -> Result<ProcessReport>
    where
        T: Trader + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let mut report = ProcessReport::default();
        for order_type in OrderType::ALL {
            for position in PositionType::ALL {
                report += self.process_orders(symbol, order_type, position, trader, sink)?;
            }
        }
        Ok(report)
    }

    /// Evaluate every registered symbol, in symbol order.
    pub fn process_all<T, S>(&mut self, trader: &mut T, sink: &mut S) -> Result<ProcessReport>
    where
        T: Trader + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let mut report = ProcessReport::default();
        for symbol in self.symbols() {
            report += self.process_symbol(&symbol, trader, sink)?;
        }
        Ok(report)
    }

    /// Execute a resting order now, regardless of its trigger condition.
    pub fn execute<T, S>(
        &mut self,
        symbol: &Symbol,
        id: OrderId,
        trader: &mut T,
        sink: &mut S,
    ) -> Result<ExecutionOutcome>
    where
        T: Trader + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let order = self
            .book
            .get(symbol, id)
            .cloned()
            .ok_or(Error::OrderNotFound { symbol: *symbol, id })?;
        self.execute_order(&order, trader, sink)
    }

    /// Trade, then remove and notify on success; leave resting on failure.
    fn execute_order<T, S>(
        &mut self,
        order: &Order,
        trader: &mut T,
        sink: &mut S,
    ) -> Result<ExecutionOutcome>
    where
        T: Trader + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let stock = self
            .stocks
            .get(&order.symbol)
            .ok_or(Error::UnknownInstrument(order.symbol))?;

        let side = order.order_type.side();
        let traded = trader.trade(
            side,
            order.position,
            stock,
            order.shares,
            None,
            TradeOptions::SILENT,
        );

        match traded {
            Ok(()) => match self.book.remove(&order.symbol, order.id) {
                Ok(_) => {
                    info!(
                        "{} filled: {} ({}) {} {} @ {}",
                        order.id, order.order_type, order.position, order.shares, order.symbol,
                        order.price
                    );
                    if !self.suppress_fill_notifications {
                        sink.notify(OrderEvent::filled(order));
                    }
                    Ok(ExecutionOutcome::Filled)
                }
                Err(e) => {
                    error!("{e}; trade already executed for {order:?}");
                    Ok(ExecutionOutcome::FilledUntracked)
                }
            },
            Err(reason) => {
                match side {
                    Side::Buy => sink.notify(OrderEvent::failed(order, reason)),
                    // Sell-side failures are not reported to the user.
                    Side::Sell => debug!("{} not executed: {reason}", order.id),
                }
                Ok(ExecutionOutcome::Rejected(reason))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::inconsistent_digit_grouping)]
mod tests {
    use super::*;
    use crate::TradeRejection;

    /// Trader that answers every primitive with a fixed result and counts calls.
    struct FixedTrader {
        result: std::result::Result<(), TradeRejection>,
        calls: usize,
    }

    impl FixedTrader {
        fn ok() -> Self {
            Self { result: Ok(()), calls: 0 }
        }
        fn rejecting(reason: TradeRejection) -> Self {
            Self { result: Err(reason), calls: 0 }
        }
        fn answer(&mut self) -> std::result::Result<(), TradeRejection> {
            self.calls += 1;
            self.result
        }
    }

    impl Trader for FixedTrader {
        fn buy_long(&mut self, _: &Stock, _: Quantity, _: Option<Price>, _: TradeOptions) -> std::result::Result<(), TradeRejection> {
            self.answer()
        }
        fn open_short(&mut self, _: &Stock, _: Quantity, _: Option<Price>, _: TradeOptions) -> std::result::Result<(), TradeRejection> {
            self.answer()
        }
        fn sell_long(&mut self, _: &Stock, _: Quantity, _: Option<Price>, _: TradeOptions) -> std::result::Result<(), TradeRejection> {
            self.answer()
        }
        fn cover_short(&mut self, _: &Stock, _: Quantity, _: Option<Price>, _: TradeOptions) -> std::result::Result<(), TradeRejection> {
            self.answer()
        }
    }

    fn ecp() -> Symbol {
        Symbol::new("ECP")
    }

    fn market(quote: i64) -> Market {
        Market::with_stocks([Stock::new(ecp(), "ECorp", Price(quote), 1_000_000)])
    }

    #[test]
    fn place_validates() {
        let mut m = market(50_00);
        let err = m
            .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 0)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOrder(ValidationError::ZeroQuantity)));

        let err = m
            .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(0), 10)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOrder(ValidationError::ZeroPrice)));

        let err = m
            .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(1), 2_000_000)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidOrder(ValidationError::ExceedsMaxShares { max: 1_000_000 })
        ));

        let err = m
            .place(&Symbol::new("NOPE"), OrderType::LimitBuy, PositionType::Long, Price(1), 1)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownInstrument(_)));
        assert!(m.book().is_empty());
    }

    #[test]
    fn fill_removes_and_notifies_at_trigger_price() {
        let mut m = market(45_00);
        let id = m
            .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 10)
            .unwrap();
        let mut trader = FixedTrader::ok();
        let mut events: Vec<OrderEvent> = Vec::new();

        let report = m
            .process_orders(&ecp(), OrderType::LimitBuy, PositionType::Long, &mut trader, &mut events)
            .unwrap();

        assert_eq!(report.filled, 1);
        assert_eq!(trader.calls, 1);
        assert!(!m.book().contains(id));
        assert!(matches!(events[0], OrderEvent::Filled { price: Price(50_00), .. }));
    }

    #[test]
    fn other_classes_are_not_touched() {
        let mut m = market(45_00);
        m.place(&ecp(), OrderType::LimitBuy, PositionType::Short, Price(40_00), 10)
            .unwrap();
        m.place(&ecp(), OrderType::StopBuy, PositionType::Long, Price(40_00), 10)
            .unwrap();
        let mut trader = FixedTrader::ok();
        let mut events: Vec<OrderEvent> = Vec::new();

        let report = m
            .process_orders(&ecp(), OrderType::LimitBuy, PositionType::Long, &mut trader, &mut events)
            .unwrap();

        assert_eq!(report, ProcessReport::default());
        assert_eq!(trader.calls, 0);
        assert_eq!(m.book().len(), 2);
    }

    #[test]
    fn several_triggered_orders_all_execute_once() {
        let mut m = market(45_00);
        let ids: Vec<OrderId> = (0..5)
            .map(|i| {
                m.place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(46_00 + i), 1)
                    .unwrap()
            })
            .collect();
        let mut trader = FixedTrader::ok();
        let mut events: Vec<OrderEvent> = Vec::new();

        let report = m
            .process_orders(&ecp(), OrderType::LimitBuy, PositionType::Long, &mut trader, &mut events)
            .unwrap();

        assert_eq!(report.triggered, 5);
        assert_eq!(trader.calls, 5);
        assert_eq!(events.len(), 5);
        assert!(ids.iter().all(|id| !m.book().contains(*id)));
    }

    #[test]
    fn suppressed_fills_skip_the_sink_but_failures_do_not() {
        let mut m = market(45_00);
        m.set_suppress_fill_notifications(true);
        m.place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 1)
            .unwrap();
        let mut events: Vec<OrderEvent> = Vec::new();

        m.process_symbol(&ecp(), &mut FixedTrader::ok(), &mut events)
            .unwrap();
        assert!(events.is_empty());

        m.place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 1)
            .unwrap();
        m.process_symbol(
            &ecp(),
            &mut FixedTrader::rejecting(TradeRejection::InsufficientFunds),
            &mut events,
        )
        .unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_fill());
    }

    #[test]
    fn delisted_instrument_is_skipped_and_order_stays() {
        let mut m = market(45_00);
        let id = m
            .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 1)
            .unwrap();
        m.remove_stock(&ecp());
        let mut trader = FixedTrader::ok();
        let mut events: Vec<OrderEvent> = Vec::new();

        let err = m.execute(&ecp(), id, &mut trader, &mut events).unwrap_err();
        assert!(matches!(err, Error::UnknownInstrument(_)));
        assert_eq!(trader.calls, 0);
        assert!(m.book().contains(id));

        let err = m
            .process_symbol(&ecp(), &mut trader, &mut events)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownInstrument(_)));
    }

    #[test]
    fn missing_sequence_is_treated_as_empty() {
        let mut m = market(45_00);
        m.book = OrderBook::new();
        let report = m
            .process_orders(
                &ecp(),
                OrderType::LimitBuy,
                PositionType::Long,
                &mut FixedTrader::ok(),
                &mut Vec::<OrderEvent>::new(),
            )
            .unwrap();
        assert_eq!(report, ProcessReport::default());
    }

    #[test]
    fn execute_unknown_order() {
        let mut m = market(45_00);
        let err = m
            .execute(&ecp(), OrderId(99), &mut FixedTrader::ok(), &mut Vec::<OrderEvent>::new())
            .unwrap_err();
        assert!(matches!(err, Error::OrderNotFound { .. }));
    }

    #[test]
    fn fill_of_order_missing_from_book_is_untracked() {
        let mut m = market(45_00);
        let resting = m
            .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(40_00), 10)
            .unwrap();
        let before = m.resting_orders(&ecp()).to_vec();
        let stray = Order::new(
            OrderId(99),
            ecp(),
            OrderType::LimitBuy,
            PositionType::Long,
            Price(50_00),
            10,
        );

        let mut trader = FixedTrader::ok();
        let mut events: Vec<OrderEvent> = Vec::new();
        let outcome = m.execute_order(&stray, &mut trader, &mut events).unwrap();

        assert_eq!(outcome, ExecutionOutcome::FilledUntracked);
        assert!(outcome.is_fill());
        assert_eq!(trader.calls, 1);
        assert!(events.is_empty());
        assert_eq!(m.resting_orders(&ecp()), before.as_slice());
        assert!(m.book().contains(resting));
    }

    #[test]
    fn set_price_returns_previous_quote() {
        let mut m = market(45_00);
        assert_eq!(m.set_price(&ecp(), Price(47_00)).unwrap(), Price(45_00));
        assert_eq!(m.stock(&ecp()).unwrap().price, Price(47_00));
        assert!(m.set_price(&ecp(), Price(0)).is_err());
        assert!(m.set_price(&Symbol::new("ZZ"), Price(1)).is_err());
    }

    #[test]
    fn cancel_removes_by_identity() {
        let mut m = market(45_00);
        let a = m
            .place(&ecp(), OrderType::StopSell, PositionType::Long, Price(40_00), 5)
            .unwrap();
        let b = m
            .place(&ecp(), OrderType::StopSell, PositionType::Long, Price(40_00), 5)
            .unwrap();

        let cancelled = m.cancel(&ecp(), b).unwrap();
        assert_eq!(cancelled.id, b);
        assert_eq!(m.resting_orders(&ecp()).len(), 1);
        assert_eq!(m.resting_orders(&ecp())[0].id, a);
        assert!(m.cancel(&ecp(), b).is_err());
    }

    #[test]
    fn add_stock_seeds_book() {
        let mut m = Market::new();
        assert!(m.add_stock(Stock::new(ecp(), "ECorp", Price(1_00), 10)).is_none());
        assert!(m.book().has_symbol(&ecp()));
        assert_eq!(m.symbols(), vec![ecp()]);
    }
}
