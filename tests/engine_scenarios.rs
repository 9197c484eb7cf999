// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! End-to-end scenarios: place, quote, process, inspect book and notifications.

use tixbook::{
    Market, OrderBook, OrderEvent, OrderId, OrderType, PositionType, Price, ProcessReport,
    Quantity, SimAccount, Stock, Symbol, TradeOptions, TradeRejection, Trader,
};

/// Trader with a scripted answer that records every call it receives.
struct ScriptedTrader {
    answer: Result<(), TradeRejection>,
    calls: Vec<(&'static str, Symbol, Quantity, TradeOptions)>,
}

impl ScriptedTrader {
    fn accepting() -> Self {
        Self {
            answer: Ok(()),
            calls: Vec::new(),
        }
    }

    fn rejecting(reason: TradeRejection) -> Self {
        Self {
            answer: Err(reason),
            calls: Vec::new(),
        }
    }

    fn call(
        &mut self,
        name: &'static str,
        stock: &Stock,
        shares: Quantity,
        opts: TradeOptions,
    ) -> Result<(), TradeRejection> {
        self.calls.push((name, stock.symbol, shares, opts));
        self.answer
    }
}

impl Trader for ScriptedTrader {
    fn buy_long(&mut self, stock: &Stock, shares: Quantity, _: Option<Price>, opts: TradeOptions) -> Result<(), TradeRejection> {
        self.call("buy_long", stock, shares, opts)
    }
    fn open_short(&mut self, stock: &Stock, shares: Quantity, _: Option<Price>, opts: TradeOptions) -> Result<(), TradeRejection> {
        self.call("open_short", stock, shares, opts)
    }
    fn sell_long(&mut self, stock: &Stock, shares: Quantity, _: Option<Price>, opts: TradeOptions) -> Result<(), TradeRejection> {
        self.call("sell_long", stock, shares, opts)
    }
    fn cover_short(&mut self, stock: &Stock, shares: Quantity, _: Option<Price>, opts: TradeOptions) -> Result<(), TradeRejection> {
        self.call("cover_short", stock, shares, opts)
    }
}

fn ecp() -> Symbol {
    Symbol::new("ECP")
}

fn market_at(quote: i64) -> Market {
    Market::with_stocks([Stock::new(ecp(), "ECorp", Price(quote), 1_000_000)])
}

// ============================================================================
// Trigger table, through the full evaluation path
// ============================================================================

#[test]
fn every_row_fires_once_when_satisfied_and_rests_otherwise() {
    use OrderType::*;
    use PositionType::*;

    // (class, side, trigger, firing quote, resting quote, primitive)
    let rows = [
        (LimitBuy, Long, 50_00, 45_00, 55_00, "buy_long"),
        (LimitBuy, Short, 50_00, 55_00, 45_00, "open_short"),
        (LimitSell, Long, 50_00, 55_00, 45_00, "sell_long"),
        (LimitSell, Short, 50_00, 45_00, 55_00, "cover_short"),
        (StopBuy, Long, 50_00, 55_00, 45_00, "buy_long"),
        (StopBuy, Short, 50_00, 45_00, 55_00, "open_short"),
        (StopSell, Long, 50_00, 45_00, 55_00, "sell_long"),
        (StopSell, Short, 50_00, 55_00, 45_00, "cover_short"),
    ];

    for (ty, pos, trigger, firing, resting, primitive) in rows {
        // Not satisfied: order untouched, no trade attempted
        let mut m = market_at(resting);
        let id = m.place(&ecp(), ty, pos, Price(trigger), 10).unwrap();
        let mut trader = ScriptedTrader::accepting();
        let mut events: Vec<OrderEvent> = Vec::new();
        let report = m
            .process_orders(&ecp(), ty, pos, &mut trader, &mut events)
            .unwrap();
        assert_eq!(report.triggered, 0, "{ty} {pos} should rest at {resting}");
        assert!(trader.calls.is_empty());
        assert!(m.book().contains(id));

        // Satisfied: exactly one attempt on the matching primitive
        m.set_price(&ecp(), Price(firing)).unwrap();
        let report = m
            .process_orders(&ecp(), ty, pos, &mut trader, &mut events)
            .unwrap();
        assert_eq!(report.triggered, 1, "{ty} {pos} should fire at {firing}");
        assert_eq!(trader.calls.len(), 1);
        assert_eq!(trader.calls[0].0, primitive);
        assert_eq!(trader.calls[0].2, 10);
        assert!(trader.calls[0].3.suppress_dialog);
        assert!(!m.book().contains(id));
    }
}

// ============================================================================
// Worked scenarios
// ============================================================================

#[test]
fn limit_buy_long_fills_at_trigger_price() {
    let mut m = market_at(45_00);
    let id = m
        .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 100)
        .unwrap();
    let mut events: Vec<OrderEvent> = Vec::new();

    m.process_orders(
        &ecp(),
        OrderType::LimitBuy,
        PositionType::Long,
        &mut ScriptedTrader::accepting(),
        &mut events,
    )
    .unwrap();

    assert_eq!(m.book().orders_for(&ecp()).unwrap().iter().filter(|o| o.id == id).count(), 0);
    assert_eq!(
        events,
        vec![OrderEvent::Filled {
            order_type: OrderType::LimitBuy,
            symbol: ecp(),
            price: Price(50_00),
            position: PositionType::Long,
            shares: 100,
        }]
    );
}

#[test]
fn stop_sell_short_fires_above_and_rests_below() {
    let mut m = market_at(29_00);
    let id = m
        .place(&ecp(), OrderType::StopSell, PositionType::Short, Price(30_00), 10)
        .unwrap();
    let mut trader = ScriptedTrader::accepting();
    let mut events: Vec<OrderEvent> = Vec::new();

    m.process_symbol(&ecp(), &mut trader, &mut events).unwrap();
    assert!(m.book().contains(id));
    assert!(events.is_empty());

    m.set_price(&ecp(), Price(31_00)).unwrap();
    m.process_symbol(&ecp(), &mut trader, &mut events).unwrap();
    assert!(!m.book().contains(id));
    assert_eq!(events.len(), 1);
}

#[test]
fn failed_buy_rests_unchanged_and_notifies() {
    let mut m = market_at(45_00);
    let id = m
        .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 100)
        .unwrap();
    let before = m.book().get(&ecp(), id).cloned().unwrap();
    let mut events: Vec<OrderEvent> = Vec::new();

    let report = m
        .process_symbol(
            &ecp(),
            &mut ScriptedTrader::rejecting(TradeRejection::InsufficientFunds),
            &mut events,
        )
        .unwrap();

    assert_eq!(report.rejected, 1);
    assert_eq!(m.book().get(&ecp(), id), Some(&before));
    assert_eq!(
        events,
        vec![OrderEvent::Failed {
            order_type: OrderType::LimitBuy,
            symbol: ecp(),
            price: Price(50_00),
            position: PositionType::Long,
            reason: TradeRejection::InsufficientFunds,
        }]
    );
}

/// Sell-side failures are not reported to the user; only buy-side failures are.
#[test]
fn failed_sell_rests_unchanged_and_is_silent() {
    let mut m = market_at(55_00);
    let id = m
        .place(&ecp(), OrderType::LimitSell, PositionType::Long, Price(50_00), 100)
        .unwrap();
    let mut events: Vec<OrderEvent> = Vec::new();

    let report = m
        .process_symbol(
            &ecp(),
            &mut ScriptedTrader::rejecting(TradeRejection::InsufficientPosition),
            &mut events,
        )
        .unwrap();

    assert_eq!(report.rejected, 1);
    assert!(m.book().contains(id));
    assert!(events.is_empty());
}

#[test]
fn rejected_order_retries_next_pass() {
    let mut m = market_at(45_00);
    let id = m
        .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 100)
        .unwrap();
    let mut events: Vec<OrderEvent> = Vec::new();

    m.process_symbol(
        &ecp(),
        &mut ScriptedTrader::rejecting(TradeRejection::ExceedsMaxShares),
        &mut events,
    )
    .unwrap();
    m.process_symbol(&ecp(), &mut ScriptedTrader::accepting(), &mut events)
        .unwrap();

    assert!(!m.book().contains(id));
    assert_eq!(events.len(), 2);
    assert!(!events[0].is_fill());
    assert!(events[1].is_fill());
}

// ============================================================================
// Idempotence and bootstrap
// ============================================================================

#[test]
fn no_matching_orders_mutates_nothing() {
    let mut m = market_at(45_00);
    m.place(&ecp(), OrderType::StopBuy, PositionType::Long, Price(60_00), 5)
        .unwrap();
    let before: Vec<_> = m.resting_orders(&ecp()).to_vec();
    let mut trader = ScriptedTrader::accepting();
    let mut events: Vec<OrderEvent> = Vec::new();

    let report = m
        .process_orders(&ecp(), OrderType::LimitSell, PositionType::Short, &mut trader, &mut events)
        .unwrap();

    assert_eq!(report, ProcessReport::default());
    assert_eq!(m.resting_orders(&ecp()), before.as_slice());
    assert!(events.is_empty());
    assert!(trader.calls.is_empty());
}

#[test]
fn bootstrap_yields_empty_sequences_and_processes_nothing() {
    let (a, b, c) = (Symbol::new("A"), Symbol::new("B"), Symbol::new("C"));
    let mut m = Market::with_stocks([
        Stock::new(a, "Alpha", Price(1_00), 100),
        Stock::new(b, "Beta", Price(2_00), 100),
        Stock::new(c, "Gamma", Price(3_00), 100),
    ]);

    for sym in [a, b, c] {
        assert_eq!(m.book().orders_for(&sym).unwrap().len(), 0);
    }

    let mut trader = ScriptedTrader::accepting();
    let report = m.process_all(&mut trader, &mut Vec::<OrderEvent>::new()).unwrap();
    assert_eq!(report, ProcessReport::default());
    assert!(trader.calls.is_empty());

    let mut bare = OrderBook::new();
    assert!(bare.ensure_initialized([a, b, c]));
    assert!(!bare.ensure_initialized([a, b, c]));
}

// ============================================================================
// With the reference account
// ============================================================================

#[test]
fn long_round_trip_with_sim_account() {
    let mut m = market_at(60_00);
    let mut account = SimAccount::new(Price(100_000_00)).with_commission(Price(10_00));
    let mut events: Vec<OrderEvent> = Vec::new();

    m.place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 1_000)
        .unwrap();
    m.place(&ecp(), OrderType::StopSell, PositionType::Long, Price(40_00), 1_000)
        .unwrap();

    // Falls to the limit: the buy fills at the live quote
    m.set_price(&ecp(), Price(50_00)).unwrap();
    m.process_symbol(&ecp(), &mut account, &mut events).unwrap();
    assert_eq!(account.holding(&ecp()).long_shares, 1_000);
    assert_eq!(account.cash(), Price(49_990_00));

    // Falls through the stop: the protective sell fills
    m.set_price(&ecp(), Price(39_00)).unwrap();
    m.process_symbol(&ecp(), &mut account, &mut events).unwrap();
    assert!(account.holding(&ecp()).is_flat());
    assert_eq!(account.cash(), Price(88_980_00));

    assert!(m.book().is_empty());
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(OrderEvent::is_fill));
}

#[test]
fn short_stop_covers_on_rally() {
    let mut m = market_at(50_00);
    let mut account = SimAccount::new(Price(10_000_00));
    let mut events: Vec<OrderEvent> = Vec::new();

    m.place(&ecp(), OrderType::LimitBuy, PositionType::Short, Price(50_00), 100)
        .unwrap();
    m.process_symbol(&ecp(), &mut account, &mut events).unwrap();
    assert_eq!(account.holding(&ecp()).short_shares, 100);

    // Protective stop on the short: covers once the quote rallies to 55
    let stop = m
        .place(&ecp(), OrderType::StopSell, PositionType::Short, Price(55_00), 100)
        .unwrap();
    m.set_price(&ecp(), Price(56_00)).unwrap();
    m.process_symbol(&ecp(), &mut account, &mut events).unwrap();

    assert!(!m.book().contains(stop));
    assert_eq!(account.holding(&ecp()).short_shares, 0);
    // 10_000 - 5_000 stake + (2 * 50 - 56) * 100
    assert_eq!(account.cash(), Price(9_400_00));
}

#[test]
fn orders_on_other_symbols_are_independent() {
    let jgn = Symbol::new("JGN");
    let mut m = Market::with_stocks([
        Stock::new(ecp(), "ECorp", Price(45_00), 1_000),
        Stock::new(jgn, "Joes Guns", Price(45_00), 1_000),
    ]);
    let on_ecp = m
        .place(&ecp(), OrderType::LimitBuy, PositionType::Long, Price(50_00), 1)
        .unwrap();
    let on_jgn = m
        .place(&jgn, OrderType::LimitBuy, PositionType::Long, Price(50_00), 1)
        .unwrap();

    m.process_symbol(&ecp(), &mut ScriptedTrader::accepting(), &mut Vec::<OrderEvent>::new())
        .unwrap();

    assert!(!m.book().contains(on_ecp));
    assert!(m.book().contains(on_jgn));
    assert_ne!(on_ecp, on_jgn);
    assert_eq!(m.book().get(&jgn, on_jgn).map(|o| o.id), Some(OrderId(2)));
}
