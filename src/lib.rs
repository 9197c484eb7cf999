// Allow our dollar.cents digit grouping convention (e.g., 100_00 = $100.00)
#![allow(clippy::inconsistent_digit_grouping)]

//! # tixbook
//!
//! A deterministic resting-order engine for simulated stock markets.
//!
//! A single player trades against a house-quoted price. Limit and stop
//! orders rest in an [`OrderBook`] until the quote reaches their trigger
//! price; then the [`Market`] executes them through a [`Trader`] and reports
//! the outcome to a [`NotificationSink`].
//!
//! ## Features
//!
//! - **Order classes**: Limit Buy, Limit Sell, Stop Buy, Stop Sell
//! - **Position sides**: Long and Short, each with its own trigger direction
//! - **All-or-nothing execution**: no partial fills
//! - **Fixed-point prices**: integer cents, exact trigger comparisons
//!
//! ## Quick Start
//!
//! ```
//! use tixbook::{Market, OrderEvent, OrderType, PositionType, Price, SimAccount, Stock, Symbol};
//!
//! let ecp = Symbol::new("ECP");
//! let mut market = Market::with_stocks([Stock::new(ecp, "ECorp", Price(60_00), 100_000)]);
//! let mut account = SimAccount::new(Price(1_000_000_00));
//! let mut events: Vec<OrderEvent> = Vec::new();
//!
//! // Buy 1,000 shares once the quote is at or below $50
//! let id = market
//!     .place(&ecp, OrderType::LimitBuy, PositionType::Long, Price(50_00), 1_000)
//!     .unwrap();
//!
//! let report = market.process_symbol(&ecp, &mut account, &mut events).unwrap();
//! assert!(report.is_quiet());
//!
//! // The quote generator moves the price; the next pass fills the order
//! market.set_price(&ecp, Price(45_00)).unwrap();
//! market.process_symbol(&ecp, &mut account, &mut events).unwrap();
//!
//! assert!(market.book().get(&ecp, id).is_none());
//! assert_eq!(account.holding(&ecp).long_shares, 1_000);
//! assert_eq!(
//!     events[0].to_string(),
//!     "Limit Buy Order for ECP @ $50.00 (Long) was filled (1,000 shares)"
//! );
//! ```
//!
//! ## Trigger Table
//!
//! | Class | Long | Short |
//! |-------|------|-------|
//! | **Limit Buy** | quote ≤ trigger | quote ≥ trigger |
//! | **Limit Sell** | quote ≥ trigger | quote ≤ trigger |
//! | **Stop Buy** | quote ≥ trigger | quote ≤ trigger |
//! | **Stop Sell** | quote ≤ trigger | quote ≥ trigger |
//!
//! ## Failures
//!
//! A triggered order whose trade is refused stays in the book unchanged and
//! is tried again on the next pass. Buy-side refusals are reported as
//! [`OrderEvent::Failed`]; sell-side refusals are not reported.
//!
//! ```
//! use tixbook::{Market, OrderEvent, OrderType, PositionType, Price, SimAccount, Stock, Symbol};
//!
//! let ecp = Symbol::new("ECP");
//! let mut market = Market::with_stocks([Stock::new(ecp, "ECorp", Price(45_00), 100_000)]);
//! let mut broke = SimAccount::new(Price(10_00));
//! let mut events: Vec<OrderEvent> = Vec::new();
//!
//! let id = market
//!     .place(&ecp, OrderType::LimitBuy, PositionType::Long, Price(50_00), 1_000)
//!     .unwrap();
//! market.process_symbol(&ecp, &mut broke, &mut events).unwrap();
//!
//! assert!(market.book().get(&ecp, id).is_some());
//! assert!(matches!(events[0], OrderEvent::Failed { .. }));
//! ```

mod account;
mod book;
#[cfg(feature = "config")]
pub mod config;
mod error;
mod event;
mod market;
mod order;
#[cfg(feature = "persistence")]
pub mod persistence;
mod result;
mod side;
mod stock;
mod trader;
pub mod trigger;
mod types;

// Re-export public API
pub use account::{Holding, SimAccount};
pub use book::OrderBook;
pub use error::{Error, Result, ValidationError};
pub use event::{LogSink, NotificationSink, OrderEvent};
pub use market::Market;
pub use order::{Order, OrderType};
pub use result::{ExecutionOutcome, ProcessReport};
pub use side::{PositionType, Side};
pub use stock::Stock;
pub use trader::{TradeOptions, TradeRejection, Trader};
pub use types::{OrderId, Price, Quantity, Symbol};
