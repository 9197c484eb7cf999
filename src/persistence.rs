//! File-based persistence of resting orders as JSON Lines.
//!
//! One order per line, sorted by id. Order classes are stored by label
//! (`"Limit Buy Order"`) so a file written by a newer version with a class
//! this build does not know fails loudly with
//! [`Error::UnsupportedOrderClass`] instead of being dropped.
//!
//! ```ignore
//! market.save_orders(Path::new("orders.jsonl"))?;
//! let loaded = market.load_orders(Path::new("orders.jsonl"))?;
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{
    Error, Market, Order, OrderBook, OrderId, OrderType, PositionType, Price, Quantity, Result,
    Symbol,
};

#[derive(Debug, Serialize, Deserialize)]
struct StoredOrder {
    id: u64,
    symbol: Symbol,
    #[serde(rename = "type")]
    order_type: String,
    position: PositionType,
    price: Price,
    shares: Quantity,
}

impl From<&Order> for StoredOrder {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.0,
            symbol: order.symbol,
            order_type: order.order_type.label().to_string(),
            position: order.position,
            price: order.price,
            shares: order.shares,
        }
    }
}

impl TryFrom<StoredOrder> for Order {
    type Error = Error;

    fn try_from(stored: StoredOrder) -> Result<Self> {
        let order_type: OrderType = stored.order_type.parse()?;
        if stored.shares == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }
        if !stored.price.is_positive() {
            return Err(ValidationError::ZeroPrice.into());
        }
        Ok(Order::new(
            OrderId(stored.id),
            stored.symbol,
            order_type,
            stored.position,
            stored.price,
            stored.shares,
        ))
    }
}

/// Save every resting order to a file in JSON Lines format.
pub fn save_orders(book: &OrderBook, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);

    let mut orders: Vec<&Order> = book.iter().collect();
    orders.sort_by_key(|o| o.id);
    for order in orders {
        let json = serde_json::to_string(&StoredOrder::from(order))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)?;
    }

    writer.flush()?;
    Ok(())
}

/// Load resting orders from a JSON Lines file. Empty lines are skipped.
///
/// Ids must be unique across the whole file: removal is by id, so a repeated
/// id would let one fill take out a different order.
pub fn load_orders(path: &Path) -> Result<OrderBook> {
    let file = std::fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let mut book = OrderBook::new();
    let mut seen: FxHashSet<OrderId> = FxHashSet::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let stored: StoredOrder = serde_json::from_str(line).map_err(|e| Error::Parse {
            line: line_num + 1,
            source: e,
        })?;
        let order = Order::try_from(stored)?;
        if !seen.insert(order.id) {
            return Err(Error::DuplicateOrderId {
                line: line_num + 1,
                id: order.id,
            });
        }
        book.insert(order);
    }

    Ok(book)
}

impl Market {
    /// Save the market's resting orders to a file.
    pub fn save_orders(&self, path: &Path) -> Result<()> {
        save_orders(self.book(), path)
    }

    /// Replace the market's resting orders with those saved in a file.
    ///
    /// Returns the number of orders loaded. On error the current book is kept.
    /// Orders for registered stocks must respect the stock's share cap, as
    /// with [`Market::place`].
    pub fn load_orders(&mut self, path: &Path) -> Result<usize> {
        let book = load_orders(path)?;
        for order in book.iter() {
            let Some(stock) = self.stock(&order.symbol) else {
                continue;
            };
            if order.shares > stock.max_shares {
                return Err(ValidationError::ExceedsMaxShares {
                    max: stock.max_shares,
                }
                .into());
            }
        }
        let count = book.len();
        self.set_book(book);
        Ok(count)
    }
}
