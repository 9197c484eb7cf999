//! OrderBook: per-symbol sequences of resting orders.

use rustc_hash::FxHashMap;

use crate::{Error, Order, OrderId, Result, Symbol};

/// Resting orders keyed by instrument.
///
/// Each symbol owns one sequence in insertion order. Order within a sequence
/// has no triggering priority; it only matters for removal, which is always
/// by [`OrderId`].
#[derive(Clone, Debug, Default)]
pub struct OrderBook {
    orders: FxHashMap<Symbol, Vec<Order>>,
    next_order_id: u64,
}

impl OrderBook {
    /// Create an empty book with no symbols.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with an empty sequence for every given symbol.
    pub fn for_symbols<I: IntoIterator<Item = Symbol>>(symbols: I) -> Self {
        let mut book = Self::new();
        book.ensure_initialized(symbols);
        book
    }

    /// Make sure every symbol has a sequence.
    ///
    /// Returns `true` if the book had no sequences before this call (the
    /// bootstrap case). Never evaluates or executes anything.
    pub fn ensure_initialized<I: IntoIterator<Item = Symbol>>(&mut self, symbols: I) -> bool {
        let bootstrapped = self.orders.is_empty();
        for symbol in symbols {
            self.orders.entry(symbol).or_default();
        }
        bootstrapped
    }

    /// Allocate the next order identity.
    pub(crate) fn next_id(&mut self) -> OrderId {
        self.next_order_id += 1;
        OrderId(self.next_order_id)
    }

    /// Append an order to its symbol's sequence.
    ///
    /// Ids allocated by [`next_id`](Self::next_id) stay ahead of any
    /// inserted order, so reloaded books never hand out a duplicate.
    pub fn insert(&mut self, order: Order) {
        self.next_order_id = self.next_order_id.max(order.id.0);
        self.orders.entry(order.symbol).or_default().push(order);
    }

    /// Resting orders for a symbol, in insertion order.
    pub fn orders_for(&self, symbol: &Symbol) -> Result<&[Order]> {
        self.orders
            .get(symbol)
            .map(Vec::as_slice)
            .ok_or(Error::InvalidBookState(*symbol))
    }

    /// Remove the order with this identity from the symbol's sequence.
    pub fn remove(&mut self, symbol: &Symbol, id: OrderId) -> Result<Order> {
        let not_found = || Error::OrderNotFound {
            symbol: *symbol,
            id,
        };
        let orders = self.orders.get_mut(symbol).ok_or_else(not_found)?;
        let idx = orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(not_found)?;
        Ok(orders.remove(idx))
    }

    /// Look up a resting order by symbol and id.
    pub fn get(&self, symbol: &Symbol, id: OrderId) -> Option<&Order> {
        self.orders.get(symbol)?.iter().find(|o| o.id == id)
    }

    /// Returns true if an order with this id is resting anywhere in the book.
    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.values().flatten().any(|o| o.id == id)
    }

    /// Returns true if the symbol has a sequence (possibly empty).
    pub fn has_symbol(&self, symbol: &Symbol) -> bool {
        self.orders.contains_key(symbol)
    }

    /// Symbols that have a sequence.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.orders.keys()
    }

    /// All resting orders, grouped by symbol in no particular symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().flatten()
    }

    /// Total number of resting orders.
    pub fn len(&self) -> usize {
        self.orders.values().map(Vec::len).sum()
    }

    /// Returns true if no orders are resting.
    pub fn is_empty(&self) -> bool {
        self.orders.values().all(Vec::is_empty)
    }
}
