//! Error types for order placement, book access and execution.

use std::fmt;

use crate::{OrderId, Quantity, Symbol};

/// Errors returned by validated order placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationError {
    /// Quantity must be greater than zero.
    ZeroQuantity,
    /// Trigger price must be greater than zero.
    ZeroPrice,
    /// Quantity exceeds the instrument's tradeable share count.
    ExceedsMaxShares { max: Quantity },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ZeroQuantity => write!(f, "quantity must be greater than zero"),
            ValidationError::ZeroPrice => write!(f, "price must be greater than zero"),
            ValidationError::ExceedsMaxShares { max } => {
                write!(f, "quantity exceeds the maximum of {max} shares")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// All errors surfaced by the engine.
///
/// `InvalidBookState`, `UnknownInstrument` and `OrderNotFound` are recoverable:
/// the evaluator logs them and moves on. `UnsupportedOrderClass` is never
/// swallowed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no order sequence for {0} in the order book")]
    InvalidBookState(Symbol),

    #[error("order {id} not found in the order book for {symbol}")]
    OrderNotFound { symbol: Symbol, id: OrderId },

    #[error("unknown instrument: {0}")]
    UnknownInstrument(Symbol),

    #[error("unsupported order class: {0:?}")]
    UnsupportedOrderClass(String),

    #[error("invalid order: {0}")]
    InvalidOrder(#[from] ValidationError),

    #[cfg(feature = "config")]
    #[error("config error: {0}")]
    Config(String),

    #[cfg(feature = "config")]
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[cfg(feature = "config")]
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[cfg(feature = "persistence")]
    #[error("order book file error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "persistence")]
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[cfg(feature = "persistence")]
    #[error("line {line}: order {id} appears more than once")]
    DuplicateOrderId { line: usize, id: OrderId },
}

pub type Result<T> = std::result::Result<T, Error>;
