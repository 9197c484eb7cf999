//! Core types: Price, Quantity, Symbol, OrderId

use std::fmt;

/// Price in smallest units (cents).
///
/// `Price(10050)` represents $100.50. Quotes and trigger prices are always
/// positive; fixed-point keeps trigger comparisons exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Convert a dollar amount to cents, rounding to the nearest cent.
    pub fn from_dollars(dollars: f64) -> Price {
        Price((dollars * 100.0).round() as i64)
    }

    /// Dollar value as a float (for display and reporting only).
    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns true if this is a usable quote or trigger price.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = (self.0 / 100).unsigned_abs();
        let cents = (self.0 % 100).abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}${}.{cents:02}", group_thousands(dollars))
    }
}

/// Quantity of shares. Always positive for orders.
pub type Quantity = u64;

/// Render an integer with `,` thousands separators (e.g. `1,000,000`).
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Ticker symbol, stored inline (up to 8 ASCII bytes) so it is `Copy`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    bytes: [u8; Symbol::MAX_LEN],
    len: u8,
}

impl Symbol {
    /// Maximum symbol length in bytes.
    pub const MAX_LEN: usize = 8;

    /// Create a symbol from a string literal.
    ///
    /// # Panics
    ///
    /// Panics if `s` is empty, longer than [`Symbol::MAX_LEN`] or not ASCII.
    /// Use [`Symbol::try_new`] for untrusted input.
    pub fn new(s: &str) -> Self {
        match Self::try_new(s) {
            Some(sym) => sym,
            None => panic!("invalid symbol {s:?}: must be 1-8 ASCII bytes"),
        }
    }

    /// Create a symbol, returning `None` if `s` is empty, too long or not ASCII.
    pub fn try_new(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > Self::MAX_LEN || !s.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; Self::MAX_LEN];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Some(Self {
            bytes,
            len: s.len() as u8,
        })
    }

    /// The symbol as a string slice.
    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII input.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Symbol {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Symbol {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Symbol::try_new(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid symbol {s:?}")))
    }
}

/// Identity of a resting order, allocated by the book.
///
/// Two orders with identical fields but different ids are different orders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}
