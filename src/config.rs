//! TOML configuration loading and validation.
//!
//! Describes the instruments of a simulated market and the account that
//! trades in it:
//!
//! ```toml
//! [engine]
//! suppress_fill_notifications = false
//!
//! [account]
//! starting_cash = 1000000.0
//! commission = 100.0
//!
//! [[stocks]]
//! symbol = "ECP"
//! name = "ECorp"
//! price = 50.0
//! max_shares = 10000
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Market, Price, Quantity, Result, SimAccount, Stock, Symbol};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub stocks: Vec<StockConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineSection {
    /// Do not send fill notifications to the sink.
    #[serde(default)]
    pub suppress_fill_notifications: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Dollars
    #[serde(default = "default_starting_cash")]
    pub starting_cash: f64,
    /// Dollars per trade
    #[serde(default = "default_commission")]
    pub commission: f64,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            starting_cash: default_starting_cash(),
            commission: default_commission(),
        }
    }
}

fn default_starting_cash() -> f64 {
    1_000_000.0
}
fn default_commission() -> f64 {
    100.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockConfig {
    pub symbol: Symbol,
    #[serde(default)]
    pub name: String,
    /// Opening quote in dollars
    pub price: f64,
    #[serde(default = "default_max_shares")]
    pub max_shares: Quantity,
}

fn default_max_shares() -> Quantity {
    100_000
}

impl EngineConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate config from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.account.starting_cash < 0.0 {
            return Err(Error::Config("starting_cash must be >= 0".into()));
        }
        if self.account.commission < 0.0 {
            return Err(Error::Config("commission must be >= 0".into()));
        }
        for (i, stock) in self.stocks.iter().enumerate() {
            if !Price::from_dollars(stock.price).is_positive() {
                return Err(Error::Config(format!(
                    "stock {}: price must be > 0",
                    stock.symbol
                )));
            }
            if stock.max_shares == 0 {
                return Err(Error::Config(format!(
                    "stock {}: max_shares must be > 0",
                    stock.symbol
                )));
            }
            if self.stocks[..i].iter().any(|s| s.symbol == stock.symbol) {
                return Err(Error::Config(format!(
                    "stock {} is listed twice",
                    stock.symbol
                )));
            }
        }
        Ok(())
    }

    /// Build a market with every configured stock and an empty book.
    pub fn build_market(&self) -> Market {
        let mut market = Market::with_stocks(self.stocks.iter().map(|s| {
            let name = if s.name.is_empty() {
                s.symbol.to_string()
            } else {
                s.name.clone()
            };
            Stock::new(s.symbol, name, Price::from_dollars(s.price), s.max_shares)
        }));
        market.set_suppress_fill_notifications(self.engine.suppress_fill_notifications);
        market
    }

    /// Build the configured trading account.
    pub fn build_account(&self) -> SimAccount {
        SimAccount::new(Price::from_dollars(self.account.starting_cash))
            .with_commission(Price::from_dollars(self.account.commission))
    }
}
