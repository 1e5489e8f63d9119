//! Tradable contract definitions.

use serde::{Deserialize, Serialize};

/// Security type of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecType {
    /// Common stock.
    #[default]
    Stk,
    /// Exchange-traded fund (routed like a stock).
    Etf,
    /// Index.
    Ind,
}

impl SecType {
    /// Returns the brokerage security-type code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            // ETFs are listed under the stock security type by the broker.
            Self::Stk | Self::Etf => "STK",
            Self::Ind => "IND",
        }
    }
}

impl std::fmt::Display for SecType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contract to request bars for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Contract {
    symbol: String,
    sec_type: SecType,
    exchange: String,
    currency: String,
}

impl Contract {
    /// Creates a new contract.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        sec_type: SecType,
        exchange: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            sec_type,
            exchange: exchange.into(),
            currency: currency.into(),
        }
    }

    /// Creates a smart-routed USD stock contract.
    #[must_use]
    pub fn stock(symbol: impl Into<String>) -> Self {
        Self::new(symbol, SecType::Stk, "SMART", "USD")
    }

    /// Returns the ticker symbol (uppercase).
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the security type.
    #[must_use]
    pub const fn sec_type(&self) -> SecType {
        self.sec_type
    }

    /// Returns the routing exchange.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Returns the currency.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl std::fmt::Display for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_defaults() {
        let contract = Contract::stock("aapl");
        assert_eq!(contract.symbol(), "AAPL");
        assert_eq!(contract.exchange(), "SMART");
        assert_eq!(contract.currency(), "USD");
        assert_eq!(contract.sec_type().as_str(), "STK");
        assert_eq!(contract.to_string(), "AAPL");
    }

    #[test]
    fn test_etf_routes_as_stock() {
        let contract = Contract::new("spy", SecType::Etf, "ARCA", "USD");
        assert_eq!(contract.sec_type().as_str(), "STK");
    }
}
