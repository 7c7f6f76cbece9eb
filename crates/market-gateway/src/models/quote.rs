use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Real-time quote snapshot for a single symbol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol the quote belongs to
    pub symbol: String,

    /// Timestamp of the quote as reported by the vendor
    pub timestamp: DateTime<Utc>,

    /// Best bid (optional for vendors without depth)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,

    /// Best ask (optional for vendors without depth)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,

    /// Last traded price (required)
    pub last: Decimal,

    /// Session volume (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Quote currency
    pub currency: String,

    /// Vendor that produced the quote
    pub source: String,
}

impl Quote {
    /// Create a new quote with minimal required fields
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        last: Decimal,
        currency: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            bid: None,
            ask: None,
            last,
            volume: None,
            currency: currency.into(),
            source: source.into(),
        }
    }

    /// Attach top-of-book prices
    pub fn with_spread(mut self, bid: Decimal, ask: Decimal) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    /// Midpoint of bid and ask, when both are present
    pub fn mid(&self) -> Option<Decimal> {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new("AAPL", Utc::now(), dec!(150.25), "USD", "POLYGON");
        assert_eq!(quote.last, dec!(150.25));
        assert_eq!(quote.currency, "USD");
        assert!(quote.bid.is_none());
        assert!(quote.mid().is_none());
    }

    #[test]
    fn test_quote_mid() {
        let quote = Quote::new("AAPL", Utc::now(), dec!(150.25), "USD", "POLYGON")
            .with_spread(dec!(150.20), dec!(150.30));
        assert_eq!(quote.mid(), Some(dec!(150.25)));
    }
}
