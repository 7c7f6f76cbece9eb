use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV bar for a symbol
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

/// Tabular historical result.
///
/// An empty table is the gateway's "no data" answer for historical requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BarTable {
    bars: Vec<Bar>,
}

impl BarTable {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    /// Distinct symbols present in the table, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        self.bars
            .iter()
            .map(|b| b.symbol.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Bars for a single symbol, in table order.
    pub fn for_symbol<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Bar> + 'a {
        self.bars.iter().filter(move |b| b.symbol == symbol)
    }
}

impl From<Vec<Bar>> for BarTable {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}
