//! Market data models
//!
//! This module contains the core data types for gateway operations:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `quote` - Real-time quote snapshot (Quote)
//! - `bar` - Historical OHLCV bars and the tabular result (Bar, BarTable)
//! - `request` - Request shape: data types, intervals, requirements

mod bar;
mod quote;
mod request;
mod types;

pub use bar::{Bar, BarTable};
pub use quote::Quote;
pub use request::{DataType, HistoricalRequest, Interval, Requirements};
pub use types::ProviderId;
