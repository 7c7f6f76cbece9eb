use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::{HistoricalRequest, Interval};

/// Request signature used as cache key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CacheKey {
    Historical {
        symbols: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    },
    Quote {
        symbol: String,
    },
}

impl CacheKey {
    pub fn historical(request: &HistoricalRequest) -> Self {
        Self::Historical {
            symbols: request.symbols.clone(),
            start: request.start,
            end: request.end,
            interval: request.interval.clone(),
        }
    }

    pub fn quote(symbol: &str) -> Self {
        Self::Quote {
            symbol: symbol.to_string(),
        }
    }

    /// Lifetime of an entry stored under this key.
    ///
    /// Historical entries live by their interval; quotes use `quote_ttl`.
    pub fn ttl(&self, quote_ttl: Duration) -> Duration {
        match self {
            Self::Historical { interval, .. } => interval.cache_ttl(),
            Self::Quote { .. } => quote_ttl,
        }
    }
}

/// Flat string form handed to the backing store.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Historical {
                symbols,
                start,
                end,
                interval,
            } => write!(
                f,
                "historical:{}:{}:{}:{}",
                symbols.join(","),
                start.to_rfc3339(),
                end.to_rfc3339(),
                interval
            ),
            Self::Quote { symbol } => write!(f, "quote:{}", symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(interval: &str) -> HistoricalRequest {
        HistoricalRequest::new(
            ["AAPL", "MSFT"],
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap(),
            interval,
        )
    }

    #[test]
    fn test_historical_key_string() {
        let key = CacheKey::historical(&request("1d"));
        assert_eq!(
            key.to_string(),
            "historical:AAPL,MSFT:2024-01-01T00:00:00+00:00:2024-06-30T00:00:00+00:00:1d"
        );
    }

    #[test]
    fn test_interval_distinguishes_keys() {
        assert_ne!(
            CacheKey::historical(&request("1d")).to_string(),
            CacheKey::historical(&request("1h")).to_string()
        );
    }

    #[test]
    fn test_ttl_selection() {
        let quote_ttl = Duration::from_secs(30);
        assert_eq!(CacheKey::quote("AAPL").ttl(quote_ttl), quote_ttl);
        assert_eq!(
            CacheKey::historical(&request("1d")).ttl(quote_ttl),
            Duration::from_secs(86_400)
        );
        assert_eq!(
            CacheKey::historical(&request("2h")).ttl(quote_ttl),
            Duration::from_secs(3600)
        );
    }
}
