//! Request shape: what is being asked for and under which constraints.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of market data a caller can request.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    RealTimeQuote,
    HistoricalBars,
    TickData,
    Fundamentals,
    Options,
    NewsSentiment,
    EconomicData,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RealTimeQuote => "real_time_quote",
            Self::HistoricalBars => "historical_bars",
            Self::TickData => "tick_data",
            Self::Fundamentals => "fundamentals",
            Self::Options => "options",
            Self::NewsSentiment => "news_sentiment",
            Self::EconomicData => "economic_data",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional caller requirements that bend the ranking.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    /// Caller needs streaming real-time data.
    pub real_time: bool,
    /// Caller expects to issue a high volume of requests.
    pub high_volume: bool,
}

impl Requirements {
    pub fn real_time() -> Self {
        Self {
            real_time: true,
            ..Default::default()
        }
    }

    pub fn high_volume() -> Self {
        Self {
            high_volume: true,
            ..Default::default()
        }
    }
}

/// Bar interval for historical queries.
///
/// Parsing never fails: unknown strings are kept verbatim as [`Interval::Other`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    OneDay,
    OneWeek,
    Other(String),
}

/// Cache lifetime for intervals without a dedicated TTL.
const DEFAULT_INTERVAL_TTL: Duration = Duration::from_secs(3600);

impl Interval {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "1m" => Self::OneMinute,
            "5m" => Self::FiveMinutes,
            "15m" => Self::FifteenMinutes,
            "1h" | "60m" => Self::OneHour,
            "1d" => Self::OneDay,
            "1w" | "1wk" => Self::OneWeek,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
            Self::OneWeek => "1wk",
            Self::Other(s) => s,
        }
    }

    /// How long a cached response at this interval stays valid.
    pub fn cache_ttl(&self) -> Duration {
        match self {
            Self::OneMinute => Duration::from_secs(60),
            Self::FiveMinutes => Duration::from_secs(300),
            Self::FifteenMinutes => Duration::from_secs(900),
            Self::OneHour => Duration::from_secs(3600),
            Self::OneDay => Duration::from_secs(86_400),
            Self::OneWeek => Duration::from_secs(604_800),
            Self::Other(_) => DEFAULT_INTERVAL_TTL,
        }
    }
}

impl From<&str> for Interval {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Historical bars request.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoricalRequest {
    pub symbols: Vec<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval: Interval,
    pub requirements: Requirements,
}

impl HistoricalRequest {
    pub fn new<S: Into<String>>(
        symbols: impl IntoIterator<Item = S>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: impl Into<Interval>,
    ) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            start,
            end,
            interval: interval.into(),
            requirements: Requirements::default(),
        }
    }

    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }
}
