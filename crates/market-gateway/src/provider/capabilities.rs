//! Provider capabilities: what a vendor adapter implements, and the static
//! vendor features used for scoring.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::DataType;

/// Operations a vendor adapter may implement.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    HistoricalData,
    RealTimeQuote,
    HealthCheck,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HistoricalData => "historical_data",
            Self::RealTimeQuote => "real_time_quote",
            Self::HealthCheck => "health_check",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations implemented by a vendor adapter.
///
/// Declared by the adapter itself; the executor skips a provider whose
/// adapter does not declare the requested operation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ClientCapabilities {
    pub historical_data: bool,
    pub real_time_quote: bool,
    pub health_check: bool,
}

impl ClientCapabilities {
    /// Adapter implementing every operation.
    pub const ALL: Self = Self {
        historical_data: true,
        real_time_quote: true,
        health_check: true,
    };

    pub fn supports(&self, operation: Operation) -> bool {
        match operation {
            Operation::HistoricalData => self.historical_data,
            Operation::RealTimeQuote => self.real_time_quote,
            Operation::HealthCheck => self.health_check,
        }
    }
}

/// Vendor request budget: a per-minute count or no limit at all.
///
/// Serialized as an integer or the string `"unlimited"`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RequestsPerMinuteRepr", into = "RequestsPerMinuteRepr")]
pub enum RequestsPerMinute {
    Limited(u32),
    Unlimited,
}

impl RequestsPerMinute {
    /// Per-minute limit, or `None` when unlimited.
    pub fn limit(&self) -> Option<u32> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unlimited => None,
        }
    }

    /// Whether the vendor sustains at least `threshold` requests per minute.
    pub fn at_least(&self, threshold: u32) -> bool {
        match self {
            Self::Limited(n) => *n >= threshold,
            Self::Unlimited => true,
        }
    }
}

impl Default for RequestsPerMinute {
    fn default() -> Self {
        Self::Limited(60)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RequestsPerMinuteRepr {
    Count(u32),
    Word(String),
}

impl TryFrom<RequestsPerMinuteRepr> for RequestsPerMinute {
    type Error = String;

    fn try_from(repr: RequestsPerMinuteRepr) -> Result<Self, Self::Error> {
        match repr {
            RequestsPerMinuteRepr::Count(n) => Ok(Self::Limited(n)),
            RequestsPerMinuteRepr::Word(w) if w.eq_ignore_ascii_case("unlimited") => {
                Ok(Self::Unlimited)
            }
            RequestsPerMinuteRepr::Word(w) => {
                Err(format!("expected a request count or \"unlimited\", got \"{}\"", w))
            }
        }
    }
}

impl From<RequestsPerMinute> for RequestsPerMinuteRepr {
    fn from(value: RequestsPerMinute) -> Self {
        match value {
            RequestsPerMinute::Limited(n) => Self::Count(n),
            RequestsPerMinute::Unlimited => Self::Word("unlimited".to_string()),
        }
    }
}

/// Static per-vendor facts used only for scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFeatures {
    pub max_websocket_connections: u32,
    pub requests_per_minute: RequestsPerMinute,
    pub historical_depth_years: u32,
    pub supports_tick_data: bool,
    pub supports_options: bool,
    pub supports_fundamentals: bool,
    pub supports_news_sentiment: bool,
    pub supports_real_time_stream: bool,
    pub supports_nanosecond_timestamps: bool,
    /// Subscription cost per month, in account currency.
    pub monthly_cost: f64,
    /// Base trust in [0, 1].
    pub reliability_score: f64,
}

impl Default for ProviderFeatures {
    fn default() -> Self {
        Self {
            max_websocket_connections: 0,
            requests_per_minute: RequestsPerMinute::default(),
            historical_depth_years: 0,
            supports_tick_data: false,
            supports_options: false,
            supports_fundamentals: false,
            supports_news_sentiment: false,
            supports_real_time_stream: false,
            supports_nanosecond_timestamps: false,
            monthly_cost: 0.0,
            reliability_score: 0.5,
        }
    }
}

impl ProviderFeatures {
    /// Whether the vendor can deliver real-time data at all.
    pub fn real_time_capable(&self) -> bool {
        self.supports_real_time_stream || self.max_websocket_connections > 0
    }

    /// Fixed capability-to-feature mapping used by the eligibility filter.
    pub fn serves(&self, data_type: DataType) -> bool {
        match data_type {
            DataType::RealTimeQuote => self.real_time_capable(),
            DataType::HistoricalBars => self.historical_depth_years > 0,
            DataType::TickData => self.supports_tick_data,
            DataType::Fundamentals => self.supports_fundamentals,
            DataType::Options => self.supports_options,
            DataType::NewsSentiment => self.supports_news_sentiment,
            DataType::EconomicData => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_time_mapping_accepts_stream_or_websocket() {
        let stream = ProviderFeatures {
            supports_real_time_stream: true,
            ..Default::default()
        };
        let websocket = ProviderFeatures {
            max_websocket_connections: 5,
            ..Default::default()
        };
        assert!(stream.serves(DataType::RealTimeQuote));
        assert!(websocket.serves(DataType::RealTimeQuote));
        assert!(!ProviderFeatures::default().serves(DataType::RealTimeQuote));
    }

    #[test]
    fn test_feature_flag_mapping() {
        let features = ProviderFeatures {
            historical_depth_years: 20,
            supports_tick_data: true,
            ..Default::default()
        };
        assert!(features.serves(DataType::HistoricalBars));
        assert!(features.serves(DataType::TickData));
        assert!(!features.serves(DataType::Options));
        assert!(!features.serves(DataType::Fundamentals));
        assert!(!features.serves(DataType::NewsSentiment));
        assert!(features.serves(DataType::EconomicData));
    }

    #[test]
    fn test_requests_per_minute_serde() {
        let limited: RequestsPerMinute = serde_json::from_str("300").unwrap();
        let unlimited: RequestsPerMinute = serde_json::from_str("\"unlimited\"").unwrap();
        assert_eq!(limited, RequestsPerMinute::Limited(300));
        assert_eq!(unlimited, RequestsPerMinute::Unlimited);
        assert_eq!(serde_json::to_string(&unlimited).unwrap(), "\"unlimited\"");
        assert!(serde_json::from_str::<RequestsPerMinute>("\"lots\"").is_err());
    }

    #[test]
    fn test_requests_per_minute_threshold() {
        assert!(RequestsPerMinute::Unlimited.at_least(1000));
        assert!(RequestsPerMinute::Limited(1000).at_least(1000));
        assert!(!RequestsPerMinute::Limited(999).at_least(1000));
    }

    #[test]
    fn test_client_capabilities_supports() {
        let caps = ClientCapabilities {
            real_time_quote: true,
            ..Default::default()
        };
        assert!(caps.supports(Operation::RealTimeQuote));
        assert!(!caps.supports(Operation::HistoricalData));
        assert!(ClientCapabilities::ALL.supports(Operation::HealthCheck));
    }
}
