//! Explicit fetch outcome.
//!
//! Lets callers tell "no data" apart from "every vendor failed" without
//! reading logs.

use super::skip_reason::FetchDiagnostics;
use crate::errors::MarketDataError;
use crate::models::ProviderId;

/// Where returned data came from.
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    Cache,
    Provider(ProviderId),
}

/// Result of a gateway fetch.
#[derive(Clone, Debug)]
pub enum FetchOutcome<T> {
    /// Data served from cache or a vendor.
    Data { data: T, source: DataSource },
    /// No provider was eligible or callable; no vendor was contacted.
    Empty { diagnostics: FetchDiagnostics },
    /// Every attempted vendor failed.
    Unavailable { diagnostics: FetchDiagnostics },
}

impl<T> FetchOutcome<T> {
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&DataSource> {
        match self {
            Self::Data { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Diagnostics for non-data outcomes. Data outcomes carry none.
    pub fn diagnostics(&self) -> Option<&FetchDiagnostics> {
        match self {
            Self::Empty { diagnostics } | Self::Unavailable { diagnostics } => Some(diagnostics),
            Self::Data { .. } => None,
        }
    }

    /// Convert to a `Result` for callers that prefer `?`.
    pub fn into_result(self) -> Result<T, MarketDataError> {
        match self {
            Self::Data { data, .. } => Ok(data),
            Self::Empty { .. } => Err(MarketDataError::NoProvidersAvailable),
            Self::Unavailable { .. } => Err(MarketDataError::AllProvidersFailed),
        }
    }
}
