//! Skip reason tracking for provider selection diagnostics.

use std::fmt;

use crate::models::{DataType, ProviderId};
use crate::provider::Operation;

/// Why a provider was skipped during selection or failover.
#[derive(Clone, Debug, PartialEq)]
pub enum SkipReason {
    /// Provider is cataloged but has no vendor client.
    NotInitialized,

    /// Provider's features do not cover the requested data type.
    CapabilityMismatch { data_type: DataType },

    /// Vendor adapter does not implement the operation.
    OperationNotSupported { operation: Operation },

    /// Circuit breaker is open for this provider.
    CircuitBreakerOpen,

    /// Provider's rate-limit bucket had no token left.
    RateLimited,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "not initialized"),
            Self::CapabilityMismatch { data_type } => write!(f, "cannot serve {}", data_type),
            Self::OperationNotSupported { operation } => {
                write!(f, "{} not implemented", operation)
            }
            Self::CircuitBreakerOpen => write!(f, "circuit open"),
            Self::RateLimited => write!(f, "rate limited"),
        }
    }
}

/// How one provider attempt ended.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptResult {
    Skipped(SkipReason),
    Failed(String),
    Served,
}

/// One entry of the failover trail.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub result: AttemptResult,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            AttemptResult::Skipped(reason) => {
                write!(f, "{}: SKIPPED ({})", self.provider_id, reason)
            }
            AttemptResult::Failed(msg) => write!(f, "{}: ERROR ({})", self.provider_id, msg),
            AttemptResult::Served => write!(f, "{}: SUCCESS", self.provider_id),
        }
    }
}

/// Ordered trail of every provider a fetch considered.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, provider_id: ProviderId, result: AttemptResult) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            result,
        });
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.push(provider_id, AttemptResult::Skipped(reason));
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: String) {
        self.push(provider_id, AttemptResult::Failed(error));
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.push(provider_id, AttemptResult::Served);
    }

    /// One-line trail, e.g. `A: SKIPPED (circuit open) -> B: SUCCESS`.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no candidates".to_string();
        }
        let parts: Vec<String> = self.attempts.iter().map(ToString::to_string).collect();
        parts.join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.result == AttemptResult::Served)
    }

    /// True once a vendor call was made and failed.
    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    pub fn skip_reasons(&self) -> Vec<(&ProviderId, &SkipReason)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.result {
                AttemptResult::Skipped(reason) => Some((&a.provider_id, reason)),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<(&ProviderId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.result {
                AttemptResult::Failed(msg) => Some((&a.provider_id, msg.as_str())),
                _ => None,
            })
            .collect()
    }
}
