/// Classification for failover bookkeeping.
///
/// Used by the failover executor to decide how a provider error affects
/// the circuit breaker and health tracker before moving to the next candidate.
///
/// # Behavior Summary
///
/// | Class | Try Next Provider? | Record Breaker/Health Failure? |
/// |-------|-------------------|--------------------------------|
/// | `FailoverWithPenalty` | Yes | Yes |
/// | `NextProvider` | Yes | No |
/// | `CircuitOpen` | Yes | Health only (breaker already open) |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Failover to next provider and record a penalty.
    ///
    /// Used for every genuine vendor failure: errors, rate limiting, timeouts.
    /// The failure counts toward the provider's breaker threshold and lowers
    /// its health score.
    FailoverWithPenalty,

    /// Try next provider without recording any penalty.
    ///
    /// Used when the vendor client simply does not implement the operation.
    NextProvider,

    /// Circuit breaker is open for this provider.
    ///
    /// No call is made, but the rejection lowers the provider's health like
    /// any other failure. Logged at `info` rather than `warn`.
    CircuitOpen,
}
