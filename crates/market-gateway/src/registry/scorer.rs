//! Provider ranking.
//!
//! Produces a descending-score candidate list for a data type:
//! 1. Eligibility: client attached, features serve the data type, circuit not Open
//! 2. Score: static strengths and type bonuses, less a bounded cost penalty,
//!    multiplied by current health
//! 3. Requirement overrides: soft penalties for unmet real-time/high-volume needs
//! 4. Sort descending; if nothing is eligible, fall back to the free backup tier

use log::{debug, warn};

use super::circuit_breaker::{CircuitBreaker, CircuitState};
use super::health::HealthTracker;
use super::skip_reason::{FetchDiagnostics, SkipReason};
use crate::models::{DataType, Requirements};
use crate::provider::{ProviderCatalog, ProviderDescriptor, ProviderFeatures, ProviderTier};

/// Cost penalty ceiling; keeps cost from dominating capability.
const MAX_COST_PENALTY: f64 = 20.0;

/// Penalty when real-time data is required but the vendor has none.
const REAL_TIME_UNSUPPORTED_PENALTY: f64 = 50.0;

/// Penalty when high volume is required but the vendor is rate limited below
/// [`HIGH_VOLUME_MIN_RPM`].
const LOW_RATE_LIMIT_PENALTY: f64 = 30.0;

const HIGH_VOLUME_MIN_RPM: u32 = 1000;

/// A ranked candidate.
#[derive(Clone, Debug)]
pub struct ScoredProvider<'a> {
    pub descriptor: &'a ProviderDescriptor,
    pub score: f64,
}

/// Ranks catalog providers using live breaker state and health.
pub struct ProviderScorer<'a> {
    catalog: &'a ProviderCatalog,
    circuit_breaker: &'a CircuitBreaker,
    health: &'a HealthTracker,
}

impl<'a> ProviderScorer<'a> {
    pub fn new(
        catalog: &'a ProviderCatalog,
        circuit_breaker: &'a CircuitBreaker,
        health: &'a HealthTracker,
    ) -> Self {
        Self {
            catalog,
            circuit_breaker,
            health,
        }
    }

    /// Check the eligibility filter. Breaker state is read, never advanced.
    pub fn check_eligible(
        &self,
        descriptor: &ProviderDescriptor,
        data_type: DataType,
    ) -> Result<(), SkipReason> {
        if !descriptor.is_initialized() {
            return Err(SkipReason::NotInitialized);
        }
        if !descriptor.features.serves(data_type) {
            return Err(SkipReason::CapabilityMismatch { data_type });
        }
        if self.circuit_breaker.state(&descriptor.name) == CircuitState::Open {
            return Err(SkipReason::CircuitBreakerOpen);
        }
        Ok(())
    }

    /// Score one provider with its current health.
    pub fn score(
        &self,
        descriptor: &ProviderDescriptor,
        data_type: DataType,
        requirements: &Requirements,
    ) -> f64 {
        compute_score(
            &descriptor.features,
            descriptor.priority,
            data_type,
            requirements,
            self.health.score(&descriptor.name),
        )
    }

    /// Rank eligible providers, best first, recording skips in `diagnostics`.
    ///
    /// Never returns an empty list while an initialized free backup provider
    /// exists: with no eligible provider, the most preferred free backup is
    /// returned unconditionally.
    pub fn rank(
        &self,
        data_type: DataType,
        requirements: &Requirements,
        diagnostics: &mut FetchDiagnostics,
    ) -> Vec<ScoredProvider<'a>> {
        let mut ranked: Vec<ScoredProvider<'a>> = Vec::new();

        for descriptor in self.catalog.iter() {
            match self.check_eligible(descriptor, data_type) {
                Ok(()) => ranked.push(ScoredProvider {
                    descriptor,
                    score: self.score(descriptor, data_type, requirements),
                }),
                Err(reason) => {
                    debug!("Provider '{}' not eligible: {}", descriptor.name, reason);
                    diagnostics.record_skip(descriptor.name.clone(), reason);
                }
            }
        }

        if ranked.is_empty() {
            if let Some(fallback) = self.free_backup_fallback() {
                warn!(
                    "No eligible provider for {}, falling back to free backup '{}'",
                    data_type, fallback.name
                );
                ranked.push(ScoredProvider {
                    descriptor: fallback,
                    score: self.score(fallback, data_type, requirements),
                });
            }
            return ranked;
        }

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.descriptor.priority.cmp(&b.descriptor.priority))
        });
        ranked
    }

    /// Most preferred initialized provider of the free backup tier.
    fn free_backup_fallback(&self) -> Option<&'a ProviderDescriptor> {
        self.catalog
            .by_tier(ProviderTier::FreeBackup)
            .filter(|p| p.is_initialized())
            .min_by_key(|p| p.priority)
    }
}

/// Score formula.
///
/// `(reliability × 100 + (10 − priority) × 10 + bonuses − min(cost / 100, 20)) × health`,
/// then requirement penalties.
pub fn compute_score(
    features: &ProviderFeatures,
    priority: u8,
    data_type: DataType,
    requirements: &Requirements,
    health: f64,
) -> f64 {
    let base = features.reliability_score * 100.0;
    let preference = (10.0 - f64::from(priority)) * 10.0;
    let cost_penalty = (features.monthly_cost / 100.0).min(MAX_COST_PENALTY);

    let mut score = (base + preference + type_bonus(features, data_type) - cost_penalty) * health;

    if requirements.real_time && !features.real_time_capable() {
        score -= REAL_TIME_UNSUPPORTED_PENALTY;
    }
    if requirements.high_volume && !features.requests_per_minute.at_least(HIGH_VOLUME_MIN_RPM) {
        score -= LOW_RATE_LIMIT_PENALTY;
    }
    score
}

fn type_bonus(features: &ProviderFeatures, data_type: DataType) -> f64 {
    match data_type {
        DataType::RealTimeQuote => {
            let mut bonus = 0.0;
            if features.supports_nanosecond_timestamps {
                bonus += 20.0;
            }
            if features.supports_real_time_stream {
                bonus += 15.0;
            }
            bonus
        }
        DataType::TickData if features.supports_tick_data => 25.0,
        DataType::HistoricalBars => f64::from(features.historical_depth_years) * 2.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ClientCapabilities, RequestsPerMinute, VendorClient};
    use std::sync::Arc;

    struct NullClient;

    #[async_trait::async_trait]
    impl VendorClient for NullClient {
        fn id(&self) -> &str {
            "NULL"
        }

        fn capabilities(&self) -> ClientCapabilities {
            ClientCapabilities::ALL
        }
    }

    fn descriptor(
        name: &'static str,
        tier: ProviderTier,
        priority: u8,
        features: ProviderFeatures,
    ) -> ProviderDescriptor {
        ProviderDescriptor::new(name, tier, priority, features, Some(Arc::new(NullClient)))
    }

    fn streaming(reliability: f64, cost: f64) -> ProviderFeatures {
        ProviderFeatures {
            supports_real_time_stream: true,
            historical_depth_years: 10,
            reliability_score: reliability,
            monthly_cost: cost,
            requests_per_minute: RequestsPerMinute::Unlimited,
            ..Default::default()
        }
    }

    #[test]
    fn test_score_formula_for_quotes() {
        let features = ProviderFeatures {
            supports_real_time_stream: true,
            supports_nanosecond_timestamps: true,
            reliability_score: 0.9,
            monthly_cost: 500.0,
            ..Default::default()
        };
        // 90 + (10 - 2) * 10 + 20 + 15 - 5 = 200
        let score = compute_score(
            &features,
            2,
            DataType::RealTimeQuote,
            &Requirements::default(),
            1.0,
        );
        assert!((score - 200.0).abs() < 1e-9);

        // Health multiplies the whole static score.
        let degraded = compute_score(
            &features,
            2,
            DataType::RealTimeQuote,
            &Requirements::default(),
            0.5,
        );
        assert!((degraded - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_historical_depth_and_tick_bonuses() {
        let features = ProviderFeatures {
            historical_depth_years: 20,
            supports_tick_data: true,
            reliability_score: 0.5,
            ..Default::default()
        };
        let req = Requirements::default();
        // 50 + 0 + 40
        let historical = compute_score(&features, 10, DataType::HistoricalBars, &req, 1.0);
        assert!((historical - 90.0).abs() < 1e-9);
        // 50 + 0 + 25
        let tick = compute_score(&features, 10, DataType::TickData, &req, 1.0);
        assert!((tick - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_cost_penalty_is_bounded() {
        let req = Requirements::default();
        let cheap = compute_score(&streaming(0.9, 2_000.0), 5, DataType::Fundamentals, &req, 1.0);
        let pricey = compute_score(&streaming(0.9, 50_000.0), 5, DataType::Fundamentals, &req, 1.0);
        assert!((cheap - pricey).abs() < 1e-9);
    }

    #[test]
    fn test_score_never_increases_with_cost() {
        let req = Requirements::default();
        for data_type in [
            DataType::RealTimeQuote,
            DataType::HistoricalBars,
            DataType::TickData,
            DataType::EconomicData,
        ] {
            let mut previous = f64::INFINITY;
            for cost in (0..=4_000).step_by(50) {
                let score = compute_score(&streaming(0.8, cost as f64), 3, data_type, &req, 0.7);
                assert!(score <= previous + 1e-9, "cost {} raised score", cost);
                previous = score;
            }
        }
    }

    #[test]
    fn test_requirement_overrides() {
        let slow = ProviderFeatures {
            historical_depth_years: 5,
            requests_per_minute: RequestsPerMinute::Limited(5),
            reliability_score: 0.7,
            ..Default::default()
        };
        let plain = compute_score(&slow, 5, DataType::HistoricalBars, &Requirements::default(), 1.0);
        let rt = compute_score(&slow, 5, DataType::HistoricalBars, &Requirements::real_time(), 1.0);
        let hv = compute_score(&slow, 5, DataType::HistoricalBars, &Requirements::high_volume(), 1.0);
        assert!((plain - rt - 50.0).abs() < 1e-9);
        assert!((plain - hv - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_orders_by_score_and_excludes_ineligible() {
        let catalog = ProviderCatalog::new(vec![
            descriptor("FREE", ProviderTier::FreeBackup, 9, streaming(0.6, 0.0)),
            descriptor("PREMIUM", ProviderTier::Institutional, 1, streaming(0.99, 3_000.0)),
            descriptor("MID", ProviderTier::Professional, 4, streaming(0.9, 200.0)),
            descriptor(
                "NEWS_ONLY",
                ProviderTier::Professional,
                2,
                ProviderFeatures {
                    supports_news_sentiment: true,
                    ..Default::default()
                },
            ),
            ProviderDescriptor::new(
                "UNWIRED",
                ProviderTier::Institutional,
                1,
                streaming(1.0, 0.0),
                None,
            ),
        ])
        .unwrap();
        let breaker = CircuitBreaker::new();
        let health = HealthTracker::new();
        let scorer = ProviderScorer::new(&catalog, &breaker, &health);

        let mut diagnostics = FetchDiagnostics::new();
        let ranked = scorer.rank(
            DataType::RealTimeQuote,
            &Requirements::default(),
            &mut diagnostics,
        );

        let names: Vec<_> = ranked.iter().map(|s| &*s.descriptor.name).collect();
        assert_eq!(names, vec!["PREMIUM", "MID", "FREE"]);
        assert_eq!(diagnostics.skip_reasons().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_excluded_and_health_lowers_rank() {
        let catalog = ProviderCatalog::new(vec![
            descriptor("A", ProviderTier::Professional, 3, streaming(0.9, 0.0)),
            descriptor("B", ProviderTier::Professional, 4, streaming(0.9, 0.0)),
            descriptor("C", ProviderTier::Professional, 5, streaming(0.9, 0.0)),
        ])
        .unwrap();
        let breaker = CircuitBreaker::new();
        breaker.register("A", 1);
        breaker.record_failure("A");
        let health = HealthTracker::new();
        for _ in 0..5 {
            health.record_failure("B");
        }
        let scorer = ProviderScorer::new(&catalog, &breaker, &health);

        let ranked = scorer.rank(
            DataType::HistoricalBars,
            &Requirements::default(),
            &mut FetchDiagnostics::new(),
        );
        let names: Vec<_> = ranked.iter().map(|s| &*s.descriptor.name).collect();
        assert_eq!(names, vec!["C", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_free_backup_when_nothing_eligible() {
        let catalog = ProviderCatalog::new(vec![
            descriptor("PREMIUM", ProviderTier::Institutional, 1, streaming(0.99, 0.0)),
            descriptor("FREE_LOW", ProviderTier::FreeBackup, 9, ProviderFeatures::default()),
            descriptor("FREE_HIGH", ProviderTier::FreeBackup, 7, ProviderFeatures::default()),
        ])
        .unwrap();
        let breaker = CircuitBreaker::new();
        breaker.register("PREMIUM", 1);
        breaker.record_failure("PREMIUM");
        let health = HealthTracker::new();
        let scorer = ProviderScorer::new(&catalog, &breaker, &health);

        // Neither free provider can stream, and the premium circuit is open.
        let ranked = scorer.rank(
            DataType::RealTimeQuote,
            &Requirements::default(),
            &mut FetchDiagnostics::new(),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].descriptor.name, "FREE_HIGH");
    }

    #[test]
    fn test_empty_catalog_ranks_nothing() {
        let catalog = ProviderCatalog::default();
        let breaker = CircuitBreaker::new();
        let health = HealthTracker::new();
        let scorer = ProviderScorer::new(&catalog, &breaker, &health);
        assert!(scorer
            .rank(
                DataType::Options,
                &Requirements::default(),
                &mut FetchDiagnostics::new()
            )
            .is_empty());
    }
}
