//! Performance metrics over a windowed delivery set.

use serde::Serialize;

use crate::engine::distance::estimate_distance_km;
use crate::engine::earnings::delivery_earning;
use crate::engine::policy::EnginePolicy;
use crate::engine::utility::{mean, pct};
use crate::model::{DeliveryRecord, DeliveryStatus, DriverPricingTier};

/// Average handling time and comparison against the configured baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEfficiency {
    pub avg_minutes_per_delivery: f64,
    pub baseline_minutes: f64,
    /// Positive means faster than baseline. 0 when no delivery carried both
    /// pickup and delivery timestamps.
    pub vs_baseline_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceMetrics {
    pub total_km: f64,
    pub avg_km_per_delivery: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRate {
    pub total: usize,
    pub completed: usize,
    pub rate_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnTimeDelivery {
    pub completed: usize,
    pub on_time: usize,
    pub rate_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsMetrics {
    pub total_amount: f64,
    pub avg_amount_per_delivery: f64,
}

/// Summary statistics for one driver over an already-windowed delivery set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub delivery_efficiency: DeliveryEfficiency,
    pub distance_metrics: DistanceMetrics,
    pub completion_rate: CompletionRate,
    pub on_time_delivery: OnTimeDelivery,
    pub earnings_metrics: EarningsMetrics,
}

/// Derives completion, punctuality, handling-time, distance, and earnings
/// statistics from a delivery set. Total over any input; every rate is 0
/// (never NaN) on an empty denominator.
pub fn performance_metrics(
    deliveries: &[&DeliveryRecord],
    tiers: &[DriverPricingTier],
    policy: &EnginePolicy,
) -> PerformanceMetrics {
    let completed: Vec<&DeliveryRecord> = deliveries
        .iter()
        .copied()
        .filter(|d| d.status == DeliveryStatus::Delivered)
        .collect();

    let completion_rate = CompletionRate {
        total: deliveries.len(),
        completed: completed.len(),
        rate_percent: pct(completed.len(), deliveries.len()),
    };

    let on_time = completed.iter().filter(|d| is_on_time(d)).count();
    let on_time_delivery = OnTimeDelivery {
        completed: completed.len(),
        on_time,
        rate_percent: pct(on_time, completed.len()),
    };

    let handling: Vec<f64> = completed
        .iter()
        .filter_map(|d| handling_minutes(d))
        .collect();
    let avg_minutes = mean(&handling);
    let vs_baseline = if handling.is_empty() || policy.baseline_minutes <= 0.0 {
        0.0
    } else {
        (policy.baseline_minutes - avg_minutes) / policy.baseline_minutes * 100.0
    };

    let total_km: f64 = completed
        .iter()
        .map(|d| estimate_distance_km(d, policy))
        .sum();
    let total_amount: f64 = completed
        .iter()
        .map(|d| delivery_earning(d, tiers, policy).amount)
        .sum();
    let per_delivery = |total: f64| {
        if completed.is_empty() {
            0.0
        } else {
            total / completed.len() as f64
        }
    };

    PerformanceMetrics {
        delivery_efficiency: DeliveryEfficiency {
            avg_minutes_per_delivery: avg_minutes,
            baseline_minutes: policy.baseline_minutes,
            vs_baseline_percent: vs_baseline,
        },
        distance_metrics: DistanceMetrics {
            total_km,
            avg_km_per_delivery: per_delivery(total_km),
        },
        completion_rate,
        on_time_delivery,
        earnings_metrics: EarningsMetrics {
            total_amount,
            avg_amount_per_delivery: per_delivery(total_amount),
        },
    }
}

// TODO: confirm with ops whether deliveries without an ETA should really
// count as on-time; it inflates the rate for routes that never get one.
fn is_on_time(delivery: &DeliveryRecord) -> bool {
    match (
        delivery.estimated_delivery_time,
        delivery.actual_delivery_time,
    ) {
        (None, _) => true,
        (Some(eta), Some(actual)) => actual <= eta,
        (Some(_), None) => false,
    }
}

/// Wall-clock handling time in minutes. Requires both pickup and delivery
/// timestamps; an inverted pair is treated as unrecorded.
fn handling_minutes(delivery: &DeliveryRecord) -> Option<f64> {
    let pickup = delivery.actual_pickup_time?;
    let delivered = delivery.actual_delivery_time?;

    let seconds = (delivered - pickup).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some(seconds as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{delivery, parcel, standard_tier, ts};
    use crate::model::DeliveryRecord;

    fn completed(id: &str, pickup: &str, delivered: &str) -> DeliveryRecord {
        let mut d = delivery(id, vec![parcel(&format!("{id}-p"), "Standard", Some(1.0))]);
        d.distance = Some(10.0);
        d.actual_pickup_time = Some(ts(pickup));
        d.actual_delivery_time = Some(ts(delivered));
        d
    }

    fn refs(deliveries: &[DeliveryRecord]) -> Vec<&DeliveryRecord> {
        deliveries.iter().collect()
    }

    #[test]
    fn test_completion_rate_four_of_five() {
        let mut deliveries: Vec<_> = (0..4)
            .map(|i| completed(&format!("d{i}"), "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z"))
            .collect();
        let mut failed = completed("failed", "2025-11-14T09:00:00Z", "2025-11-14T10:00:00Z");
        failed.status = DeliveryStatus::Failed;
        deliveries.push(failed);

        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &EnginePolicy::default());

        assert_eq!(metrics.completion_rate.total, 5);
        assert_eq!(metrics.completion_rate.completed, 4);
        assert_eq!(metrics.completion_rate.rate_percent, 80.0);
    }

    #[test]
    fn test_completion_rate_is_100_only_when_all_delivered() {
        let deliveries = vec![
            completed("d1", "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z"),
            completed("d2", "2025-11-14T10:00:00Z", "2025-11-14T10:20:00Z"),
        ];
        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &EnginePolicy::default());
        assert_eq!(metrics.completion_rate.rate_percent, 100.0);
        // Neither delivery carries an ETA, so both count as on-time.
        assert_eq!(metrics.on_time_delivery.rate_percent, 100.0);
    }

    #[test]
    fn test_empty_set_yields_zero_rates() {
        let metrics = performance_metrics(&[], &[standard_tier()], &EnginePolicy::default());

        assert_eq!(metrics.completion_rate.rate_percent, 0.0);
        assert_eq!(metrics.on_time_delivery.rate_percent, 0.0);
        assert_eq!(metrics.delivery_efficiency.avg_minutes_per_delivery, 0.0);
        assert_eq!(metrics.delivery_efficiency.vs_baseline_percent, 0.0);
        assert_eq!(metrics.earnings_metrics.avg_amount_per_delivery, 0.0);
    }

    #[test]
    fn test_missing_eta_counts_as_on_time() {
        let on_schedule = completed("d1", "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z");
        // No ETA at all.
        let mut no_eta = completed("d2", "2025-11-14T10:00:00Z", "2025-11-14T11:00:00Z");
        no_eta.estimated_delivery_time = None;

        let mut late = completed("d3", "2025-11-14T12:00:00Z", "2025-11-14T13:00:00Z");
        late.estimated_delivery_time = Some(ts("2025-11-14T12:30:00Z"));

        let mut punctual = completed("d4", "2025-11-14T14:00:00Z", "2025-11-14T14:20:00Z");
        punctual.estimated_delivery_time = Some(ts("2025-11-14T14:30:00Z"));

        let deliveries = vec![on_schedule, no_eta, late, punctual];
        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &EnginePolicy::default());

        assert_eq!(metrics.on_time_delivery.on_time, 3);
        assert_eq!(metrics.on_time_delivery.rate_percent, 75.0);
    }

    #[test]
    fn test_handling_time_needs_both_timestamps() {
        let half_hour = completed("d1", "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z");
        let hour = completed("d2", "2025-11-14T10:00:00Z", "2025-11-14T11:00:00Z");
        let mut no_pickup = completed("d3", "2025-11-14T12:00:00Z", "2025-11-14T12:45:00Z");
        no_pickup.actual_pickup_time = None;

        let deliveries = vec![half_hour, hour, no_pickup];
        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &EnginePolicy::default());

        // Mean of 30 and 60; d3 is excluded from both sides.
        assert_eq!(metrics.delivery_efficiency.avg_minutes_per_delivery, 45.0);
        // (30 - 45) / 30 * 100
        assert_eq!(metrics.delivery_efficiency.vs_baseline_percent, -50.0);
    }

    #[test]
    fn test_inverted_timestamps_are_excluded() {
        let ok = completed("d1", "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z");
        let inverted = completed("d2", "2025-11-14T11:00:00Z", "2025-11-14T10:00:00Z");

        let deliveries = vec![ok, inverted];
        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &EnginePolicy::default());

        assert_eq!(metrics.delivery_efficiency.avg_minutes_per_delivery, 30.0);
    }

    #[test]
    fn test_distance_and_earnings_totals() {
        let deliveries = vec![
            completed("d1", "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z"),
            completed("d2", "2025-11-14T10:00:00Z", "2025-11-14T10:30:00Z"),
        ];
        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &EnginePolicy::default());

        assert_eq!(metrics.distance_metrics.total_km, 20.0);
        assert_eq!(metrics.distance_metrics.avg_km_per_delivery, 10.0);
        // Each delivery: one 1 kg item over 10 km = 50 + 50 + 2 = 102.
        assert_eq!(metrics.earnings_metrics.total_amount, 204.0);
        assert_eq!(metrics.earnings_metrics.avg_amount_per_delivery, 102.0);
    }

    #[test]
    fn test_custom_baseline() {
        let deliveries = vec![completed("d1", "2025-11-14T09:00:00Z", "2025-11-14T09:30:00Z")];
        let policy = EnginePolicy::with_baseline_minutes(60.0);
        let metrics = performance_metrics(&refs(&deliveries), &[standard_tier()], &policy);

        // 30 minutes against a 60-minute baseline: 50% faster.
        assert_eq!(metrics.delivery_efficiency.vs_baseline_percent, 50.0);
    }
}
