//! Central fallback policy for the computation engine.

/// Named fallback constants applied when a delivery record lacks
/// authoritative data.
///
/// Each dashboard used to hard-code its own literals for these; the policy
/// object makes the fallback behavior one configured decision shared by the
/// distance estimator, the earnings calculator, and the performance
/// metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct EnginePolicy {
    /// Heuristic distance for warehouse-to-warehouse transfers.
    pub warehouse_to_warehouse_km: f64,
    /// Heuristic distance between a warehouse and a customer address.
    pub warehouse_to_address_km: f64,
    /// Heuristic distance for address-to-address runs.
    pub address_to_address_km: f64,
    /// Weight assumed for items with no recorded weight.
    pub missing_weight_kg: f64,
    /// Baseline handling time the efficiency comparison is measured against.
    pub baseline_minutes: f64,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            warehouse_to_warehouse_km: 15.0,
            warehouse_to_address_km: 8.0,
            address_to_address_km: 5.0,
            missing_weight_kg: 0.0,
            baseline_minutes: 30.0,
        }
    }
}

impl EnginePolicy {
    /// Returns the default policy with a different efficiency baseline.
    pub fn with_baseline_minutes(baseline_minutes: f64) -> Self {
        Self {
            baseline_minutes,
            ..Self::default()
        }
    }
}
