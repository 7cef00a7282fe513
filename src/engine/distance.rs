//! Traveled-distance resolution for a delivery record.

use crate::engine::geo::distance_km;
use crate::engine::policy::EnginePolicy;
use crate::model::{DeliveryRecord, LocationKind};

/// Resolves a delivery's traveled distance in kilometers.
///
/// Sources are tried in strict priority order:
/// 1. an explicit positive `distance` on the record (authoritative),
/// 2. the summed great-circle distance over consecutive geo-tagged
///    status-history entries (at least two tagged entries required;
///    entries without a usable location are skipped),
/// 3. the route-type heuristic from [`EnginePolicy`].
///
/// Always returns a value >= 0 and never fails.
pub fn estimate_distance_km(delivery: &DeliveryRecord, policy: &EnginePolicy) -> f64 {
    if let Some(d) = delivery.distance {
        if d.is_finite() && d > 0.0 {
            return d;
        }
    }

    let points: Vec<_> = delivery
        .status_history
        .iter()
        .filter_map(|event| event.geo_point())
        .collect();

    if points.len() >= 2 {
        return points
            .windows(2)
            .map(|pair| distance_km(pair[0], pair[1]))
            .sum();
    }

    route_heuristic_km(delivery, policy)
}

fn route_heuristic_km(delivery: &DeliveryRecord, policy: &EnginePolicy) -> f64 {
    use LocationKind::Warehouse;

    match (delivery.from_location.kind, delivery.to_location.kind) {
        (Warehouse, Warehouse) => policy.warehouse_to_warehouse_km,
        (Warehouse, _) | (_, Warehouse) => policy.warehouse_to_address_km,
        _ => policy.address_to_address_km,
    }
}
