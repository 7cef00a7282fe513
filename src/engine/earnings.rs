//! Per-item and per-delivery driver earnings.

use tracing::warn;

use crate::engine::distance::estimate_distance_km;
use crate::engine::policy::EnginePolicy;
use crate::engine::pricing::resolve_tier;
use crate::model::{DeliveryPriority, DeliveryRecord, DriverPricingTier, ParcelItem};

/// Earnings outcome for one delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeliveryEarning {
    /// Total driver earnings across items that resolved a pricing tier.
    pub amount: f64,
    /// Number of items that actually contributed to `amount`.
    pub item_count: usize,
}

/// Driver earnings for a single item at its share of the delivery distance.
///
/// `base + distance * per_km + weight * per_kg`, plus the urgent bonus when
/// the delivery is urgent and the tier carries a positive bonus.
pub fn item_earning(
    item: &ParcelItem,
    distance_km: f64,
    tier: &DriverPricingTier,
    priority: DeliveryPriority,
    policy: &EnginePolicy,
) -> f64 {
    let weight_kg = item
        .weight
        .as_ref()
        .map(|w| w.value)
        .unwrap_or(policy.missing_weight_kg);

    let mut earning = tier.driver_base_earning
        + distance_km * tier.driver_earning_per_km
        + weight_kg * tier.driver_earning_per_kg;

    if priority.is_urgent() && tier.urgent_delivery_bonus > 0.0 {
        earning += tier.urgent_delivery_bonus;
    }

    earning
}

/// Total earnings for a delivery, with the estimated distance split equally
/// across its items.
///
/// Items whose parcel type resolves to no tier contribute nothing and are
/// excluded from `item_count`; the skip is logged, never fatal.
pub fn delivery_earning(
    delivery: &DeliveryRecord,
    tiers: &[DriverPricingTier],
    policy: &EnginePolicy,
) -> DeliveryEarning {
    let items = delivery.items();
    let total_distance = estimate_distance_km(delivery, policy);
    let distance_per_item = total_distance / items.len().max(1) as f64;

    let mut earning = DeliveryEarning::default();

    for item in items {
        let Some(tier) = resolve_tier(&item.parcel_type, tiers) else {
            warn!(
                delivery = %delivery.delivery_number,
                tracking = %item.tracking_number,
                parcel_type = %item.parcel_type,
                "no pricing tier for parcel type, item excluded from earnings"
            );
            continue;
        };

        earning.amount += item_earning(item, distance_per_item, tier, delivery.priority, policy);
        earning.item_count += 1;
    }

    earning
}
