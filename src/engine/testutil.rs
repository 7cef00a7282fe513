//! Shared builders for engine unit tests.

use chrono::{DateTime, Utc};

use crate::model::{
    DeliveryItemType, DeliveryPriority, DeliveryRecord, DeliveryStatus, DriverPricingTier,
    Location, LocationKind, ParcelItem, PartialCoordinates, StatusEvent, Weight,
};

pub(crate) fn tier(
    parcel_type: &str,
    base: f64,
    per_km: f64,
    per_kg: f64,
    urgent_bonus: f64,
) -> DriverPricingTier {
    DriverPricingTier {
        parcel_type: parcel_type.to_string(),
        driver_base_earning: base,
        driver_earning_per_km: per_km,
        driver_earning_per_kg: per_kg,
        urgent_delivery_bonus: urgent_bonus,
        commission_percentage: 10.0,
        is_active: true,
    }
}

/// The rate card used by the worked examples: base 50, 5/km, 2/kg, +20 urgent.
pub(crate) fn standard_tier() -> DriverPricingTier {
    tier("Standard", 50.0, 5.0, 2.0, 20.0)
}

pub(crate) fn parcel(id: &str, parcel_type: &str, weight_kg: Option<f64>) -> ParcelItem {
    ParcelItem {
        id: id.to_string(),
        tracking_number: format!("TRK-{id}"),
        weight: weight_kg.map(|value| Weight {
            value,
            unit: Some("kg".to_string()),
        }),
        parcel_type: parcel_type.to_string(),
        receiver: None,
    }
}

pub(crate) fn location(kind: LocationKind) -> Location {
    Location {
        kind,
        address: None,
        warehouse_id: None,
        location_name: None,
        coordinates: PartialCoordinates::default(),
    }
}

/// A delivered parcel-type delivery from a warehouse to an address, with no
/// recorded distance or timestamps. Tests override what they care about.
pub(crate) fn delivery(id: &str, items: Vec<ParcelItem>) -> DeliveryRecord {
    DeliveryRecord {
        id: id.to_string(),
        delivery_number: format!("DEL-{id}"),
        delivery_item_type: DeliveryItemType::Parcel,
        parcels: Some(items),
        consolidation: None,
        assigned_driver: None,
        from_location: location(LocationKind::Warehouse),
        to_location: location(LocationKind::Address),
        status: DeliveryStatus::Delivered,
        priority: DeliveryPriority::Normal,
        distance: None,
        estimated_delivery_time: None,
        actual_pickup_time: None,
        actual_delivery_time: None,
        created_timestamp: None,
        updated_timestamp: None,
        status_history: Vec::new(),
    }
}

pub(crate) fn geo_event(latitude: f64, longitude: f64) -> StatusEvent {
    StatusEvent {
        status: DeliveryStatus::InTransit,
        timestamp: None,
        location: Some(PartialCoordinates {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }),
    }
}

pub(crate) fn plain_event() -> StatusEvent {
    StatusEvent {
        status: DeliveryStatus::InTransit,
        timestamp: None,
        location: None,
    }
}

pub(crate) fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("test timestamp")
}
