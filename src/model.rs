//! Domain model for delivery and pricing records fetched from the parcel
//! gateway.
//!
//! All types are read-only snapshots deserialized from the gateway's
//! camelCase JSON. Deserialization is deliberately lenient where dashboard
//! data is known to be dirty: malformed timestamps become `None`, partial
//! coordinates become an absent point, and unknown status or priority
//! strings map to catch-all variants instead of failing the whole record.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A pair of decimal-degree coordinates known to be complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Coordinates as they appear on the wire, where either field may be
/// missing. A point is only usable when both are present.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PartialCoordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl PartialCoordinates {
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Lifecycle state of a delivery. The terminal states are owned by the
/// external tracking service; this side only classifies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Assigned,
    Accepted,
    InProgress,
    PickedUp,
    InTransit,
    NearDestination,
    Delivered,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl DeliveryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
    #[serde(other)]
    Unknown,
}

impl DeliveryPriority {
    pub fn is_urgent(self) -> bool {
        matches!(self, Self::Urgent)
    }
}

/// Whether a delivery carries a plain parcel list or a consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryItemType {
    Parcel,
    Consolidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Warehouse,
    Address,
    #[serde(other)]
    Other,
}

/// One endpoint of a delivery leg.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type")]
    pub kind: LocationKind,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub warehouse_id: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(flatten)]
    pub coordinates: PartialCoordinates,
}

/// A single entry of a delivery's ordered status history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEvent {
    pub status: DeliveryStatus,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<PartialCoordinates>,
}

impl StatusEvent {
    /// The event's coordinates, if both latitude and longitude were recorded.
    pub fn geo_point(&self) -> Option<GeoPoint> {
        self.location.as_ref().and_then(PartialCoordinates::point)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Weight {
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Receiver {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A single parcel inside a delivery. `parcel_type` is a free-text label
/// resolved against the pricing table at computation time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelItem {
    pub id: String,
    pub tracking_number: String,
    #[serde(default)]
    pub weight: Option<Weight>,
    pub parcel_type: String,
    #[serde(default)]
    pub receiver: Option<Receiver>,
}

/// A group of parcels shipped together under one delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct Consolidation {
    #[serde(default)]
    pub parcels: Vec<ParcelItem>,
}

/// One driver assignment as returned by
/// `GET /api/deliveries/driver/{driverId}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub id: String,
    pub delivery_number: String,
    pub delivery_item_type: DeliveryItemType,
    #[serde(default)]
    pub parcels: Option<Vec<ParcelItem>>,
    #[serde(default)]
    pub consolidation: Option<Consolidation>,
    #[serde(default)]
    pub assigned_driver: Option<Value>,
    pub from_location: Location,
    pub to_location: Location,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub priority: DeliveryPriority,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub actual_pickup_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub actual_delivery_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub updated_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status_history: Vec<StatusEvent>,
}

impl DeliveryRecord {
    /// The items carried by this delivery, resolved through
    /// `delivery_item_type`. Missing containers yield an empty slice.
    pub fn items(&self) -> &[ParcelItem] {
        match self.delivery_item_type {
            DeliveryItemType::Parcel => self.parcels.as_deref().unwrap_or(&[]),
            DeliveryItemType::Consolidation => self
                .consolidation
                .as_ref()
                .map_or(&[][..], |c| c.parcels.as_slice()),
        }
    }

    /// Timestamp used to place the delivery into a reporting window.
    /// First present wins: actual delivery, then last update, then creation.
    pub fn reference_timestamp(&self) -> Option<DateTime<Utc>> {
        self.actual_delivery_time
            .or(self.updated_timestamp)
            .or(self.created_timestamp)
    }
}

/// One row of the driver rate card from `GET /api/pricing-driver`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverPricingTier {
    pub parcel_type: String,
    #[serde(default)]
    pub driver_base_earning: f64,
    #[serde(default)]
    pub driver_earning_per_km: f64,
    #[serde(default)]
    pub driver_earning_per_kg: f64,
    #[serde(default)]
    pub urgent_delivery_bonus: f64,
    #[serde(default)]
    pub commission_percentage: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_from_value))
}

/// Accepts RFC 3339 strings and epoch milliseconds. Anything else is an
/// absent timestamp, never a deserialization error.
fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}
