//! JSON decoding for gateway payloads.

use anyhow::Result;

use crate::model::{DeliveryRecord, DriverPricingTier};

/// Decodes the delivery list returned by `/api/deliveries/driver/{id}`.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid JSON array of delivery
/// records. Field-level dirt (bad timestamps, partial coordinates, unknown
/// statuses) is absorbed by the model's lenient deserializers instead.
pub fn parse_deliveries(bytes: &[u8]) -> Result<Vec<DeliveryRecord>> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decodes the pricing-tier list returned by `/api/pricing-driver`.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid JSON array of pricing tiers.
pub fn parse_pricing(bytes: &[u8]) -> Result<Vec<DriverPricingTier>> {
    Ok(serde_json::from_slice(bytes)?)
}
