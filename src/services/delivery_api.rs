//! Trait and types for the parcel gateway's read-only delivery API.

use anyhow::Result;

use delivery_rater::model::{DeliveryRecord, DriverPricingTier};

/// Abstraction over the external delivery-tracking gateway.
///
/// The gateway owns delivery state, status transitions, and authentication.
/// This side only reads consistent snapshots to compute over; nothing is
/// ever written back.
#[async_trait::async_trait]
pub trait DeliveryApi {
    /// All delivery records currently assigned to `driver_id`, with nested
    /// parcels and status history.
    async fn driver_deliveries(&self, driver_id: &str) -> Result<Vec<DeliveryRecord>>;

    /// The active driver pricing tiers. Changes rarely; callers may reuse
    /// one fetch across a polling round.
    async fn active_pricing(&self) -> Result<Vec<DriverPricingTier>>;
}
