//! Parcel-type to pricing-tier resolution.

use crate::model::DriverPricingTier;

/// Reserved tier name used as the last-resort pricing fallback.
pub const DEFAULT_TIER: &str = "Standard";

/// Maps a free-text parcel type to a pricing tier.
///
/// Lookup order among active tiers: exact match, then ASCII
/// case-insensitive match, then the reserved [`DEFAULT_TIER`]. `None` means
/// no pricing is available; callers skip the item rather than fail.
pub fn resolve_tier<'a>(
    parcel_type: &str,
    tiers: &'a [DriverPricingTier],
) -> Option<&'a DriverPricingTier> {
    if let Some(tier) = active(tiers).find(|t| t.parcel_type == parcel_type) {
        return Some(tier);
    }

    if let Some(tier) = active(tiers).find(|t| t.parcel_type.eq_ignore_ascii_case(parcel_type)) {
        return Some(tier);
    }

    active(tiers).find(|t| t.parcel_type == DEFAULT_TIER)
}

fn active(tiers: &[DriverPricingTier]) -> impl Iterator<Item = &DriverPricingTier> {
    tiers.iter().filter(|t| t.is_active)
}
