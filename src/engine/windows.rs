//! Time-windowed bucketing of completed deliveries.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::engine::distance::estimate_distance_km;
use crate::engine::earnings::{DeliveryEarning, delivery_earning};
use crate::engine::policy::EnginePolicy;
use crate::model::{DeliveryRecord, DeliveryStatus, DriverPricingTier};

/// Totals folded over the delivered records inside one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTotals {
    pub amount: f64,
    /// Count of items that priced successfully, not of delivery records.
    pub deliveries: usize,
    pub distance_km: f64,
}

/// Earnings grouped into the three dashboard windows.
///
/// The windows are cut independently, so they are not mutually exclusive:
/// with a mid-month `now`, today's deliveries also appear in the week and
/// month buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    pub today: WindowTotals,
    pub week: WindowTotals,
    pub month: WindowTotals,
}

/// Buckets delivered records into today / rolling-week / calendar-month
/// windows, keyed on each record's reference timestamp.
///
/// `today` starts at midnight of `now` in `now`'s own timezone; `week` is a
/// rolling seven days; `month` starts at the first day of `now`'s calendar
/// month.
pub fn summarize_earnings<Tz: TimeZone>(
    deliveries: &[DeliveryRecord],
    tiers: &[DriverPricingTier],
    policy: &EnginePolicy,
    now: &DateTime<Tz>,
) -> EarningsSummary {
    let today_start = start_of_day(now);
    let week_start = now.clone().with_timezone(&Utc) - Duration::days(7);
    let month_start = start_of_month(now);

    let mut summary = EarningsSummary::default();

    for delivery in deliveries {
        if delivery.status != DeliveryStatus::Delivered {
            continue;
        }
        let Some(reference) = delivery.reference_timestamp() else {
            continue;
        };

        let earning = delivery_earning(delivery, tiers, policy);
        let distance = estimate_distance_km(delivery, policy);

        if reference >= month_start {
            fold(&mut summary.month, earning, distance);
        }
        if reference >= week_start {
            fold(&mut summary.week, earning, distance);
        }
        if reference >= today_start {
            fold(&mut summary.today, earning, distance);
        }
    }

    summary
}

/// Records whose reference timestamp falls within the last `days` days,
/// regardless of status. Used to cut the analytics windows (7/30/90 days)
/// that the performance metrics are computed over.
pub fn since_days<'a, Tz: TimeZone>(
    deliveries: &'a [DeliveryRecord],
    now: &DateTime<Tz>,
    days: i64,
) -> Vec<&'a DeliveryRecord> {
    let cutoff = now.clone().with_timezone(&Utc) - Duration::days(days);

    deliveries
        .iter()
        .filter(|d| {
            d.reference_timestamp()
                .map(|reference| reference >= cutoff)
                .unwrap_or(false)
        })
        .collect()
}

fn fold(totals: &mut WindowTotals, earning: DeliveryEarning, distance_km: f64) {
    totals.amount += earning.amount;
    totals.deliveries += earning.item_count;
    totals.distance_km += distance_km;
}

fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    local_midnight(now, now.date_naive())
}

fn start_of_month<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let first = now
        .date_naive()
        .with_day(1)
        .unwrap_or_else(|| now.date_naive());
    local_midnight(now, first)
}

fn local_midnight<Tz: TimeZone>(now: &DateTime<Tz>, date: chrono::NaiveDate) -> DateTime<Utc> {
    now.timezone()
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // Midnight can be skipped by a DST transition; a day back is close
        // enough for a reporting boundary.
        .unwrap_or_else(|| now.clone().with_timezone(&Utc) - Duration::days(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testutil::{delivery, parcel, standard_tier, ts};
    use chrono::FixedOffset;

    fn delivered_at(id: &str, when: &str, items: usize) -> DeliveryRecord {
        let parcels = (0..items)
            .map(|i| parcel(&format!("{id}-p{i}"), "Standard", Some(1.0)))
            .collect();
        let mut d = delivery(id, parcels);
        d.distance = Some(10.0);
        d.actual_delivery_time = Some(ts(when));
        d
    }

    #[test]
    fn test_buckets_by_reference_timestamp() {
        let now = ts("2025-11-15T12:00:00Z");
        let deliveries = vec![
            delivered_at("today", "2025-11-15T09:00:00Z", 1),
            delivered_at("this-week", "2025-11-12T09:00:00Z", 1),
            delivered_at("this-month", "2025-11-02T09:00:00Z", 1),
            delivered_at("last-month", "2025-10-20T09:00:00Z", 1),
        ];

        let summary =
            summarize_earnings(&deliveries, &[standard_tier()], &EnginePolicy::default(), &now);

        assert_eq!(summary.today.deliveries, 1);
        assert_eq!(summary.week.deliveries, 2);
        assert_eq!(summary.month.deliveries, 3);
    }

    #[test]
    fn test_today_is_subset_of_week_is_subset_of_month() {
        // Mid-month now, so the nesting relationship holds.
        let now = ts("2025-11-15T12:00:00Z");
        let deliveries = vec![
            delivered_at("a", "2025-11-15T01:00:00Z", 2),
            delivered_at("b", "2025-11-10T09:00:00Z", 1),
            delivered_at("c", "2025-11-01T09:00:00Z", 3),
        ];

        let summary =
            summarize_earnings(&deliveries, &[standard_tier()], &EnginePolicy::default(), &now);

        assert!(summary.today.amount <= summary.week.amount);
        assert!(summary.week.amount <= summary.month.amount);
        assert!(summary.today.deliveries <= summary.week.deliveries);
        assert!(summary.week.deliveries <= summary.month.deliveries);
        assert!(summary.today.distance_km <= summary.week.distance_km);
        assert!(summary.week.distance_km <= summary.month.distance_km);
    }

    #[test]
    fn test_only_delivered_records_count() {
        let now = ts("2025-11-15T12:00:00Z");
        // Four delivered with two items each, one failed on the same day.
        let mut deliveries: Vec<_> = (0..4)
            .map(|i| delivered_at(&format!("d{i}"), "2025-11-14T09:00:00Z", 2))
            .collect();
        let mut failed = delivered_at("failed", "2025-11-14T10:00:00Z", 2);
        failed.status = DeliveryStatus::Failed;
        deliveries.push(failed);

        let summary =
            summarize_earnings(&deliveries, &[standard_tier()], &EnginePolicy::default(), &now);

        assert_eq!(summary.week.deliveries, 8);
        assert_eq!(summary.week.distance_km, 40.0);
    }

    #[test]
    fn test_records_without_any_timestamp_are_excluded() {
        let now = ts("2025-11-15T12:00:00Z");
        let mut d = delivered_at("d1", "2025-11-15T09:00:00Z", 1);
        d.actual_delivery_time = None;

        let summary =
            summarize_earnings(&[d], &[standard_tier()], &EnginePolicy::default(), &now);
        assert_eq!(summary.month.deliveries, 0);
    }

    #[test]
    fn test_reference_falls_back_to_updated_then_created() {
        let now = ts("2025-11-15T12:00:00Z");
        let mut d = delivered_at("d1", "2025-11-15T09:00:00Z", 1);
        d.actual_delivery_time = None;
        d.created_timestamp = Some(ts("2025-11-14T08:00:00Z"));
        d.updated_timestamp = Some(ts("2025-11-15T09:05:00Z"));

        let summary =
            summarize_earnings(&[d], &[standard_tier()], &EnginePolicy::default(), &now);

        // updated_timestamp wins over created_timestamp, landing it in today.
        assert_eq!(summary.today.deliveries, 1);
    }

    #[test]
    fn test_today_boundary_uses_midnight_of_now_timezone() {
        // 01:00 on Nov 15 at UTC+5; local midnight is Nov 14 19:00 UTC.
        let zone = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = ts("2025-11-14T20:00:00Z").with_timezone(&zone);

        let before_midnight = delivered_at("early", "2025-11-14T18:30:00Z", 1);
        let after_midnight = delivered_at("late", "2025-11-14T19:30:00Z", 1);

        let summary = summarize_earnings(
            &[before_midnight, after_midnight],
            &[standard_tier()],
            &EnginePolicy::default(),
            &now,
        );

        assert_eq!(summary.today.deliveries, 1);
        assert_eq!(summary.week.deliveries, 2);
    }

    #[test]
    fn test_since_days_keeps_all_statuses() {
        let now = ts("2025-11-15T12:00:00Z");
        let mut failed = delivered_at("failed", "2025-11-14T09:00:00Z", 1);
        failed.status = DeliveryStatus::Failed;
        let deliveries = vec![
            delivered_at("recent", "2025-11-10T09:00:00Z", 1),
            failed,
            delivered_at("old", "2025-09-01T09:00:00Z", 1),
        ];

        let window = since_days(&deliveries, &now, 30);
        assert_eq!(window.len(), 2);
    }
}
