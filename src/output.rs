//! Output formatting and persistence for computed summaries.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::engine::windows::EarningsSummary;

/// One flattened earnings snapshot, appended as a CSV row per poll tick.
///
/// CSV needs a flat record, so the three windows of an [`EarningsSummary`]
/// are spread into per-window columns.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummarySnapshot {
    pub timestamp: DateTime<Utc>,
    pub driver_id: Option<String>,

    pub today_amount: f64,
    pub today_deliveries: usize,
    pub today_distance_km: f64,
    pub week_amount: f64,
    pub week_deliveries: usize,
    pub week_distance_km: f64,
    pub month_amount: f64,
    pub month_deliveries: usize,
    pub month_distance_km: f64,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl SummarySnapshot {
    fn zeroed(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            driver_id: None,
            today_amount: 0.0,
            today_deliveries: 0,
            today_distance_km: 0.0,
            week_amount: 0.0,
            week_deliveries: 0,
            week_distance_km: 0.0,
            month_amount: 0.0,
            month_deliveries: 0,
            month_distance_km: 0.0,
            error_type: None,
            error_message: None,
        }
    }

    /// Flattens an [`EarningsSummary`] into one timestamped row.
    pub fn from_summary(summary: &EarningsSummary, timestamp: DateTime<Utc>) -> Self {
        let mut s = Self::zeroed(timestamp);
        s.today_amount = summary.today.amount;
        s.today_deliveries = summary.today.deliveries;
        s.today_distance_km = summary.today.distance_km;
        s.week_amount = summary.week.amount;
        s.week_deliveries = summary.week.deliveries;
        s.week_distance_km = summary.week.distance_km;
        s.month_amount = summary.month.amount;
        s.month_deliveries = summary.month.deliveries;
        s.month_distance_km = summary.month.distance_km;
        s
    }

    /// Creates an error row so failed poll ticks stay visible in the file.
    pub fn from_error(error_type: &str, error_message: &str, timestamp: DateTime<Utc>) -> Self {
        let mut s = Self::zeroed(timestamp);
        s.error_type = Some(error_type.to_string());
        s.error_message = Some(error_message.to_string());
        s
    }

    /// Tags the row with the driver it was computed for.
    pub fn with_driver(mut self, driver_id: &str) -> Self {
        self.driver_id = Some(driver_id.to_string());
        self
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`SummarySnapshot`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, snapshot: &SummarySnapshot) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(snapshot)?;
    writer.flush()?;

    Ok(())
}
