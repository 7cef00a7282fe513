//! CLI entry point for the Delivery Rater tool.
//!
//! Provides subcommands for analyzing delivery/pricing payloads, computing
//! a driver's earnings summary and performance metrics from the parcel
//! gateway, and watching several drivers under a polling loop.

mod infra;
mod services;

use crate::infra::gateway::GatewayClient;
use crate::services::delivery_api::DeliveryApi;
use anyhow::Result;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use delivery_rater::engine::performance::performance_metrics;
use delivery_rater::engine::policy::EnginePolicy;
use delivery_rater::engine::windows::{since_days, summarize_earnings};
use delivery_rater::{
    fetch::{BasicClient, fetch_bytes},
    output::{SummarySnapshot, append_record, print_json},
    parser::{parse_deliveries, parse_pricing},
};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "delivery_rater")]
#[command(about = "A tool to compute driver earnings and performance from delivery records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute earnings and performance from delivery/pricing JSON
    Analyze {
        /// Path to file or URL with the delivery records
        #[arg(value_name = "DELIVERIES_FILE_OR_URL")]
        deliveries: String,

        /// Path to file or URL with the pricing tiers
        #[arg(value_name = "PRICING_FILE_OR_URL")]
        pricing: String,

        /// Analytics window in days for the performance metrics
        #[arg(short, long, default_value_t = 30)]
        days: i64,

        /// Baseline handling minutes for the efficiency comparison
        #[arg(short, long, default_value_t = 30.0)]
        baseline_minutes: f64,
    },
    /// Fetch a driver's records and compute the earnings summary
    Summary {
        /// Driver to compute for
        #[arg(short, long)]
        driver_id: String,

        /// CSV file to append the snapshot to
        #[arg(short, long, default_value = "earnings.csv")]
        output: String,
    },
    /// Fetch a driver's records and compute performance metrics
    Performance {
        /// Driver to compute for
        #[arg(short, long)]
        driver_id: String,

        /// Analytics window in days (the dashboards use 7, 30, or 90)
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// Baseline handling minutes for the efficiency comparison
        #[arg(short, long, default_value_t = 30.0)]
        baseline_minutes: f64,
    },
    /// Poll the gateway and append per-driver earnings snapshots
    Watch {
        /// Drivers to watch
        #[arg(short, long = "driver-id", required = true)]
        driver_ids: Vec<String>,

        /// Maximum number of concurrent driver fetches
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,

        /// Poll each driver every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        interval: u64,

        /// Number of samples to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        samples: usize,

        /// Directory to save CSV files (one per driver per day)
        #[arg(short, long, default_value = "drivers")]
        output_dir: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/delivery_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("delivery_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            deliveries,
            pricing,
            days,
            baseline_minutes,
        } => {
            let delivery_bytes = fetcher(&deliveries).await?;
            let pricing_bytes = fetcher(&pricing).await?;

            let deliveries = parse_deliveries(&delivery_bytes)?;
            let tiers = parse_pricing(&pricing_bytes)?;
            let policy = EnginePolicy::with_baseline_minutes(baseline_minutes);
            let now = Local::now();

            let summary = summarize_earnings(&deliveries, &tiers, &policy, &now);
            let window = since_days(&deliveries, &now, days);
            let metrics = performance_metrics(&window, &tiers, &policy);

            print_json(&summary)?;
            print_json(&metrics)?;
        }
        Commands::Summary { driver_id, output } => {
            let api = gateway_client().await?;
            let (deliveries, tiers) =
                tokio::try_join!(api.driver_deliveries(&driver_id), api.active_pricing())?;

            let policy = EnginePolicy::default();
            let now = Local::now();
            let summary = summarize_earnings(&deliveries, &tiers, &policy, &now);

            print_json(&summary)?;
            let snapshot =
                SummarySnapshot::from_summary(&summary, Utc::now()).with_driver(&driver_id);
            append_record(&output, &snapshot)?;
        }
        Commands::Performance {
            driver_id,
            days,
            baseline_minutes,
        } => {
            let api = gateway_client().await?;
            let (deliveries, tiers) =
                tokio::try_join!(api.driver_deliveries(&driver_id), api.active_pricing())?;

            let policy = EnginePolicy::with_baseline_minutes(baseline_minutes);
            let now = Local::now();
            let window = since_days(&deliveries, &now, days);

            info!(
                total = deliveries.len(),
                in_window = window.len(),
                days,
                "Computing performance metrics"
            );

            let metrics = performance_metrics(&window, &tiers, &policy);
            print_json(&metrics)?;
        }
        Commands::Watch {
            driver_ids,
            concurrency,
            interval,
            samples,
            output_dir,
        } => {
            watch_drivers(driver_ids, concurrency, interval, samples, output_dir).await?;
        }
    }

    Ok(())
}

/// Loads a payload from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %source))]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new();
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}

/// Builds a gateway client from the environment: a pre-established session
/// cookie when available, otherwise a credential login.
async fn gateway_client() -> Result<GatewayClient> {
    let base_url = std::env::var("PARCEL_API_BASE_URL")
        .map_err(|_| anyhow::anyhow!("PARCEL_API_BASE_URL must be set"))?;

    if let Ok(cookie) = std::env::var("PARCEL_SESSION_COOKIE") {
        return Ok(GatewayClient::with_cookie(base_url, cookie));
    }

    let email = std::env::var("PARCEL_API_EMAIL").map_err(|_| {
        anyhow::anyhow!("PARCEL_API_EMAIL must be set when PARCEL_SESSION_COOKIE is not")
    })?;
    let password = std::env::var("PARCEL_API_PASSWORD").map_err(|_| {
        anyhow::anyhow!("PARCEL_API_PASSWORD must be set when PARCEL_SESSION_COOKIE is not")
    })?;

    GatewayClient::login(base_url, &email, &password).await
}

/// Polls every watched driver concurrently, computing and appending one
/// earnings snapshot per driver per tick. Pricing is fetched once per round
/// and shared; it changes far less often than the deliveries do.
#[tracing::instrument(
    skip(driver_ids),
    fields(output_dir = %output_dir, concurrency, interval, samples)
)]
async fn watch_drivers(
    driver_ids: Vec<String>,
    concurrency: usize,
    interval: u64,
    samples: usize,
    output_dir: String,
) -> Result<()> {
    let api = Arc::new(gateway_client().await?);
    let policy = EnginePolicy::default();

    info!(
        driver_count = driver_ids.len(),
        "Drivers ready for watching"
    );

    if samples == 0 {
        info!(interval, "Sampling infinitely. Press Ctrl+C to stop.");
    } else {
        info!(samples, interval, "Starting sample collection");
    }

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(&output_dir)?;

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency));

    let mut sample_count = 0;

    loop {
        // Check if we've reached the sample limit (0 = infinite)
        if samples > 0 && sample_count >= samples {
            break;
        }

        sample_count += 1;

        info!(
            sample = sample_count,
            total = if samples == 0 { None } else { Some(samples) },
            "Starting sample round"
        );

        // One pricing fetch per round; a failed fetch skips the round
        // rather than recording zeroed earnings against every driver.
        let tiers = match api.active_pricing().await {
            Ok(tiers) => Arc::new(tiers),
            Err(e) => {
                error!(error = %e, "Pricing fetch failed, skipping round");
                if samples == 0 || sample_count < samples {
                    tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
                }
                continue;
            }
        };

        let mut tasks = vec![];

        for driver_id in &driver_ids {
            let sem = semaphore.clone();
            let api = api.clone();
            let tiers = tiers.clone();
            let output_dir = output_dir.to_string();
            let driver_id = driver_id.clone();
            let policy = policy.clone();

            let driver_span = tracing::info_span!("process_driver", driver_id = %driver_id);

            let task = tokio::spawn(
                async move {
                    let _permit = match sem.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };

                    // Per-driver directory with date-based CSV files
                    let now = Utc::now();
                    let date = now.format("%Y-%m-%d").to_string();
                    let driver_dir = format!("{}/driver_id={}", output_dir, driver_id);

                    if let Err(e) = std::fs::create_dir_all(&driver_dir) {
                        error!(dir = %driver_dir, error = %e, "Failed to create driver directory");
                        return;
                    }

                    let output_file = format!("{}/date={}.csv", driver_dir, date);

                    let fetch_start = std::time::Instant::now();
                    match api.driver_deliveries(&driver_id).await {
                        Ok(deliveries) => {
                            let elapsed = fetch_start.elapsed();
                            if elapsed.as_secs() > 15 {
                                warn!(elapsed_secs = elapsed.as_secs(), "Delivery fetch was slow");
                            }
                            debug!(
                                delivery_count = deliveries.len(),
                                "Deliveries received, computing summary"
                            );

                            let local_now = Local::now();
                            let summary =
                                summarize_earnings(&deliveries, &tiers, &policy, &local_now);
                            let snapshot = SummarySnapshot::from_summary(&summary, now)
                                .with_driver(&driver_id);

                            if let Err(e) = append_record(&output_file, &snapshot) {
                                error!(error = %e, "Failed to write snapshot for driver");
                            } else {
                                info!(
                                    week_amount = summary.week.amount,
                                    week_deliveries = summary.week.deliveries,
                                    "Driver summary recorded"
                                );
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Delivery fetch failed");
                            let snapshot =
                                SummarySnapshot::from_error("fetch_error", &e.to_string(), now)
                                    .with_driver(&driver_id);
                            let _ = append_record(&output_file, &snapshot);
                        }
                    }
                }
                .instrument(driver_span),
            );

            tasks.push(task);
        }

        // Wait for all tasks to complete
        for task in tasks {
            let _ = task.await;
        }

        // If not the last sample, wait before next iteration
        if samples == 0 || sample_count < samples {
            info!(interval, "Waiting before next sample");
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    info!(output_dir = %output_dir, "Finished watching drivers");
    Ok(())
}
