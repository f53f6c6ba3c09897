//! CLI entry point for the ride-booking analysis tool.
//!
//! Provides subcommands for answering the five booking questions in one run,
//! and for inspecting value counts, fare outliers and numeric summaries of a
//! single column.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ride_insights::analyzers::aggregate::{completed, value_counts};
use ride_insights::analyzers::analyzer::analyze;
use ride_insights::analyzers::outlier::{outlier_bounds, partition};
use ride_insights::analyzers::profile::describe;
use ride_insights::analyzers::types::ABSENT_LABEL;
use ride_insights::booking::BOOKING_VALUE;
use ride_insights::config::AnalysisConfig;
use ride_insights::loader::load_table;
use ride_insights::output::{log_report, write_json, write_series_csv};
use ride_insights::table::Table;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride_insights")]
#[command(about = "Descriptive analysis of ride-booking datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Delimited dataset file with a header row
    #[arg(value_name = "FILE")]
    source: String,

    /// JSON config file with loader and question settings
    #[arg(short, long)]
    config: Option<String>,

    /// Field delimiter, overrides the config file
    #[arg(short, long)]
    delimiter: Option<char>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer the five booking questions and emit chart series
    Analyze {
        #[command(flatten)]
        input: Input,

        /// Write the full report as JSON to this path
        #[arg(long)]
        json: Option<String>,

        /// Directory to write one `label,value` CSV per chart series
        #[arg(long)]
        series_dir: Option<String>,
    },
    /// Value counts of one column, absent values included
    Counts {
        #[command(flatten)]
        input: Input,

        /// Column to count
        #[arg(long)]
        column: String,
    },
    /// IQR fences and outlier count of a numeric column over completed rides
    Outliers {
        #[command(flatten)]
        input: Input,

        /// Numeric column
        #[arg(long, default_value = BOOKING_VALUE)]
        column: String,
    },
    /// Count, mean, std, min, quartiles and max of a numeric column
    Describe {
        #[command(flatten)]
        input: Input,

        /// Numeric column
        #[arg(long)]
        column: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_insights.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_insights.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            json,
            series_dir,
        } => {
            let (config, table) = load(&input)?;
            let report = analyze(&input.source, &table, &config.questions)
                .with_context(|| format!("analyzing '{}'", input.source))?;

            log_report(&report);

            if let Some(path) = json {
                write_json(&path, &report)?;
            }
            if let Some(dir) = series_dir {
                for series in report.series() {
                    write_series_csv(&dir, series)?;
                }
                info!(dir = %dir, count = report.series().len(), "Series CSVs written");
            }
        }
        Commands::Counts { input, column } => {
            let (_, table) = load(&input)?;
            let counts = value_counts(&table, &column)?;
            for (entry, (_, share)) in counts.entries.iter().zip(counts.shares()) {
                info!(
                    value = entry.value.as_deref().unwrap_or(ABSENT_LABEL),
                    count = entry.count,
                    share_pct = share,
                    "Count"
                );
            }
            info!(column = %column, distinct = counts.entries.len(), total = counts.total(), "Value counts");
        }
        Commands::Outliers { input, column } => {
            let (_, table) = load(&input)?;
            let rides = completed(&table)?;
            let bounds = outlier_bounds(&rides, &column)?;
            let (inliers, outliers) = partition(&rides, &column, &bounds)?;

            info!(
                column = %column,
                q1 = bounds.q1,
                q3 = bounds.q3,
                iqr = bounds.iqr,
                lower_fence = bounds.lower_fence,
                upper_fence = bounds.upper_fence,
                inliers = inliers.len(),
                outliers = outliers.len(),
                "Outlier fences"
            );
        }
        Commands::Describe { input, column } => {
            let (_, table) = load(&input)?;
            let summary = describe(&table, &column)?;
            info!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Resolves the config for `input` and loads its dataset.
#[tracing::instrument(skip(input), fields(source = %input.source))]
fn load(input: &Input) -> Result<(AnalysisConfig, Table)> {
    let mut config = match &input.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(delimiter) = input.delimiter {
        config.loader.delimiter = delimiter;
    }

    let table = load_table(&input.source, &config.loader)?;
    Ok((config, table))
}
