//! Process an option-chain export and deliver the filtered contract groups.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use optflow_core::Config;
use optflow_delivery::{
    CsvFileSink, CsvFileSource, LatestFileSource, LogNotifier, NoopNotifier, Notifier,
    OptionsJob, SqliteSink, TableSink, TableSource,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NotifyMode {
    /// Announce through the log
    Log,
    /// Do not announce
    Off,
}

#[derive(Debug, Parser)]
#[command(name = "options-job", version, about = "Aggregate option-chain volume by contract and filter active bullish groups")]
struct Cli {
    /// Input CSV file
    #[arg(long, conflicts_with = "input_dir", required_unless_present = "input_dir")]
    input: Option<PathBuf>,

    /// Use the most recently modified CSV in this directory
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory for the result CSV
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Store results in this SQLite database instead of a CSV directory
    #[arg(long)]
    sqlite: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// How to announce the result
    #[arg(long, value_enum, default_value_t = NotifyMode::Log)]
    notify: NotifyMode,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let as_of = cli.as_of.unwrap_or_else(|| Local::now().date_naive());

    let source: Box<dyn TableSource> = match (&cli.input, &cli.input_dir) {
        (Some(file), _) => Box::new(CsvFileSource::new(file)),
        (None, Some(dir)) => Box::new(LatestFileSource::new(dir)),
        (None, None) => anyhow::bail!("either --input or --input-dir is required"),
    };

    let sink: Box<dyn TableSink> = match &cli.sqlite {
        Some(db) => {
            let run_id = format!("{}-{}", as_of, Local::now().format("%H%M%S%.3f"));
            Box::new(SqliteSink::new(db, run_id))
        }
        None => Box::new(CsvFileSink::new(&cli.output_dir)),
    };

    let notifier: Box<dyn Notifier> = match cli.notify {
        NotifyMode::Log => Box::new(LogNotifier),
        NotifyMode::Off => Box::new(NoopNotifier),
    };

    let job = OptionsJob::new(config, source, sink, notifier);
    let report = job.run(as_of).context("options job failed")?;

    println!(
        "{} rows -> {} groups -> {} kept; saved to {}",
        report.stats.input_rows,
        report.stats.groups,
        report.stats.kept_groups,
        report.persisted.location
    );

    Ok(())
}
