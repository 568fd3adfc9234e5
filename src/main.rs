use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use play_extract::config::{DEFAULT_CONFIG_PATH, DEFAULT_INPUT_PATH, Settings};
use play_extract::export::{export_csv, export_json};
use play_extract::fetch::PlayClient;
use play_extract::input::load_app_ids;
use play_extract::pipeline::run_batch;

#[derive(Parser)]
#[command(
    name = "play_extract",
    about = "Google Play data extractor: scrape metadata for the given app IDs"
)]
struct Cli {
    /// File with app IDs, one per line
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    input_file: PathBuf,
    /// Settings JSON
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// JSON output path (overrides the settings file)
    #[arg(long)]
    output_json: Option<PathBuf>,
    /// CSV output path (overrides the settings file)
    #[arg(long)]
    output_csv: Option<PathBuf>,
    /// Store locale (hl), e.g. en, fr
    #[arg(long)]
    locale: Option<String>,
    /// Store country (gl), e.g. us, gb, de
    #[arg(long)]
    country: Option<String>,
    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// Check robots.txt before fetching pages
    #[arg(long)]
    respect_robots: bool,
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = Settings::load(&cli.config);
    if let Some(locale) = cli.locale {
        settings.locale = locale;
    }
    if let Some(country) = cli.country {
        settings.country = country;
    }
    if let Some(timeout) = cli.timeout.filter(|t| *t > 0) {
        settings.timeout = timeout;
    }
    settings.respect_robots |= cli.respect_robots;

    let json_path = settings.json_output_path(cli.output_json);
    let csv_path = settings.csv_output_path(cli.output_csv);

    let app_ids = load_app_ids(&cli.input_file).context("failed to load app IDs")?;
    info!("loaded {} app IDs from {}", app_ids.len(), cli.input_file.display());

    let mut client = PlayClient::new(&settings).context("failed to build HTTP client")?;
    if settings.respect_robots {
        client.load_robots().await.context("failed to load robots.txt")?;
    }

    let results = run_batch(&client, &app_ids, &settings).await?;

    match export_json(&results, &json_path) {
        Ok(()) => info!("JSON output written to {}", json_path.display()),
        Err(e) => error!("failed to write JSON output: {e}"),
    }
    match export_csv(&results, &csv_path) {
        Ok(()) => info!("CSV output written to {}", csv_path.display()),
        Err(e) => error!("failed to write CSV output: {e}"),
    }

    info!("completed processing {} apps", results.len());
    Ok(())
}
