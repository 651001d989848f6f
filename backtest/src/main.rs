use anyhow::{Context, Result};
use tracing::{info, Level};

use backtest::PairsBacktest;
use common::config::load_config;
use data_ingestion::CsvPriceSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config_path = std::env::var("PAIRS_CONFIG").unwrap_or_else(|_| "pairs.toml".to_string());
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    info!(
        ticker_a = %config.tickers[0],
        ticker_b = %config.tickers[1],
        start = %config.start_date,
        end = %config.end_date,
        "Starting pairs backtest"
    );

    let source = CsvPriceSource::from_settings(&config.data);
    let backtest = PairsBacktest::new(config)?;
    let report = backtest.run_from_source(&source).await?;

    let summary = &report.summary;
    info!(
        total_amount_return = summary.total_amount_return,
        percentage_return = summary.percentage_return,
        annualized_return = summary.annualized_return,
        sharpe_ratio = summary.sharpe_ratio,
        max_drawdown = report.risk.max_drawdown,
        "Performance summary"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
