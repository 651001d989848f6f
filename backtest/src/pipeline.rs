//! End-to-end pairs backtest
//!
//! Chains import, cointegration check, spread and signals, simulation and
//! performance reporting for one configured pair.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::{
    CumulativeReturns, NaiveDate, PairPrices, PairsConfig, PerformanceSummary, PositionSet,
    ReturnsSeries, SignalCounts, SignalSet, SignalThresholds,
};
use data_ingestion::{import_pair, PriceSource};
use performance::{PerformanceAnalyzer, RiskStats};
use signal_generation::{engle_granger_pair, CointegrationResult, SignalGenerator};

use crate::engine::BacktestEngine;

/// Everything one run produces, ready for logging or serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub tickers: [String; 2],
    pub dates: Vec<NaiveDate>,
    pub spread: Vec<f64>,
    pub zscore: Vec<f64>,
    pub thresholds: SignalThresholds,
    pub signals: SignalSet,
    pub signal_counts: SignalCounts,
    pub positions: PositionSet,
    pub returns: ReturnsSeries,
    pub cumulative: CumulativeReturns,
    pub summary: PerformanceSummary,
    pub risk: RiskStats,
    /// Informational; `None` when the test could not be run on this sample
    pub cointegration: Option<CointegrationResult>,
    pub cointegrated: bool,
}

/// Configured backtest for one pair
#[derive(Debug, Clone)]
pub struct PairsBacktest {
    config: PairsConfig,
}

impl PairsBacktest {
    pub fn new(config: PairsConfig) -> Result<Self> {
        config.validate().context("Invalid backtest configuration")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PairsConfig {
        &self.config
    }

    /// Load the configured tickers and date range from `source`, then run
    pub async fn run_from_source(&self, source: &dyn PriceSource) -> Result<BacktestReport> {
        let [ticker_a, ticker_b] = &self.config.tickers;
        let prices = import_pair(
            source,
            [ticker_a.as_str(), ticker_b.as_str()],
            self.config.start_date,
            self.config.end_date,
        )
        .await
        .with_context(|| format!("Failed to import {}/{} from {}", ticker_a, ticker_b, source.name()))?;

        self.run(&prices)
    }

    /// Run every stage on already aligned prices
    pub fn run(&self, prices: &PairPrices) -> Result<BacktestReport> {
        let settings = &self.config.backtest;

        let cointegration = match engle_granger_pair(prices, &self.config.cointegration) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(error = %e, "Cointegration test skipped");
                None
            }
        };
        let significance = self.config.cointegration.significance;
        let cointegrated = cointegration
            .as_ref()
            .map_or(false, |c| c.is_cointegrated(significance));

        if let Some(result) = &cointegration {
            if cointegrated {
                info!(p_value = result.p_value, hedge_ratio = result.hedge_ratio, "Pair is cointegrated");
            } else {
                warn!(
                    p_value = result.p_value,
                    significance,
                    "Pair is not cointegrated at the configured significance"
                );
            }
        }

        let generator = SignalGenerator::new(self.config.signals).with_zscore_mode(self.config.zscore);
        let (signals, analysis) = generator
            .generate_for_pair(prices)
            .context("Failed to generate signals")?;
        let signal_counts = signals.counts();

        let simulation = BacktestEngine::new(settings.notional)
            .run(&signals, prices)
            .context("Failed to simulate positions")?;

        let analyzer = PerformanceAnalyzer::new(settings.notional, settings.trading_days_per_year);
        let summary = analyzer
            .analyze(&simulation.cumulative, &simulation.returns)
            .context("Failed to compute performance summary")?;
        let risk = analyzer
            .risk_stats(&simulation.cumulative, &simulation.returns, &simulation.positions)
            .context("Failed to compute risk statistics")?;

        info!(
            ticker_a = %prices.ticker_a,
            ticker_b = %prices.ticker_b,
            rows = prices.len(),
            longs = signal_counts.longs,
            shorts = signal_counts.shorts,
            exits = signal_counts.exits,
            total_return = summary.total_return,
            sharpe_ratio = summary.sharpe_ratio,
            "Backtest complete"
        );

        Ok(BacktestReport {
            tickers: [prices.ticker_a.clone(), prices.ticker_b.clone()],
            dates: prices.dates().to_vec(),
            spread: analysis.spread,
            zscore: analysis.zscore,
            thresholds: self.config.signals,
            signals,
            signal_counts,
            positions: simulation.positions,
            returns: simulation.returns,
            cumulative: simulation.cumulative,
            summary,
            risk,
            cointegration,
            cointegrated,
        })
    }
}
