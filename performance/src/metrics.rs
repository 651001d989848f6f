//! Performance metrics calculation module

use common::{
    CumulativeReturns, PairsError, PerformanceSummary, PositionSet, Result, ReturnsSeries, Stage,
};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::drawdown::DrawdownCalculator;

/// Risk statistics for one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskStats {
    /// Maximum drawdown of `1 + cumulative` (fraction, 0.0 upwards)
    pub max_drawdown: f64,

    /// Sample standard deviation of daily returns, annualized
    pub annualized_volatility: f64,

    /// Rows holding long A / short B
    pub long_days: usize,

    /// Rows holding short A / long B
    pub short_days: usize,

    /// Rows with no position
    pub flat_days: usize,
}

/// Reduces returns to summary metrics
#[derive(Debug, Clone, Copy)]
pub struct PerformanceAnalyzer {
    notional: f64,
    trading_days: u32,
}

impl PerformanceAnalyzer {
    pub fn new(notional: f64, trading_days: u32) -> Self {
        Self {
            notional,
            trading_days,
        }
    }

    /// Headline numbers from the cumulative path and daily returns.
    ///
    /// `total_amount_return` counts both legs, hence `2 * notional`.
    pub fn analyze(
        &self,
        cumulative: &CumulativeReturns,
        returns: &ReturnsSeries,
    ) -> Result<PerformanceSummary> {
        check_lengths(cumulative, returns)?;

        let observations = returns.len();
        let total_return = cumulative.last().ok_or(PairsError::InsufficientData {
            stage: Stage::Performance,
            required: 1,
            actual: 0,
        })?;

        if observations < 2 {
            return Err(PairsError::degenerate(
                Stage::Performance,
                "Sharpe ratio needs at least two returns",
            ));
        }

        let mean = returns.values.iter().mean();
        let std_dev = returns.values.iter().std_dev();
        if !std_dev.is_finite() || std_dev == 0.0 {
            return Err(PairsError::degenerate(
                Stage::Performance,
                format!("returns standard deviation is {}", std_dev),
            ));
        }

        let days = self.trading_days as f64;
        let sharpe_ratio = mean / std_dev * days.sqrt();
        let annualized_return =
            ((1.0 + total_return).powf(days / observations as f64) - 1.0) * 100.0;

        let summary = PerformanceSummary {
            total_return,
            total_amount_return: total_return * 2.0 * self.notional,
            percentage_return: total_return * 100.0,
            annualized_return,
            sharpe_ratio,
            observations,
        };

        debug!(
            observations,
            total_return,
            sharpe_ratio,
            annualized_return,
            "Computed performance summary"
        );

        Ok(summary)
    }

    /// Drawdown, volatility and time-in-market
    pub fn risk_stats(
        &self,
        cumulative: &CumulativeReturns,
        returns: &ReturnsSeries,
        positions: &PositionSet,
    ) -> Result<RiskStats> {
        check_lengths(cumulative, returns)?;
        if returns.is_empty() {
            return Err(PairsError::InsufficientData {
                stage: Stage::Performance,
                required: 1,
                actual: 0,
            });
        }

        let mut drawdown = DrawdownCalculator::new();
        for value in &cumulative.values {
            drawdown.update(1.0 + value);
        }

        let annualized_volatility = if returns.len() < 2 {
            0.0
        } else {
            returns.values.iter().std_dev() * (self.trading_days as f64).sqrt()
        };

        let mut stats = RiskStats {
            max_drawdown: drawdown.max_drawdown(),
            annualized_volatility,
            long_days: 0,
            short_days: 0,
            flat_days: 0,
        };
        for (a, b) in positions.units_a.iter().zip(&positions.units_b) {
            if *a > 0.0 {
                stats.long_days += 1;
            } else if *a < 0.0 {
                stats.short_days += 1;
            } else if *b == 0.0 {
                stats.flat_days += 1;
            }
        }

        Ok(stats)
    }
}

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new(1000.0, 252)
    }
}

fn check_lengths(cumulative: &CumulativeReturns, returns: &ReturnsSeries) -> Result<()> {
    if cumulative.len() != returns.len() {
        return Err(PairsError::alignment(
            Stage::Performance,
            format!(
                "cumulative has {} rows, returns has {}",
                cumulative.len(),
                returns.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{NaiveDate, TimeSeries};

    fn series(values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let dates = start.iter_days().take(values.len()).collect();
        TimeSeries::new(dates, values.to_vec())
    }

    fn cumulate(returns: &[f64]) -> Vec<f64> {
        let mut growth = 1.0;
        returns
            .iter()
            .map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
            .collect()
    }

    #[test]
    fn test_summary_values() {
        let daily = [0.01, -0.02, 0.03];
        let returns = series(&daily);
        let cumulative = series(&cumulate(&daily));

        let summary = PerformanceAnalyzer::default()
            .analyze(&cumulative, &returns)
            .unwrap();

        assert!((summary.total_return - 0.019494).abs() < 1e-9);
        assert!((summary.total_amount_return - 38.988).abs() < 1e-6);
        assert!((summary.percentage_return - 1.9494).abs() < 1e-7);
        assert!((summary.annualized_return - 406.18891594).abs() < 1e-5);
        assert!((summary.sharpe_ratio - 4.20525986).abs() < 1e-6);
        assert_eq!(summary.observations, 3);
    }

    #[test]
    fn test_notional_scales_amount_only() {
        let daily = [0.01, -0.02, 0.03];
        let returns = series(&daily);
        let cumulative = series(&cumulate(&daily));

        let small = PerformanceAnalyzer::new(1000.0, 252).analyze(&cumulative, &returns).unwrap();
        let large = PerformanceAnalyzer::new(5000.0, 252).analyze(&cumulative, &returns).unwrap();

        assert!((large.total_amount_return - 5.0 * small.total_amount_return).abs() < 1e-9);
        assert_eq!(large.sharpe_ratio, small.sharpe_ratio);
    }

    #[test]
    fn test_constant_returns_are_degenerate() {
        let daily = [0.0; 4];
        let result = PerformanceAnalyzer::default().analyze(&series(&cumulate(&daily)), &series(&daily));
        assert!(matches!(
            result,
            Err(PairsError::DegenerateSeries {
                stage: Stage::Performance,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_and_misaligned_inputs() {
        let analyzer = PerformanceAnalyzer::default();

        let empty = analyzer.analyze(&series(&[]), &series(&[]));
        assert!(matches!(empty, Err(PairsError::InsufficientData { .. })));

        let single = analyzer.analyze(&series(&[0.01]), &series(&[0.01]));
        assert!(matches!(single, Err(PairsError::DegenerateSeries { .. })));

        let misaligned = analyzer.analyze(&series(&[0.01, 0.02]), &series(&[0.01]));
        assert!(matches!(misaligned, Err(PairsError::Alignment { .. })));
    }

    #[test]
    fn test_risk_stats() {
        let daily = [0.01, -0.02, 0.03];
        let returns = series(&daily);
        let cumulative = series(&cumulate(&daily));
        let positions = PositionSet {
            units_a: vec![10.0, 0.0, -10.0, 0.0],
            units_b: vec![-20.0, 0.0, 20.0, 0.0],
        };

        let stats = PerformanceAnalyzer::default()
            .risk_stats(&cumulative, &returns, &positions)
            .unwrap();

        assert!((stats.max_drawdown - 0.02).abs() < 1e-9);
        assert!((stats.annualized_volatility - 0.39949969).abs() < 1e-6);
        assert_eq!(stats.long_days, 1);
        assert_eq!(stats.short_days, 1);
        assert_eq!(stats.flat_days, 2);
    }
}
