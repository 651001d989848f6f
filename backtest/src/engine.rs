// Backtest Engine
// Dollar-neutral position simulation over aligned pair prices

use common::{
    CumulativeReturns, PairPrices, PairsError, PositionSet, Result, ReturnsSeries, SignalSet,
    Stage, TimeSeries,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Simulated positions and the return path they produce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// One row per price row
    pub positions: PositionSet,
    /// One row per price row after the first
    pub returns: ReturnsSeries,
    pub cumulative: CumulativeReturns,
}

/// Sizes each leg at a fixed notional and marks positions to market
#[derive(Debug, Clone, Copy)]
pub struct BacktestEngine {
    notional: f64,
}

impl BacktestEngine {
    pub fn new(notional: f64) -> Self {
        Self { notional }
    }

    pub fn notional(&self) -> f64 {
        self.notional
    }

    /// Positions are decided per row with priority long, short, exit. A row
    /// with no flag is flat; nothing is carried over from the previous row.
    /// Each position earns the next row's price change.
    pub fn run(&self, signals: &SignalSet, prices: &PairPrices) -> Result<BacktestResult> {
        if !signals.is_aligned() || signals.len() != prices.len() {
            return Err(PairsError::alignment(
                Stage::Backtest,
                format!(
                    "signals have {} rows, prices have {}",
                    signals.len(),
                    prices.len()
                ),
            ));
        }
        check_prices(&prices.ticker_a, prices.prices_a())?;
        check_prices(&prices.ticker_b, prices.prices_b())?;

        let positions = self.positions(signals, prices);

        let a = prices.prices_a();
        let b = prices.prices_b();
        let values: Vec<f64> = (1..prices.len())
            .map(|t| {
                let return_a = a[t] / a[t - 1] - 1.0;
                let return_b = b[t] / b[t - 1] - 1.0;
                positions.units_a[t - 1] * return_a + positions.units_b[t - 1] * return_b
            })
            .collect();

        let mut growth = 1.0;
        let cumulative_values: Vec<f64> = values
            .iter()
            .map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
            .collect();

        let dates = prices.dates()[1..].to_vec();
        let counts = signals.counts();
        debug!(
            rows = prices.len(),
            longs = counts.longs,
            shorts = counts.shorts,
            final_return = cumulative_values.last().copied().unwrap_or(0.0),
            "Backtest simulated"
        );

        Ok(BacktestResult {
            positions,
            returns: TimeSeries::new(dates.clone(), values),
            cumulative: TimeSeries::new(dates, cumulative_values),
        })
    }

    fn positions(&self, signals: &SignalSet, prices: &PairPrices) -> PositionSet {
        let mut positions = PositionSet::zeros(prices.len());
        let a = prices.prices_a();
        let b = prices.prices_b();

        for t in 0..prices.len() {
            let (units_a, units_b) = if signals.longs[t] {
                (self.notional / a[t], -self.notional / b[t])
            } else if signals.shorts[t] {
                (-self.notional / a[t], self.notional / b[t])
            } else {
                (0.0, 0.0)
            };
            positions.units_a[t] = units_a;
            positions.units_b[t] = units_b;
        }

        positions
    }
}

impl Default for BacktestEngine {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

fn check_prices(instrument: &str, prices: &[f64]) -> Result<()> {
    match prices
        .iter()
        .position(|p| *p == 0.0 || !p.is_finite())
    {
        Some(index) => Err(PairsError::InvalidPrice {
            stage: Stage::Backtest,
            instrument: instrument.to_string(),
            index,
            price: prices[index],
        }),
        None => Ok(()),
    }
}
