//! Shared data model for the pairs backtest

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PairsError, Result, Stage};

/// Instrument identifier, e.g. "GC=F"
pub type Ticker = String;

/// One dated observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Cleaned price history for a single instrument
///
/// Dates are strictly increasing and every price is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: Ticker,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<Ticker>, points: Vec<PricePoint>) -> Result<Self> {
        let ticker = ticker.into();

        for (index, point) in points.iter().enumerate() {
            if !point.price.is_finite() {
                return Err(PairsError::InvalidPrice {
                    stage: Stage::Ingestion,
                    instrument: ticker,
                    index,
                    price: point.price,
                });
            }
        }
        check_increasing(points.iter().map(|p| p.date), Stage::Ingestion)?;

        Ok(Self { ticker, points })
    }

    /// Drop NaN/Inf observations, then validate what is left
    pub fn from_raw(ticker: impl Into<Ticker>, points: Vec<PricePoint>) -> Result<Self> {
        let points = points
            .into_iter()
            .filter(|p| p.price.is_finite())
            .collect();
        Self::new(ticker, points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Two price series on a shared date index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairPrices {
    dates: Vec<NaiveDate>,
    pub ticker_a: Ticker,
    prices_a: Vec<f64>,
    pub ticker_b: Ticker,
    prices_b: Vec<f64>,
}

impl PairPrices {
    pub fn new(
        dates: Vec<NaiveDate>,
        ticker_a: impl Into<Ticker>,
        prices_a: Vec<f64>,
        ticker_b: impl Into<Ticker>,
        prices_b: Vec<f64>,
    ) -> Result<Self> {
        let ticker_a = ticker_a.into();
        let ticker_b = ticker_b.into();

        if dates.is_empty() {
            return Err(PairsError::InsufficientData {
                stage: Stage::Ingestion,
                required: 1,
                actual: 0,
            });
        }
        if prices_a.len() != dates.len() || prices_b.len() != dates.len() {
            return Err(PairsError::alignment(
                Stage::Ingestion,
                format!(
                    "index has {} dates but {} has {} prices and {} has {}",
                    dates.len(),
                    ticker_a,
                    prices_a.len(),
                    ticker_b,
                    prices_b.len()
                ),
            ));
        }
        check_increasing(dates.iter().copied(), Stage::Ingestion)?;

        for (ticker, prices) in [(&ticker_a, &prices_a), (&ticker_b, &prices_b)] {
            if let Some((index, price)) = prices.iter().enumerate().find(|(_, p)| !p.is_finite()) {
                return Err(PairsError::InvalidPrice {
                    stage: Stage::Ingestion,
                    instrument: ticker.clone(),
                    index,
                    price: *price,
                });
            }
        }

        Ok(Self {
            dates,
            ticker_a,
            prices_a,
            ticker_b,
            prices_b,
        })
    }

    /// Build a pair on consecutive calendar days starting at `start`
    pub fn with_daily_index(
        start: NaiveDate,
        ticker_a: impl Into<Ticker>,
        prices_a: Vec<f64>,
        ticker_b: impl Into<Ticker>,
        prices_b: Vec<f64>,
    ) -> Result<Self> {
        let dates = (0..prices_a.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Self::new(dates, ticker_a, prices_a, ticker_b, prices_b)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices_a(&self) -> &[f64] {
        &self.prices_a
    }

    pub fn prices_b(&self) -> &[f64] {
        &self.prices_b
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Dated scalar sequence (returns, cumulative returns, spread, z-score)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Daily portfolio returns, first price row excluded
pub type ReturnsSeries = TimeSeries;

/// Running `prod(1 + r) - 1` over a [`ReturnsSeries`]
pub type CumulativeReturns = TimeSeries;

/// Boolean trading flags per timestamp
///
/// Flags are evaluated independently, so several can be true on the same row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalSet {
    pub longs: Vec<bool>,
    pub shorts: Vec<bool>,
    pub exits: Vec<bool>,
}

impl SignalSet {
    /// All flags false for `len` rows
    pub fn flat(len: usize) -> Self {
        Self {
            longs: vec![false; len],
            shorts: vec![false; len],
            exits: vec![false; len],
        }
    }

    pub fn len(&self) -> usize {
        self.longs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longs.is_empty()
    }

    pub fn is_aligned(&self) -> bool {
        self.longs.len() == self.shorts.len() && self.longs.len() == self.exits.len()
    }

    pub fn counts(&self) -> SignalCounts {
        let count = |flags: &[bool]| flags.iter().filter(|f| **f).count();
        SignalCounts {
            longs: count(&self.longs),
            shorts: count(&self.shorts),
            exits: count(&self.exits),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalCounts {
    pub longs: usize,
    pub shorts: usize,
    pub exits: usize,
}

/// Held units per instrument at each timestamp
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSet {
    pub units_a: Vec<f64>,
    pub units_b: Vec<f64>,
}

impl PositionSet {
    pub fn zeros(len: usize) -> Self {
        Self {
            units_a: vec![0.0; len],
            units_b: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.units_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units_a.is_empty()
    }

    /// Position held at row `index` as (units of A, units of B)
    pub fn at(&self, index: usize) -> Option<(f64, f64)> {
        Some((*self.units_a.get(index)?, *self.units_b.get(index)?))
    }
}

/// Headline performance numbers for one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Final cumulative return as a fraction
    pub total_return: f64,

    /// Total return in currency units on the combined long and short capital
    pub total_amount_return: f64,

    /// Total return in percent
    pub percentage_return: f64,

    /// Annualized return in percent
    pub annualized_return: f64,

    /// Annualized Sharpe ratio (no risk-free rate)
    pub sharpe_ratio: f64,

    /// Number of return observations used
    pub observations: usize,
}

fn check_increasing(dates: impl Iterator<Item = NaiveDate>, stage: Stage) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;
    for (index, date) in dates.enumerate() {
        if let Some(prev) = previous {
            if date <= prev {
                return Err(PairsError::alignment(
                    stage,
                    format!("date {} at row {} does not follow {}", date, index, prev),
                ));
            }
        }
        previous = Some(date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_price_series_rejects_unordered_dates() {
        let points = vec![PricePoint::new(day(2), 10.0), PricePoint::new(day(1), 11.0)];
        let result = PriceSeries::new("A", points);
        assert!(matches!(result, Err(PairsError::Alignment { .. })));
    }

    #[test]
    fn test_price_series_from_raw_drops_non_finite() {
        let points = vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(2), f64::NAN),
            PricePoint::new(day(3), f64::INFINITY),
            PricePoint::new(day(4), 12.0),
        ];
        let series = PriceSeries::from_raw("A", points).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.last_date(), Some(day(4)));
    }

    #[test]
    fn test_pair_prices_length_mismatch() {
        let result = PairPrices::new(vec![day(1), day(2)], "A", vec![1.0, 2.0], "B", vec![1.0]);
        assert!(matches!(
            result,
            Err(PairsError::Alignment {
                stage: Stage::Ingestion,
                ..
            })
        ));
    }

    #[test]
    fn test_pair_prices_daily_index() {
        let pair =
            PairPrices::with_daily_index(day(1), "A", vec![1.0, 2.0, 3.0], "B", vec![3.0, 2.0, 1.0])
                .unwrap();
        assert_eq!(pair.len(), 3);
        assert_eq!(pair.dates()[2], day(3));
    }

    #[test]
    fn test_signal_counts() {
        let signals = SignalSet {
            longs: vec![true, false, true],
            shorts: vec![false, false, false],
            exits: vec![false, true, true],
        };
        let counts = signals.counts();
        assert_eq!(counts.longs, 2);
        assert_eq!(counts.shorts, 0);
        assert_eq!(counts.exits, 2);
        assert!(signals.is_aligned());
    }
}
