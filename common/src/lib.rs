//! Shared types for the pairs-trading backtest workspace
//!
//! Holds the data model passed between stages, the error taxonomy, and the
//! run configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BacktestSettings, CointegrationConfig, DataSettings, PairsConfig, SignalThresholds,
    ZScoreMode,
};
pub use error::{PairsError, Result, Stage};
pub use types::{
    CumulativeReturns, PairPrices, PerformanceSummary, PositionSet, PricePoint, PriceSeries,
    ReturnsSeries, SignalCounts, SignalSet, Ticker, TimeSeries,
};

pub use chrono::NaiveDate;
