//! Pairs-trading backtest
//!
//! `BacktestEngine` turns signals into positions and returns;
//! `PairsBacktest` runs every stage from price import to performance report.

pub mod engine;
pub mod pipeline;

pub use engine::{BacktestEngine, BacktestResult};
pub use pipeline::{BacktestReport, PairsBacktest};
