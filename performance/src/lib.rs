//! Performance Reporting
//!
//! Reduces a simulated return path to headline numbers (total, annualized,
//! Sharpe) and a few risk statistics.

mod drawdown;
pub mod metrics;

pub use drawdown::DrawdownCalculator;
pub use metrics::{PerformanceAnalyzer, RiskStats};
