// Pair Signal Generation
// Spread statistics, cointegration check and z-score threshold signals

pub mod cointegration;
pub mod mackinnon;
pub mod signals;
pub mod spread;
pub mod stationarity;

pub use cointegration::{engle_granger, engle_granger_pair, CointegrationResult};
pub use mackinnon::{CriticalValues, Surface};
pub use signals::{generate_signals, SignalGenerator};
pub use spread::{spread_and_zscore, SpreadAnalysis, SpreadEngine};
pub use stationarity::{adf_test, default_max_lag, AdfRegression, AdfResult};
