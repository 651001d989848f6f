//! Price acquisition for the pairs backtest
//!
//! Sources hand back cleaned per-instrument series; `import_pair` joins two
//! of them onto a shared date index.

pub mod alignment;
pub mod connectors;

pub use alignment::{align_pair, import_pair};
pub use connectors::{CsvPriceSource, InMemorySource, PriceSource};
