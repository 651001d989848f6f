pub mod csv_file;
pub mod memory;

pub use csv_file::CsvPriceSource;
pub use memory::InMemorySource;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{PriceSeries, Result};

/// Supplier of cleaned daily prices for one instrument
///
/// Implementations return observations with `start <= date < end`, in
/// increasing date order, with NaN/Inf prices already removed.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;

    /// Human-readable name for logs
    fn name(&self) -> &str;
}
