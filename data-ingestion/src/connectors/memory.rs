use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use super::PriceSource;
use common::{PairsError, PricePoint, PriceSeries, Result};

/// Fixed price histories held in memory (tests and demos)
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<String, Vec<PricePoint>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw observations for a ticker; non-finite prices are cleaned on fetch
    pub fn with_series(mut self, ticker: impl Into<String>, points: Vec<PricePoint>) -> Self {
        self.series.insert(ticker.into(), points);
        self
    }
}

#[async_trait]
impl PriceSource for InMemorySource {
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let points = self
            .series
            .get(ticker)
            .ok_or_else(|| PairsError::DataSource(format!("unknown ticker {}", ticker)))?;

        let in_range = points
            .iter()
            .filter(|p| p.date >= start && p.date < end)
            .copied()
            .collect();

        PriceSeries::from_raw(ticker, in_range)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
