//! Joins two instruments onto one date index

use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::connectors::PriceSource;
use common::{PairPrices, PairsError, PriceSeries, Result, Stage};

/// Inner-join two cleaned series on date
///
/// Dates present in only one series are dropped, mirroring a
/// "drop any row with a missing value" cleaning pass.
pub fn align_pair(a: &PriceSeries, b: &PriceSeries) -> Result<PairPrices> {
    let (points_a, points_b) = (a.points(), b.points());
    let capacity = points_a.len().min(points_b.len());

    let mut dates = Vec::with_capacity(capacity);
    let mut prices_a = Vec::with_capacity(capacity);
    let mut prices_b = Vec::with_capacity(capacity);

    let (mut i, mut j) = (0, 0);
    while i < points_a.len() && j < points_b.len() {
        match points_a[i].date.cmp(&points_b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dates.push(points_a[i].date);
                prices_a.push(points_a[i].price);
                prices_b.push(points_b[j].price);
                i += 1;
                j += 1;
            }
        }
    }

    if dates.is_empty() {
        return Err(PairsError::InsufficientData {
            stage: Stage::Ingestion,
            required: 1,
            actual: 0,
        });
    }

    let unmatched = (points_a.len() - dates.len()) + (points_b.len() - dates.len());
    if unmatched > 0 {
        warn!(
            ticker_a = %a.ticker,
            ticker_b = %b.ticker,
            unmatched,
            "Dropped dates missing from one leg"
        );
    }

    PairPrices::new(dates, a.ticker.clone(), prices_a, b.ticker.clone(), prices_b)
}

/// Fetch both legs from `source` and align them
pub async fn import_pair(
    source: &dyn PriceSource,
    tickers: [&str; 2],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PairPrices> {
    let [ticker_a, ticker_b] = tickers;

    let (a, b) = tokio::try_join!(
        source.fetch(ticker_a, start, end),
        source.fetch(ticker_b, start, end)
    )?;

    let pair = align_pair(&a, &b)?;

    info!(
        source = source.name(),
        ticker_a,
        ticker_b,
        rows = pair.len(),
        first = ?pair.dates().first(),
        last = ?pair.dates().last(),
        "Imported aligned pair"
    );

    Ok(pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::InMemorySource;
    use common::PricePoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn series(ticker: &str, points: &[(u32, f64)]) -> PriceSeries {
        let points = points.iter().map(|(d, p)| PricePoint::new(day(*d), *p)).collect();
        PriceSeries::from_raw(ticker, points).unwrap()
    }

    #[test]
    fn test_inner_join_on_dates() {
        let a = series("A", &[(1, 10.0), (2, 11.0), (3, 12.0), (6, 13.0)]);
        let b = series("B", &[(2, 5.0), (3, 6.0), (4, 7.0), (6, 8.0)]);

        let pair = align_pair(&a, &b).unwrap();

        assert_eq!(pair.dates(), &[day(2), day(3), day(6)]);
        assert_eq!(pair.prices_a(), &[11.0, 12.0, 13.0]);
        assert_eq!(pair.prices_b(), &[5.0, 6.0, 8.0]);
    }

    #[test]
    fn test_disjoint_series_rejected() {
        let a = series("A", &[(1, 10.0)]);
        let b = series("B", &[(2, 5.0)]);

        let result = align_pair(&a, &b);
        assert!(matches!(
            result,
            Err(PairsError::InsufficientData {
                stage: Stage::Ingestion,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_import_pair_drops_invalid_rows() {
        let source = InMemorySource::new()
            .with_series(
                "A",
                vec![
                    PricePoint::new(day(1), 10.0),
                    PricePoint::new(day(2), f64::INFINITY),
                    PricePoint::new(day(3), 12.0),
                ],
            )
            .with_series(
                "B",
                vec![
                    PricePoint::new(day(1), 5.0),
                    PricePoint::new(day(2), 6.0),
                    PricePoint::new(day(3), f64::NAN),
                ],
            );

        let pair = import_pair(&source, ["A", "B"], day(1), day(10)).await.unwrap();

        assert_eq!(pair.len(), 1);
        assert_eq!(pair.dates(), &[day(1)]);
        assert_eq!(pair.ticker_a, "A");
        assert_eq!(pair.ticker_b, "B");
    }
}
