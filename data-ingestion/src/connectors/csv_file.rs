use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, info};

use super::PriceSource;
use common::{DataSettings, PairsError, PricePoint, PriceSeries, Result};

/// Reads `<directory>/<TICKER>.csv` price files
///
/// The layout matches a Yahoo Finance history export: a `Date` column and
/// one column per price field. Empty, `null` or non-numeric price cells are
/// treated as missing and dropped.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    directory: PathBuf,
    date_column: String,
    price_column: String,
}

impl CsvPriceSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let defaults = DataSettings::default();
        Self {
            directory: directory.into(),
            date_column: defaults.date_column,
            price_column: defaults.price_column,
        }
    }

    pub fn from_settings(settings: &DataSettings) -> Self {
        Self {
            directory: PathBuf::from(&settings.directory),
            date_column: settings.date_column.clone(),
            price_column: settings.price_column.clone(),
        }
    }

    pub fn with_price_column(mut self, column: impl Into<String>) -> Self {
        self.price_column = column.into();
        self
    }

    pub fn with_date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", ticker))
    }

    fn parse(&self, ticker: &str, bytes: &[u8], start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>> {
        let mut reader = csv::Reader::from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| PairsError::DataSource(format!("{}: bad header: {}", ticker, e)))?
            .clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| {
                    PairsError::DataSource(format!("{}: column '{}' not found", ticker, name))
                })
        };
        let date_idx = column(&self.date_column)?;
        let price_idx = column(&self.price_column)?;

        let mut points = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record
                .map_err(|e| PairsError::DataSource(format!("{}: row {}: {}", ticker, row + 1, e)))?;

            let raw_date = record.get(date_idx).unwrap_or("").trim();
            let date = parse_date(raw_date).ok_or_else(|| {
                PairsError::DataSource(format!(
                    "{}: row {}: unparsable date '{}'",
                    ticker,
                    row + 1,
                    raw_date
                ))
            })?;

            if date < start || date >= end {
                continue;
            }

            let price = record
                .get(price_idx)
                .and_then(|field| field.trim().parse::<f64>().ok())
                .unwrap_or(f64::NAN);

            points.push(PricePoint::new(date, price));
        }

        Ok(points)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let path = self.path_for(ticker);
        debug!(ticker, path = %path.display(), "Reading price file");

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| PairsError::DataSource(format!("{}: {}", path.display(), e)))?;

        let raw = self.parse(ticker, &bytes, start, end)?;
        let raw_rows = raw.len();
        let series = PriceSeries::from_raw(ticker, raw)?;

        info!(
            ticker,
            rows = series.len(),
            dropped = raw_rows - series.len(),
            "Loaded prices from CSV"
        );

        Ok(series)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_file(dir: &std::path::Path, name: &str, body: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        write!(file, "{}", body).unwrap();
    }

    #[tokio::test]
    async fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "GC=F.csv",
            "Date,Open,Close,Adj Close\n\
             2024-01-02,100.0,101.0,100.5\n\
             2024-01-03,100.0,101.0,\n\
             2024-01-04,100.0,101.0,null\n\
             2024-01-05,100.0,101.0,102.25\n",
        );

        let source = CsvPriceSource::new(dir.path());
        let series = source
            .fetch("GC=F", date(2024, 1, 1), date(2024, 2, 1))
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].price, 100.5);
        assert_eq!(series.points()[1].date, date(2024, 1, 5));
    }

    #[tokio::test]
    async fn test_date_range_is_end_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "SI=F.csv",
            "Date,Adj Close\n\
             2024-01-02 00:00:00,20.0\n\
             2024-01-03 00:00:00,21.0\n\
             2024-01-04 00:00:00,22.0\n",
        );

        let source = CsvPriceSource::new(dir.path());
        let series = source
            .fetch("SI=F", date(2024, 1, 3), date(2024, 1, 4))
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].price, 21.0);
    }

    #[tokio::test]
    async fn test_custom_price_column() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "X.csv", "day,close\n2024-01-02,5.0\n");

        let source = CsvPriceSource::new(dir.path())
            .with_date_column("day")
            .with_price_column("close");
        let series = source
            .fetch("X", date(2024, 1, 1), date(2025, 1, 1))
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_and_column() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvPriceSource::new(dir.path());

        let missing = source.fetch("NOPE", date(2024, 1, 1), date(2025, 1, 1)).await;
        assert!(matches!(missing, Err(PairsError::DataSource(_))));

        write_file(dir.path(), "Y.csv", "Date,Close\n2024-01-02,5.0\n");
        let no_column = source.fetch("Y", date(2024, 1, 1), date(2025, 1, 1)).await;
        assert!(matches!(no_column, Err(PairsError::DataSource(_))));
    }
}
