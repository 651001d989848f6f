//! Backtest configuration
//!
//! Values come from an optional TOML file layered under `PAIRS__`-prefixed
//! environment variables, e.g. `PAIRS__SIGNALS__LONG_ENTRY=-1.5`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PairsError;

/// Top-level configuration for a pairs backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairsConfig {
    /// Instruments forming the pair, leg A first
    #[serde(default = "default_tickers")]
    pub tickers: [String; 2],

    /// First date to load (inclusive)
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last date to load (exclusive)
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    /// Z-score thresholds for signal generation
    #[serde(default)]
    pub signals: SignalThresholds,

    /// How the spread is normalized into a z-score
    #[serde(default)]
    pub zscore: ZScoreMode,

    /// Position sizing and annualization
    #[serde(default)]
    pub backtest: BacktestSettings,

    /// Cointegration test settings
    #[serde(default)]
    pub cointegration: CointegrationConfig,

    /// Where price files live
    #[serde(default)]
    pub data: DataSettings,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            start_date: default_start_date(),
            end_date: default_end_date(),
            signals: SignalThresholds::default(),
            zscore: ZScoreMode::default(),
            backtest: BacktestSettings::default(),
            cointegration: CointegrationConfig::default(),
            data: DataSettings::default(),
        }
    }
}

impl PairsConfig {
    /// Reject values the core would turn into NaN or nonsense
    pub fn validate(&self) -> Result<(), PairsError> {
        self.signals.validate()?;
        self.zscore.validate()?;

        if !(self.backtest.notional.is_finite() && self.backtest.notional > 0.0) {
            return Err(PairsError::Config(format!(
                "notional must be positive, got {}",
                self.backtest.notional
            )));
        }
        if self.backtest.trading_days_per_year == 0 {
            return Err(PairsError::Config(
                "trading_days_per_year must be positive".to_string(),
            ));
        }
        if self.start_date >= self.end_date {
            return Err(PairsError::Config(format!(
                "start_date {} must precede end_date {}",
                self.start_date, self.end_date
            )));
        }
        if self.tickers[0] == self.tickers[1] {
            return Err(PairsError::Config(format!(
                "pair needs two distinct tickers, got {} twice",
                self.tickers[0]
            )));
        }
        let significance = self.cointegration.significance;
        if !(significance > 0.0 && significance < 1.0) {
            return Err(PairsError::Config(format!(
                "cointegration significance must be in (0, 1), got {}",
                significance
            )));
        }

        Ok(())
    }
}

fn default_tickers() -> [String; 2] {
    ["GC=F".to_string(), "SI=F".to_string()]
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MAX)
}

/// Z-score thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// Go long the spread when z falls below this
    #[serde(default = "default_long_entry")]
    pub long_entry: f64,

    /// Go short the spread when z rises above this
    #[serde(default = "default_short_entry")]
    pub short_entry: f64,

    /// Flatten when |z| is below this
    #[serde(default = "default_exit")]
    pub exit: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            long_entry: -1.0,
            short_entry: 1.0,
            exit: 0.5,
        }
    }
}

impl SignalThresholds {
    pub fn validate(&self) -> Result<(), PairsError> {
        for (name, value) in [
            ("long_entry", self.long_entry),
            ("short_entry", self.short_entry),
            ("exit", self.exit),
        ] {
            if !value.is_finite() {
                return Err(PairsError::Config(format!(
                    "threshold {} must be finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Swap and negate the entry thresholds
    pub fn mirrored(&self) -> Self {
        Self {
            long_entry: -self.short_entry,
            short_entry: -self.long_entry,
            exit: self.exit,
        }
    }
}

fn default_long_entry() -> f64 {
    -1.0
}

fn default_short_entry() -> f64 {
    1.0
}

fn default_exit() -> f64 {
    0.5
}

/// Spread normalization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ZScoreMode {
    /// One mean and standard deviation over the entire spread history
    #[default]
    FullSample,

    /// Trailing window mean and standard deviation
    Rolling { window: usize },
}

impl ZScoreMode {
    pub fn validate(&self) -> Result<(), PairsError> {
        match self {
            ZScoreMode::FullSample => Ok(()),
            ZScoreMode::Rolling { window } if *window >= 2 => Ok(()),
            ZScoreMode::Rolling { window } => Err(PairsError::Config(format!(
                "rolling z-score window must be at least 2, got {}",
                window
            ))),
        }
    }
}

/// Position sizing and annualization settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// Currency exposure per leg
    pub notional: f64,

    /// Trading-days-per-year convention for annualization
    pub trading_days_per_year: u32,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            notional: 1000.0,
            trading_days_per_year: 252,
        }
    }
}

/// Engle-Granger test settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CointegrationConfig {
    /// Largest ADF lag considered; `None` uses `ceil(12 * (n/100)^(1/4))`
    pub max_lag: Option<usize>,

    /// p-value below which the pair is reported as cointegrated
    pub significance: f64,
}

impl Default for CointegrationConfig {
    fn default() -> Self {
        Self {
            max_lag: None,
            significance: 0.05,
        }
    }
}

/// Price file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory holding one `<TICKER>.csv` per instrument
    pub directory: String,

    /// Header of the date column
    pub date_column: String,

    /// Header of the price column
    pub price_column: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            date_column: "Date".to_string(),
            price_column: "Adj Close".to_string(),
        }
    }
}

/// Load configuration from an optional TOML file plus `PAIRS__` environment overrides
pub fn load_config(path: &str) -> anyhow::Result<PairsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
        .add_source(
            config::Environment::with_prefix("PAIRS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: PairsConfig = settings.try_deserialize()?;
    config.validate()?;

    tracing::debug!(
        path,
        tickers = ?config.tickers,
        notional = config.backtest.notional,
        "Loaded pairs configuration"
    );

    Ok(config)
}

/// Save configuration to TOML file
pub fn save_config(config: &PairsConfig, path: &str) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Commented configuration template
pub fn config_template() -> &'static str {
    "# Pairs Trading Backtest Configuration
# Every value can be overridden with PAIRS__<SECTION>__<KEY>, e.g.
# PAIRS__SIGNALS__LONG_ENTRY=-1.5

# Instruments forming the pair (leg A, leg B)
tickers = [\"GC=F\", \"SI=F\"]

# Date range to load, end exclusive
start_date = \"2020-01-01\"
end_date = \"2024-01-01\"

[signals]
# Long the spread below this z-score
long_entry = -1.0

# Short the spread above this z-score
short_entry = 1.0

# Flatten when |z| is below this
exit = 0.5

[zscore]
# full_sample, or rolling with a window
mode = \"full_sample\"

[backtest]
# Currency exposure per leg
notional = 1000.0

# Trading days per year for annualization
trading_days_per_year = 252

[cointegration]
# p-value threshold for reporting the pair as cointegrated
significance = 0.05

[data]
directory = \"data\"
date_column = \"Date\"
price_column = \"Adj Close\"
"
}

/// Write the commented template to disk
pub fn create_config_template(path: &str) -> anyhow::Result<()> {
    std::fs::write(path, config_template())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PairsConfig::default();
        assert_eq!(config.signals.long_entry, -1.0);
        assert_eq!(config.signals.short_entry, 1.0);
        assert_eq!(config.signals.exit, 0.5);
        assert_eq!(config.backtest.notional, 1000.0);
        assert_eq!(config.backtest.trading_days_per_year, 252);
        assert_eq!(config.zscore, ZScoreMode::FullSample);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = PairsConfig::default();
        config.zscore = ZScoreMode::Rolling { window: 20 };
        config.cointegration.max_lag = Some(4);

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: PairsConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let parsed: PairsConfig = toml::from_str(config_template()).unwrap();
        assert_eq!(parsed, PairsConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: PairsConfig = toml::from_str("[signals]\nlong_entry = -2.0\n").unwrap();
        assert_eq!(parsed.signals.long_entry, -2.0);
        assert_eq!(parsed.signals.short_entry, 1.0);
        assert_eq!(parsed.backtest.notional, 1000.0);
    }

    #[test]
    fn test_load_config_file_and_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.toml");
        std::fs::write(&path, "[backtest]\nnotional = 500.0\n").unwrap();

        std::env::set_var("PAIRS__SIGNALS__SHORT_ENTRY", "1.75");
        let config = load_config(path.to_str().unwrap()).unwrap();
        std::env::remove_var("PAIRS__SIGNALS__SHORT_ENTRY");

        assert_eq!(config.backtest.notional, 500.0);
        assert_eq!(config.signals.short_entry, 1.75);
        assert_eq!(config.signals.long_entry, -1.0);
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let path = path.to_str().unwrap();

        let mut config = PairsConfig::default();
        config.tickers = ["KO".to_string(), "PEP".to_string()];
        config.signals.long_entry = -1.5;
        config.backtest.notional = 2500.0;
        config.backtest.trading_days_per_year = 260;
        config.cointegration.significance = 0.1;
        config.data.price_column = "Close".to_string();

        save_config(&config, path).unwrap();
        let loaded = load_config(path).unwrap();

        assert_eq!(loaded.tickers, config.tickers);
        assert_eq!(loaded.start_date, config.start_date);
        assert_eq!(loaded.signals.long_entry, -1.5);
        assert_eq!(loaded.backtest, config.backtest);
        assert_eq!(loaded.cointegration, config.cointegration);
        assert_eq!(loaded.data, config.data);
    }

    #[test]
    fn test_created_template_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.toml");
        let path = path.to_str().unwrap();

        create_config_template(path).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Pairs Trading Backtest Configuration"));

        let loaded = load_config(path).unwrap();
        let defaults = PairsConfig::default();
        assert_eq!(loaded.tickers, defaults.tickers);
        assert_eq!(loaded.end_date, defaults.end_date);
        assert_eq!(loaded.backtest, defaults.backtest);
        assert_eq!(loaded.zscore, defaults.zscore);
        assert_eq!(loaded.data, defaults.data);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PairsConfig::default();
        config.backtest.notional = 0.0;
        assert!(config.validate().is_err());

        let mut config = PairsConfig::default();
        config.zscore = ZScoreMode::Rolling { window: 1 };
        assert!(config.validate().is_err());

        let mut config = PairsConfig::default();
        config.signals.exit = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PairsConfig::default();
        config.tickers = ["A".to_string(), "A".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mirrored_thresholds() {
        let thresholds = SignalThresholds {
            long_entry: -1.5,
            short_entry: 0.8,
            exit: 0.25,
        };
        let mirrored = thresholds.mirrored();
        assert_eq!(mirrored.long_entry, -0.8);
        assert_eq!(mirrored.short_entry, 1.5);
        assert_eq!(mirrored.exit, 0.25);
    }
}
