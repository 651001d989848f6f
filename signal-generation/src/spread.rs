// Spread & Z-Score
// Price difference between the two legs, normalized into standard deviations

use common::{PairPrices, PairsError, Result, Stage, ZScoreMode};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

/// Spread and its normalized deviation, indexed like the input prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadAnalysis {
    pub spread: Vec<f64>,
    pub zscore: Vec<f64>,
    /// Full-sample mean of the spread
    pub mean: f64,
    /// Full-sample (n - 1) standard deviation of the spread
    pub std_dev: f64,
    pub mode: ZScoreMode,
}

impl SpreadAnalysis {
    pub fn len(&self) -> usize {
        self.spread.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spread.is_empty()
    }
}

/// Computes spread and z-score for a price pair
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadEngine {
    mode: ZScoreMode,
}

impl SpreadEngine {
    pub fn new(mode: ZScoreMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ZScoreMode {
        self.mode
    }

    pub fn analyze(&self, prices: &PairPrices) -> Result<SpreadAnalysis> {
        spread_and_zscore(prices.prices_a(), prices.prices_b(), self.mode)
    }
}

/// `spread = a - b`, `z = (spread - mean) / std`
///
/// In `FullSample` mode the mean and deviation come from the whole history,
/// so early z-scores depend on later prices.
pub fn spread_and_zscore(a: &[f64], b: &[f64], mode: ZScoreMode) -> Result<SpreadAnalysis> {
    if a.len() != b.len() {
        return Err(PairsError::alignment(
            Stage::Spread,
            format!("leg lengths differ: {} vs {}", a.len(), b.len()),
        ));
    }
    if a.len() < 2 {
        return Err(PairsError::InsufficientData {
            stage: Stage::Spread,
            required: 2,
            actual: a.len(),
        });
    }
    mode.validate()?;

    let spread: Vec<f64> = a.iter().zip(b).map(|(pa, pb)| pa - pb).collect();

    let mean = spread.iter().mean();
    let std_dev = spread.iter().std_dev();

    if !std_dev.is_finite() || std_dev == 0.0 {
        return Err(PairsError::degenerate(
            Stage::Spread,
            format!("spread standard deviation is {}", std_dev),
        ));
    }

    let zscore = match mode {
        ZScoreMode::FullSample => spread.iter().map(|s| (s - mean) / std_dev).collect(),
        ZScoreMode::Rolling { window } => rolling_zscore(&spread, window),
    };

    debug!(
        rows = spread.len(),
        mean,
        std_dev,
        mode = ?mode,
        "Computed spread z-score"
    );

    Ok(SpreadAnalysis {
        spread,
        zscore,
        mean,
        std_dev,
        mode,
    })
}

/// Trailing-window z-score; 0.0 until the window fills or when it is flat
fn rolling_zscore(spread: &[f64], window: usize) -> Vec<f64> {
    let mut result = vec![0.0; spread.len()];

    for end in window.saturating_sub(1)..spread.len() {
        let slice = &spread[end + 1 - window..=end];
        let mean = slice.iter().mean();
        let std_dev = slice.iter().std_dev();

        if std_dev.is_finite() && std_dev > 0.0 {
            result[end] = (spread[end] - mean) / std_dev;
        }
    }

    result
}
