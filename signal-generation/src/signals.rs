// Threshold Signals
// Turns a z-score path into long/short/exit flags

use common::{PairPrices, Result, SignalSet, SignalThresholds, ZScoreMode};
use tracing::debug;

use crate::spread::{SpreadAnalysis, SpreadEngine};

/// Stateless z-score threshold rules
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalGenerator {
    thresholds: SignalThresholds,
    zscore_mode: ZScoreMode,
}

impl SignalGenerator {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self {
            thresholds,
            zscore_mode: ZScoreMode::default(),
        }
    }

    pub fn with_zscore_mode(mut self, mode: ZScoreMode) -> Self {
        self.zscore_mode = mode;
        self
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    pub fn generate(&self, zscore: &[f64]) -> SignalSet {
        generate_signals(zscore, &self.thresholds)
    }

    /// Spread, z-score and signals in one pass
    pub fn generate_for_pair(&self, prices: &PairPrices) -> Result<(SignalSet, SpreadAnalysis)> {
        let analysis = SpreadEngine::new(self.zscore_mode).analyze(prices)?;
        let signals = self.generate(&analysis.zscore);
        Ok((signals, analysis))
    }
}

/// Flags are independent per row; several can be set at once.
/// A NaN z-score sets none of them.
pub fn generate_signals(zscore: &[f64], thresholds: &SignalThresholds) -> SignalSet {
    let longs = zscore.iter().map(|z| *z < thresholds.long_entry).collect();
    let shorts = zscore.iter().map(|z| *z > thresholds.short_entry).collect();
    let exits = zscore.iter().map(|z| z.abs() < thresholds.exit).collect();

    let signals = SignalSet { longs, shorts, exits };
    let counts = signals.counts();
    debug!(
        rows = zscore.len(),
        longs = counts.longs,
        shorts = counts.shorts,
        exits = counts.exits,
        "Generated signals"
    );

    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let z = [-1.5, -0.2, 0.7, 1.2, -1.0, 1.0];
        let signals = SignalGenerator::default().generate(&z);

        assert_eq!(signals.longs, vec![true, false, false, false, false, false]);
        assert_eq!(signals.shorts, vec![false, false, false, true, false, false]);
        assert_eq!(signals.exits, vec![false, true, false, false, false, false]);
    }

    #[test]
    fn test_flags_can_overlap() {
        let thresholds = SignalThresholds {
            long_entry: 0.5,
            short_entry: -0.5,
            exit: 1.0,
        };
        let signals = generate_signals(&[0.0], &thresholds);

        assert!(signals.longs[0]);
        assert!(signals.shorts[0]);
        assert!(signals.exits[0]);
    }

    #[test]
    fn test_mirrored_thresholds_swap_sides() {
        let z: Vec<f64> = (0..50).map(|i| (i as f64 * 0.4).sin() * 2.5).collect();
        let negated: Vec<f64> = z.iter().map(|v| -v).collect();
        let thresholds = SignalThresholds {
            long_entry: -1.25,
            short_entry: 0.8,
            exit: 0.3,
        };

        let base = generate_signals(&z, &thresholds);
        let mirrored = generate_signals(&negated, &thresholds.mirrored());

        assert_eq!(base.longs, mirrored.shorts);
        assert_eq!(base.shorts, mirrored.longs);
        assert_eq!(base.exits, mirrored.exits);
    }

    #[test]
    fn test_nan_sets_no_flags() {
        let signals = generate_signals(&[f64::NAN], &SignalThresholds::default());
        assert_eq!(signals.counts().longs + signals.counts().shorts + signals.counts().exits, 0);
    }

    #[test]
    fn test_generate_for_pair() {
        let start = common::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let pair = PairPrices::with_daily_index(
            start,
            "A",
            vec![100.0, 102.0, 101.0, 99.0, 95.0],
            "B",
            vec![50.0, 50.0, 51.0, 50.0, 48.0],
        )
        .unwrap();

        let (signals, analysis) = SignalGenerator::default().generate_for_pair(&pair).unwrap();

        assert!(signals.is_aligned());
        assert_eq!(signals.len(), 5);
        // Spread 47 at the last row is the only one below mean - std
        assert_eq!(signals.longs, vec![false, false, false, false, true]);
        assert!(signals.shorts[1]);
        assert_eq!(analysis.zscore.len(), 5);
    }
}
