//! Peak-to-trough tracking on an equity curve

/// Drawdown calculation helper
///
/// Equity starts at 1.0 (initial capital), so the first peak is never below it.
#[derive(Debug, Clone)]
pub struct DrawdownCalculator {
    peak: f64,
    max_drawdown: f64,
}

impl DrawdownCalculator {
    pub fn new() -> Self {
        Self {
            peak: 1.0,
            max_drawdown: 0.0,
        }
    }

    /// Update with new equity value
    pub fn update(&mut self, value: f64) {
        if value > self.peak {
            self.peak = value;
        }

        let drawdown = (self.peak - value) / self.peak;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
    }

    /// Largest fractional drop from a running peak so far
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

impl Default for DrawdownCalculator {
    fn default() -> Self {
        Self::new()
    }
}
