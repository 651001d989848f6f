// Engle-Granger Cointegration Test
// Two-step test: OLS hedge regression, then ADF on the residuals

use common::{CointegrationConfig, PairPrices, PairsError, Result, Stage};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::mackinnon::{CriticalValues, Surface};
use crate::stationarity::{adf_statistic, AdfRegression, Ols};

/// Engle-Granger test outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CointegrationResult {
    /// ADF t-statistic on the hedge residuals, `-inf` for an exact fit
    pub statistic: f64,
    pub p_value: f64,
    /// Slope of `y` on `x`
    pub hedge_ratio: f64,
    pub intercept: f64,
    pub used_lag: usize,
    pub nobs: usize,
    pub critical_values: CriticalValues,
}

impl CointegrationResult {
    pub fn is_cointegrated(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Runs the test on the two legs of a pair, A regressed on B
pub fn engle_granger_pair(prices: &PairPrices, config: &CointegrationConfig) -> Result<CointegrationResult> {
    engle_granger(prices.prices_a(), prices.prices_b(), config)
}

/// Tests whether `y - beta * x` is stationary.
///
/// The null hypothesis is no cointegration, so a small p-value is evidence
/// that the pair mean-reverts.
pub fn engle_granger(y: &[f64], x: &[f64], config: &CointegrationConfig) -> Result<CointegrationResult> {
    if y.len() != x.len() {
        return Err(PairsError::alignment(
            Stage::Cointegration,
            format!("series lengths differ: {} vs {}", y.len(), x.len()),
        ));
    }
    let n = y.len();
    if n < 3 {
        return Err(PairsError::InsufficientData {
            stage: Stage::Cointegration,
            required: 3,
            actual: n,
        });
    }

    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { x[r] });
    let target = DVector::from_column_slice(y);
    let fit = Ols::fit(&design, &target).ok_or_else(|| {
        PairsError::degenerate(Stage::Cointegration, "hedge regression is singular, x is constant")
    })?;

    let intercept = fit.param(0);
    let hedge_ratio = fit.param(1);
    let residuals: Vec<f64> = y
        .iter()
        .zip(x)
        .map(|(yi, xi)| yi - intercept - hedge_ratio * xi)
        .collect();

    let mean_y = y.iter().mean();
    let tss: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
    if tss == 0.0 {
        return Err(PairsError::degenerate(Stage::Cointegration, "y is constant"));
    }
    let r_squared = 1.0 - fit.ssr() / tss;

    let surface = Surface::EngleGranger;
    let critical_values = surface.critical_values(n - 1);

    // Exact fit, residuals are numerically zero
    if r_squared >= 1.0 - 100.0 * f64::EPSILON.sqrt() {
        debug!(r_squared, hedge_ratio, "Pair is an exact linear combination");
        return Ok(CointegrationResult {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            hedge_ratio,
            intercept,
            used_lag: 0,
            nobs: n,
            critical_values,
        });
    }

    let adf = adf_statistic(&residuals, AdfRegression::NoConstant, config.max_lag, Stage::Cointegration)?;
    let p_value = surface.p_value(adf.statistic);

    debug!(
        statistic = adf.statistic,
        p_value,
        hedge_ratio,
        used_lag = adf.used_lag,
        "Engle-Granger test"
    );

    Ok(CointegrationResult {
        statistic: adf.statistic,
        p_value,
        hedge_ratio,
        intercept,
        used_lag: adf.used_lag,
        nobs: adf.nobs,
        critical_values,
    })
}
