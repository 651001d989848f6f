//! Augmented Dickey-Fuller unit-root test

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mackinnon::{CriticalValues, Surface};
use common::{PairsError, Result, Stage};

/// Deterministic terms in the ADF regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdfRegression {
    NoConstant,
    Constant,
}

impl AdfRegression {
    fn trend_terms(&self) -> usize {
        match self {
            AdfRegression::NoConstant => 0,
            AdfRegression::Constant => 1,
        }
    }

    fn surface(&self) -> Surface {
        match self {
            AdfRegression::NoConstant => Surface::AdfNoConstant,
            AdfRegression::Constant => Surface::AdfConstant,
        }
    }
}

/// ADF test outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic on the lagged level
    pub statistic: f64,
    /// MacKinnon p-value for a single series
    pub p_value: f64,
    /// Number of lagged differences picked by AIC
    pub used_lag: usize,
    /// Observations in the final regression
    pub nobs: usize,
    pub critical_values: CriticalValues,
}

/// ADF test with AIC lag selection
///
/// Regresses `dy[t]` on `y[t-1]`, `dy[t-1..=t-p]` and the deterministic terms.
/// Lags `0..=max_lag` are compared on a common sample; the winner is refit
/// on all rows available to it.
pub fn adf_test(series: &[f64], regression: AdfRegression, max_lag: Option<usize>) -> Result<AdfResult> {
    let fit = adf_statistic(series, regression, max_lag, Stage::Cointegration)?;
    let surface = regression.surface();

    Ok(AdfResult {
        statistic: fit.statistic,
        p_value: surface.p_value(fit.statistic),
        used_lag: fit.used_lag,
        nobs: fit.nobs,
        critical_values: surface.critical_values(fit.nobs),
    })
}

pub(crate) struct AdfStatistic {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Default lag cap `ceil(12 * (n / 100)^(1/4))`
pub fn default_max_lag(nobs: usize) -> usize {
    (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize
}

pub(crate) fn adf_statistic(
    series: &[f64],
    regression: AdfRegression,
    max_lag: Option<usize>,
    stage: Stage,
) -> Result<AdfStatistic> {
    let n = series.len();
    let trend = regression.trend_terms();

    let lag_cap = (n / 2).checked_sub(trend + 1).ok_or(PairsError::InsufficientData {
        stage,
        required: 2 * (trend + 1),
        actual: n,
    })?;
    let max_lag = max_lag.unwrap_or_else(|| default_max_lag(n)).min(lag_cap);

    // Need more rows than regressors in the widest regression
    let widest = 1 + max_lag + trend;
    let rows = n - 1 - max_lag;
    if rows <= widest {
        return Err(PairsError::InsufficientData {
            stage,
            required: widest + max_lag + 2,
            actual: n,
        });
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let (x, y) = design(series, &diff, lag, max_lag, trend);
        let fit = Ols::fit(&x, &y).ok_or_else(|| singular(stage))?;
        let aic = fit.aic();

        // Ties keep the shorter lag
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let used_lag = best.map(|(_, lag)| lag).unwrap_or(0);

    let (x, y) = design(series, &diff, used_lag, used_lag, trend);
    let fit = Ols::fit(&x, &y).ok_or_else(|| singular(stage))?;
    let statistic = fit.t_value(0);

    debug!(max_lag, used_lag, nobs = y.len(), statistic, "ADF regression");

    Ok(AdfStatistic {
        statistic,
        used_lag,
        nobs: y.len(),
    })
}

fn singular(stage: Stage) -> PairsError {
    PairsError::degenerate(stage, "ADF regression matrix is singular")
}

/// Rows start at `diff[first]` so every regression in a lag search shares a sample
fn design(
    series: &[f64],
    diff: &[f64],
    lag: usize,
    first: usize,
    trend: usize,
) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diff.len() - first;
    let cols = 1 + lag + trend;

    let x = DMatrix::from_fn(rows, cols, |r, c| {
        let t = first + r;
        if c == 0 {
            series[t]
        } else if c <= lag {
            diff[t - c]
        } else {
            1.0
        }
    });
    let y = DVector::from_iterator(rows, diff[first..].iter().copied());

    (x, y)
}

/// Ordinary least squares fit
pub(crate) struct Ols {
    params: DVector<f64>,
    cov_unscaled: DMatrix<f64>,
    ssr: f64,
    nobs: usize,
}

impl Ols {
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<Self> {
        let xt = x.transpose();
        let cov_unscaled = (&xt * x).try_inverse()?;
        let params = &cov_unscaled * (&xt * y);
        let residuals = y - x * &params;

        Some(Self {
            ssr: residuals.dot(&residuals),
            params,
            cov_unscaled,
            nobs: y.len(),
        })
    }

    pub fn k(&self) -> usize {
        self.params.len()
    }

    pub fn param(&self, index: usize) -> f64 {
        self.params[index]
    }

    pub fn ssr(&self) -> f64 {
        self.ssr
    }

    pub fn t_value(&self, index: usize) -> f64 {
        let dof = self.nobs.saturating_sub(self.k()).max(1) as f64;
        let sigma2 = self.ssr / dof;
        self.params[index] / (sigma2 * self.cov_unscaled[(index, index)]).sqrt()
    }

    /// Akaike information criterion under Gaussian errors
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.k() as f64
    }
}
