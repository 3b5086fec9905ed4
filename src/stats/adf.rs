//! Augmented Dickey-Fuller regression without deterministic terms.
//!
//! Regresses `Δx[t]` on `x[t-1]` and `p` lagged differences, with `p`
//! picked by AIC over `0..=maxlag` on a common sample, then refits on the
//! longest sample available for the chosen `p`. The statistic is the
//! t-value of the `x[t-1]` coefficient. This is the form used on
//! Engle-Granger residuals, which are already mean zero.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::ols::{self, OlsError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdfError {
    #[error("series too short for a unit-root test: {0} observations")]
    TooShort(usize),

    #[error("series is constant")]
    Constant,

    #[error("unit-root regression failed: {0}")]
    Regression(#[from] OlsError),
}

/// Result of the unit-root regression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfOutcome {
    pub statistic: f64,
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
}

/// Schwert-style default: `ceil(12 · (n/100)^¼)`, capped at `n/2 - 1`.
pub fn default_max_lag(n: usize) -> Option<usize> {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = (n / 2).checked_sub(1)?;
    Some(schwert.min(cap))
}

/// Design matrix and target for a regression with `lag` augmentation terms.
///
/// Rows start at difference index `start`, so regressions with different
/// `lag` values can share a sample when `start` is the maximum lag.
fn design(x: &[f64], diffs: &[f64], lag: usize, start: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diffs.len() - start;
    let matrix = DMatrix::from_fn(rows, lag + 1, |r, c| {
        let t = start + r;
        if c == 0 {
            x[t]
        } else {
            diffs[t - c]
        }
    });
    let target = DVector::from_fn(rows, |r, _| diffs[start + r]);
    (matrix, target)
}

/// Run the test with AIC lag selection.
pub fn adf_no_constant(x: &[f64]) -> Result<AdfOutcome, AdfError> {
    let n = x.len();
    let max_lag = default_max_lag(n).ok_or(AdfError::TooShort(n))?;

    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if lo == hi {
        return Err(AdfError::Constant);
    }

    let diffs: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    if diffs.len() <= max_lag + 1 {
        return Err(AdfError::TooShort(n));
    }

    // AIC search on the common sample starting at max_lag.
    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let (m, y) = design(x, &diffs, lag, max_lag);
        let aic = match ols::fit(&m, &y, false) {
            Ok(fit) => fit.aic(),
            Err(e) => {
                debug!(lag, error = %e, "Skipping lag in AIC search");
                continue;
            }
        };
        // Strict comparison keeps the smallest lag on ties.
        if best.map_or(true, |(b, _)| aic < b) {
            best = Some((aic, lag));
        }
    }
    let (_, used_lag) = best.ok_or(AdfError::Regression(OlsError::Singular))?;

    let (m, y) = design(x, &diffs, used_lag, used_lag);
    let fit = ols::fit(&m, &y, false)?;
    let statistic = fit.t_value(0);

    debug!(
        statistic = format!("{statistic:.4}"),
        used_lag,
        max_lag,
        nobs = fit.nobs,
        "ADF regression complete"
    );

    Ok(AdfOutcome {
        statistic,
        used_lag,
        nobs: fit.nobs,
    })
}
