//! Ordinary least squares.
//!
//! Solves `y = X·β + ε` through the singular value decomposition of `X`
//! and reports the pieces the estimator and the unit-root test need:
//! coefficients, their standard errors, sum of squared residuals, R² and
//! the Gaussian AIC.

use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Smallest accepted ratio of smallest to largest singular value of `X`.
const MIN_RECIPROCAL_CONDITION: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OlsError {
    #[error("underdetermined regression: {nobs} observations for {params} parameters")]
    Underdetermined { nobs: usize, params: usize },

    #[error("design matrix is singular or ill-conditioned")]
    Singular,

    #[error("dimension mismatch: {rows} design rows vs {targets} targets")]
    DimensionMismatch { rows: usize, targets: usize },

    #[error("non-finite regression output")]
    NonFinite,
}

/// A fitted regression.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    pub residuals: DVector<f64>,
    pub ssr: f64,
    /// Centered R² when the design has a constant column, uncentered otherwise.
    pub r_squared: f64,
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.params[i] / self.std_errors[i]
    }

    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every column of `X`.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.params.len() as f64
    }
}

/// Fit `y` on the columns of `x`. Set `has_constant` when one column of
/// `x` is all ones; it only changes how R² is computed.
pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>, has_constant: bool) -> Result<OlsFit, OlsError> {
    let (nobs, k) = x.shape();
    if nobs != y.len() {
        return Err(OlsError::DimensionMismatch { rows: nobs, targets: y.len() });
    }
    if k == 0 || nobs <= k {
        return Err(OlsError::Underdetermined { nobs, params: k });
    }

    let svd = x.clone().svd(true, true);
    let singular = &svd.singular_values;
    let s_max = singular.max();
    let s_min = singular.min();
    if s_max.is_nan() || s_max <= 0.0 || s_min / s_max < MIN_RECIPROCAL_CONDITION {
        return Err(OlsError::Singular);
    }

    let params = svd
        .solve(y, s_max * MIN_RECIPROCAL_CONDITION)
        .map_err(|_| OlsError::Singular)?;
    let v_t = svd.v_t.as_ref().ok_or(OlsError::Singular)?;

    let residuals = y - x * &params;
    let ssr = residuals.norm_squared();
    let sigma2 = ssr / (nobs - k) as f64;
    // Cov(β) = σ²·V·Σ⁻²·Vᵀ
    let std_errors: Vec<f64> = (0..k)
        .map(|i| {
            let var: f64 = (0..k).map(|j| (v_t[(j, i)] / singular[j]).powi(2)).sum();
            (sigma2 * var).sqrt()
        })
        .collect();

    let tss = if has_constant {
        let y_mean = y.mean();
        y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>()
    } else {
        y.norm_squared()
    };
    let r_squared = 1.0 - ssr / tss;

    if params.iter().any(|p| !p.is_finite()) || !ssr.is_finite() {
        return Err(OlsError::NonFinite);
    }

    Ok(OlsFit {
        params,
        std_errors,
        residuals,
        ssr,
        r_squared,
        nobs,
    })
}

/// Simple regression `y = intercept + slope·x`.
///
/// Returns the fit with parameters ordered `[slope, intercept]`.
pub fn fit_with_intercept(y: &[f64], x: &[f64]) -> Result<OlsFit, OlsError> {
    if y.len() != x.len() {
        return Err(OlsError::DimensionMismatch { rows: x.len(), targets: y.len() });
    }
    let design = DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { 1.0 });
    let target = DVector::from_column_slice(y);
    fit(&design, &target, true)
}
