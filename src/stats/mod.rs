//! Statistical building blocks for the relationship estimator.
//!
//! - `ols`: ordinary least squares with standard errors and AIC
//! - `adf`: augmented Dickey-Fuller unit-root regression with AIC lag choice
//! - `mackinnon`: approximate p-values and critical values for the
//!   Engle-Granger statistic

pub mod adf;
pub mod mackinnon;
pub mod ols;

/// Arithmetic mean. `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator). `NaN` below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}
