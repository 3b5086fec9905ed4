//! Relationship estimator.
//!
//! Two independent computations over the aligned table:
//!
//! 1. Engle-Granger cointegration test of the first series on the second
//!    (advisory only; never gates the signal).
//! 2. OLS fit `b ≈ intercept + hedge_ratio·a`, and the spread
//!    `b - hedge_ratio·a` with its mean and sample standard deviation.
//!    The intercept is reported but not subtracted from the spread.

use tracing::{debug, info, warn};

use crate::stats::{self, adf, mackinnon, ols};
use crate::types::{
    AlignedSeries, CointegrationResult, Estimation, MonitorError, RegressionFit, Spread,
};

/// Cointegrating regressions with R² at or above this are treated as
/// perfectly collinear and the unit-root step is skipped.
fn collinearity_limit() -> f64 {
    1.0 - 100.0 * f64::EPSILON.sqrt()
}

fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.iter().all(|v| v == first),
        None => true,
    }
}

/// Engle-Granger test of `y` on `x` (constant in the cointegrating regression).
pub fn cointegration_test(y: &[f64], x: &[f64]) -> Result<CointegrationResult, MonitorError> {
    let nobs = y.len();
    let regression = ols::fit_with_intercept(y, x)
        .map_err(|e| MonitorError::Estimation(format!("cointegrating regression: {e}")))?;

    let critical_values = mackinnon::critical_values(nobs.saturating_sub(1));

    if regression.r_squared >= collinearity_limit() {
        warn!(
            r_squared = regression.r_squared,
            "Series are (almost) perfectly collinear; cointegration test is not reliable"
        );
        return Ok(CointegrationResult {
            test_statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            critical_values,
            used_lag: 0,
            nobs,
        });
    }

    let residuals: Vec<f64> = regression.residuals.iter().copied().collect();
    let outcome = adf::adf_no_constant(&residuals)
        .map_err(|e| MonitorError::Estimation(format!("cointegration unit-root test: {e}")))?;

    if !outcome.statistic.is_finite() {
        return Err(MonitorError::Estimation(format!(
            "cointegration statistic is not finite ({})",
            outcome.statistic
        )));
    }

    Ok(CointegrationResult {
        test_statistic: outcome.statistic,
        p_value: mackinnon::p_value(outcome.statistic),
        critical_values,
        used_lag: outcome.used_lag,
        nobs,
    })
}

/// Fit `b` on `a` and form the spread.
pub fn fit_spread(a: &[f64], b: &[f64]) -> Result<(RegressionFit, Spread), MonitorError> {
    let regression = ols::fit_with_intercept(b, a)
        .map_err(|e| MonitorError::Estimation(format!("hedge-ratio regression: {e}")))?;

    let fit = RegressionFit {
        hedge_ratio: regression.params[0],
        intercept: regression.params[1],
        r_squared: regression.r_squared,
    };
    if !fit.r_squared.is_finite() {
        return Err(MonitorError::Estimation("R-squared is undefined".into()));
    }

    let values: Vec<f64> = a
        .iter()
        .zip(b.iter())
        .map(|(va, vb)| vb - fit.hedge_ratio * va)
        .collect();
    let mean = stats::mean(&values);
    let std_dev = stats::sample_std(&values);
    if !mean.is_finite() || !std_dev.is_finite() {
        return Err(MonitorError::Estimation(format!(
            "spread statistics are not finite (mean={mean}, std={std_dev})"
        )));
    }

    Ok((fit, Spread { values, mean, std_dev }))
}

/// Run both computations over the aligned table.
pub fn estimate(aligned: &AlignedSeries) -> Result<Estimation, MonitorError> {
    let a = aligned.series_a();
    let b = aligned.series_b();

    if is_constant(a) || is_constant(b) {
        return Err(MonitorError::Estimation(
            "degenerate input: a price series is constant over the window".into(),
        ));
    }

    // Mirrors coint(a, b): the first series is regressed on the second.
    let cointegration = cointegration_test(a, b)?;
    info!(
        score = format!("{:.4}", cointegration.test_statistic),
        p_value = format!("{:.4}", cointegration.p_value),
        lag = cointegration.used_lag,
        cointegrated = cointegration.is_cointegrated(),
        "Cointegration test complete"
    );

    let (fit, spread) = fit_spread(a, b)?;
    info!(
        hedge_ratio = format!("{:.4}", fit.hedge_ratio),
        intercept = format!("{:.4}", fit.intercept),
        r_squared = format!("{:.4}", fit.r_squared),
        spread_mean = format!("{:.4}", spread.mean),
        spread_std = format!("{:.4}", spread.std_dev),
        "Regression complete"
    );
    debug!(points = spread.values.len(), "Spread computed");

    Ok(Estimation {
        cointegration,
        fit,
        spread,
    })
}
