//! MacKinnon response surfaces for the two-variable Engle-Granger test
//! with a constant in the cointegrating regression.
//!
//! P-values: MacKinnon (1994), "Approximate asymptotic distribution
//! functions for unit-root and cointegration tests". Critical values:
//! MacKinnon (2010), "Critical values for cointegration tests".

use statrs::function::erf::erfc;

use crate::types::CriticalValues;

// ---------------------------------------------------------------------------
// Response-surface coefficients (N = 2, constant)
// ---------------------------------------------------------------------------

/// Above this statistic the p-value is 1.
const TAU_MAX: f64 = 0.92;
/// Below this statistic the p-value is 0.
const TAU_MIN: f64 = -18.86;
/// Switch point between the small-p and large-p polynomials.
const TAU_STAR: f64 = -2.62;

/// Polynomial in the statistic for `stat <= TAU_STAR`, lowest order first.
const SMALL_P: [f64; 3] = [2.92, 1.5012, 3.9796e-2];
/// Polynomial in the statistic for `stat > TAU_STAR`, lowest order first.
const LARGE_P: [f64; 4] = [2.1945, 6.4695e-1, -2.9198e-1, -4.2377e-2];

/// `[β∞, β1, β2]` for 1%, 5% and 10%; critical value is β∞ + β1/T + β2/T².
const CRIT_1: [f64; 3] = [-3.89644, -10.9519, -22.527];
const CRIT_5: [f64; 3] = [-3.33613, -6.1101, -6.823];
const CRIT_10: [f64; 3] = [-3.04445, -4.2412, -2.720];

fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Standard normal CDF.
fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Approximate asymptotic p-value of an Engle-Granger statistic.
pub fn p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefs: &[f64] = if statistic <= TAU_STAR { &SMALL_P } else { &LARGE_P };
    norm_cdf(polyval(coefs, statistic))
}

/// Finite-sample critical values for `nobs` observations.
pub fn critical_values(nobs: usize) -> CriticalValues {
    let t = nobs as f64;
    let surface = |b: &[f64; 3]| b[0] + b[1] / t + b[2] / (t * t);
    CriticalValues {
        one_pct: surface(&CRIT_1),
        five_pct: surface(&CRIT_5),
        ten_pct: surface(&CRIT_10),
    }
}
