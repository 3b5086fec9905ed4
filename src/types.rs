//! Shared types for the PAIRWATCH monitor.
//!
//! Every stage of the pipeline returns one of these records and hands it
//! to the next stage. Nothing here is mutated after construction, and
//! nothing survives past the cycle that produced it.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

// ---------------------------------------------------------------------------
// Raw market data
// ---------------------------------------------------------------------------

/// One instrument's close on one trading day, as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// `None` when the provider reported a null close for the day.
    pub close: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close: Some(close) }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, close: None }
    }

    /// The close, if present and finite.
    pub fn value(&self) -> Option<f64> {
        self.close.filter(|v| v.is_finite())
    }
}

/// A daily close series for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self { symbol: symbol.into(), points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Number of points carrying a usable close.
    pub fn valid_count(&self) -> usize {
        self.points.iter().filter(|p| p.value().is_some()).count()
    }
}

/// Inclusive date window a cycle requests from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Window of `days` ending at `end`.
    pub fn lookback(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: end - chrono::Duration::days(i64::from(days)),
            end,
        }
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

// ---------------------------------------------------------------------------
// Aligned observations
// ---------------------------------------------------------------------------

/// Paired daily observations for both instruments, stored column-wise.
///
/// Dates are strictly increasing and both columns hold finite values for
/// every retained row.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    dates: Vec<NaiveDate>,
    a: Vec<f64>,
    b: Vec<f64>,
}

impl AlignedSeries {
    /// Build from `(date, value_a, value_b)` rows, checking the ordering and
    /// finiteness invariants.
    pub fn from_rows(rows: Vec<(NaiveDate, f64, f64)>) -> Result<Self, MonitorError> {
        let mut dates = Vec::with_capacity(rows.len());
        let mut a = Vec::with_capacity(rows.len());
        let mut b = Vec::with_capacity(rows.len());

        for (date, va, vb) in rows {
            if let Some(prev) = dates.last() {
                if date <= *prev {
                    return Err(MonitorError::Estimation(format!(
                        "aligned dates not strictly increasing at {date}"
                    )));
                }
            }
            if !va.is_finite() || !vb.is_finite() {
                return Err(MonitorError::Estimation(format!(
                    "non-finite aligned value at {date}"
                )));
            }
            dates.push(date);
            a.push(va);
            b.push(vb);
        }

        Ok(Self { dates, a, b })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// First instrument's column.
    pub fn series_a(&self) -> &[f64] {
        &self.a
    }

    /// Second instrument's column.
    pub fn series_b(&self) -> &[f64] {
        &self.b
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

}

// ---------------------------------------------------------------------------
// Estimation results
// ---------------------------------------------------------------------------

/// Critical values of the cointegration test statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl fmt::Display for CriticalValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1%: {:.4} | 5%: {:.4} | 10%: {:.4}",
            self.one_pct, self.five_pct, self.ten_pct
        )
    }
}

/// Outcome of the Engle-Granger cointegration test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CointegrationResult {
    pub test_statistic: f64,
    pub p_value: f64,
    pub critical_values: CriticalValues,
    /// Augmentation lags chosen for the residual unit-root regression.
    pub used_lag: usize,
    pub nobs: usize,
}

impl CointegrationResult {
    /// Significance level used for the advisory cointegration verdict.
    pub const SIGNIFICANCE: f64 = 0.05;

    pub fn is_cointegrated(&self) -> bool {
        self.p_value < Self::SIGNIFICANCE
    }
}

/// OLS fit of the second instrument on the first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionFit {
    pub hedge_ratio: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Residual series `b - hedge_ratio * a` with its summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Spread {
    pub values: Vec<f64>,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: f64,
}

impl Spread {
    /// Most recent spread value.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Everything the estimator produces for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub cointegration: CointegrationResult,
    pub fit: RegressionFit,
    pub spread: Spread,
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Discrete trading recommendation derived from the z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalCategory {
    StrongShort,
    Short,
    StrongLong,
    Long,
    ApproachingShort,
    ApproachingLong,
    Neutral,
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalCategory::StrongShort => write!(f, "🔴 STRONG SHORT"),
            SignalCategory::Short => write!(f, "🟠 SHORT"),
            SignalCategory::StrongLong => write!(f, "🟢 STRONG LONG"),
            SignalCategory::Long => write!(f, "🟡 LONG"),
            SignalCategory::ApproachingShort => write!(f, "⚠️  APPROACHING SHORT"),
            SignalCategory::ApproachingLong => write!(f, "⚠️  APPROACHING LONG"),
            SignalCategory::Neutral => write!(f, "😴 NEUTRAL"),
        }
    }
}

/// Direction of one leg of the suggested position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegSide {
    Long,
    Short,
}

impl fmt::Display for LegSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegSide::Long => write!(f, "📈 Long"),
            LegSide::Short => write!(f, "📉 Short"),
        }
    }
}

/// One leg of a suggested pair position.
#[derive(Debug, Clone, PartialEq)]
pub struct LegInstruction {
    pub symbol: String,
    pub side: LegSide,
    pub units: f64,
}

impl fmt::Display for LegInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2} units {}", self.side, self.units, self.symbol)
    }
}

/// Advisory position size. Never an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecommendation {
    /// `min(|z|, 3) / 3`, in (0, 1].
    pub multiplier: f64,
    pub hedge_ratio: f64,
    /// Leg in the second instrument, sized at `multiplier`.
    pub primary: LegInstruction,
    /// Leg in the first instrument, sized at `multiplier * hedge_ratio`.
    pub hedge: LegInstruction,
}

/// Z-score classification for the current cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub zscore: f64,
    pub category: SignalCategory,
    /// 0.0 when |z| < 1.
    pub position_multiplier: f64,
    pub position: Option<PositionRecommendation>,
}

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// Result of one successful fetch → align → estimate → signal cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub started_at: DateTime<Utc>,
    pub pair_a: String,
    pub pair_b: String,
    pub window: DateWindow,
    pub observations: usize,
    pub first_observation: Option<NaiveDate>,
    pub last_observation: Option<NaiveDate>,
    pub alert_threshold: f64,
    pub estimation: Estimation,
    pub signal: Signal,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        let thin = "-".repeat(30);
        let coint = &self.estimation.cointegration;
        let fit = &self.estimation.fit;
        let spread = &self.estimation.spread;
        let z = self.signal.zscore;

        writeln!(f, "🚀 Analysis at {}", self.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "📊 Pair: {} / {}", self.pair_a, self.pair_b)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "📥 Window {} ({} aligned observations)", self.window, self.observations)?;
        if let (Some(first), Some(last)) = (self.first_observation, self.last_observation) {
            writeln!(f, "   Common closes: {first} to {last}")?;
        }

        writeln!(f, "📈 Cointegration Test Results:")?;
        writeln!(f, "   Score: {:.4}", coint.test_statistic)?;
        writeln!(f, "   P-value: {:.4}", coint.p_value)?;
        writeln!(f, "   Critical Values: {}", coint.critical_values)?;
        if coint.is_cointegrated() {
            writeln!(f, "✅ Pairs are cointegrated (p-value < 0.05)")?;
        } else {
            writeln!(f, "⚠️  Pairs may not be cointegrated (p-value >= 0.05)")?;
        }

        writeln!(f, "📊 Regression Results:")?;
        writeln!(f, "   Hedge Ratio (β): {:.4}", fit.hedge_ratio)?;
        writeln!(f, "   Intercept (α): {:.4}", fit.intercept)?;
        writeln!(f, "   R-squared: {:.4}", fit.r_squared)?;
        writeln!(f, "   Spread Mean: {:.4}", spread.mean)?;
        writeln!(f, "   Spread Std: {:.4}", spread.std_dev)?;

        writeln!(f)?;
        writeln!(f, "🎯 Current Z-Score: {z:.4}")?;
        writeln!(f, "{thin}")?;
        writeln!(f, "{} SIGNAL: Z-score = {z:.4}", self.signal.category)?;
        match self.signal.category {
            SignalCategory::StrongShort => {
                writeln!(f, "   📉 Spread is extremely overvalued")?;
                writeln!(f, "   💡 Consider shorting {} and buying {}", self.pair_b, self.pair_a)?;
            }
            SignalCategory::StrongLong => {
                writeln!(f, "   📈 Spread is extremely undervalued")?;
                writeln!(f, "   💡 Consider buying {} and shorting {}", self.pair_b, self.pair_a)?;
            }
            SignalCategory::Short => writeln!(f, "   📉 Spread is overvalued")?,
            SignalCategory::Long => writeln!(f, "   📈 Spread is undervalued")?,
            SignalCategory::ApproachingShort | SignalCategory::ApproachingLong => {
                writeln!(f, "   Threshold ±{}", self.alert_threshold)?;
                writeln!(f, "   🔔 Monitor closely for entry opportunity")?;
            }
            SignalCategory::Neutral => writeln!(f, "   📊 Spread is within normal range")?,
        }
        writeln!(f, "{thin}")?;

        if let Some(position) = &self.signal.position {
            writeln!(f)?;
            writeln!(f, "💰 Position Sizing Recommendation:")?;
            writeln!(f, "   Base Position Multiplier: {:.2}x", position.multiplier)?;
            writeln!(f, "   Hedge Ratio: {:.4}", position.hedge_ratio)?;
            writeln!(f, "   {}", position.primary)?;
            writeln!(f, "   {}", position.hedge)?;
        }

        write!(f, "{rule}")
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures that abort a single analysis cycle (or start-up, for `Config`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MonitorError {
    #[error("Data source error ({symbol}): {message}")]
    DataSource { symbol: String, message: String },

    #[error("Insufficient data: need at least {required} aligned observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Estimation error: {0}")]
    Estimation(String),

    #[error("Undefined z-score: spread standard deviation is {std_dev}")]
    UndefinedZScore { std_dev: f64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    pub fn data_source(symbol: &str, message: impl Into<String>) -> Self {
        MonitorError::DataSource {
            symbol: symbol.to_string(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
