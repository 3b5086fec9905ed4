//! Signal generator.
//!
//! Scores the latest spread against its fitted mean and standard deviation,
//! maps the z-score to a category, and sizes an advisory pair position.

use tracing::debug;

use crate::types::{
    LegInstruction, LegSide, MonitorError, PositionRecommendation, Signal, SignalCategory,
};

/// |z| at or above which a strong signal fires.
pub const STRONG_ENTRY_Z: f64 = 2.0;
/// |z| at or above which a regular signal fires and a position is sized.
pub const ENTRY_Z: f64 = 1.0;
/// |z| at which the position multiplier saturates.
pub const MAX_SIZING_Z: f64 = 3.0;
/// Default |z| for "approaching" alerts.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;

/// Standard deviations below this fraction of the spread's scale are
/// treated as zero.
const RELATIVE_STD_FLOOR: f64 = 1e-12;

/// `(latest - mean) / std_dev`, refusing a zero or non-finite deviation.
pub fn zscore(latest: f64, mean: f64, std_dev: f64) -> Result<f64, MonitorError> {
    let scale = mean.abs().max(latest.abs()).max(1.0);
    if !std_dev.is_finite() || std_dev <= RELATIVE_STD_FLOOR * scale {
        return Err(MonitorError::UndefinedZScore { std_dev });
    }
    Ok((latest - mean) / std_dev)
}

/// Map a z-score to its category; the first matching rule wins.
pub fn classify(z: f64, alert_threshold: f64) -> SignalCategory {
    if z >= STRONG_ENTRY_Z {
        SignalCategory::StrongShort
    } else if z <= -STRONG_ENTRY_Z {
        SignalCategory::StrongLong
    } else if z >= ENTRY_Z {
        SignalCategory::Short
    } else if z <= -ENTRY_Z {
        SignalCategory::Long
    } else if z.abs() >= alert_threshold {
        if z > 0.0 {
            SignalCategory::ApproachingShort
        } else {
            SignalCategory::ApproachingLong
        }
    } else {
        SignalCategory::Neutral
    }
}

/// `min(|z|, 3) / 3` once |z| reaches the entry level, otherwise 0.
pub fn position_multiplier(z: f64) -> f64 {
    if z.abs() < ENTRY_Z {
        return 0.0;
    }
    z.abs().min(MAX_SIZING_Z) / MAX_SIZING_Z
}

/// Size both legs. Positive z shorts the second instrument and buys the
/// first; negative z is the mirror image.
pub fn size_position(
    z: f64,
    hedge_ratio: f64,
    first_symbol: &str,
    second_symbol: &str,
) -> Option<PositionRecommendation> {
    let multiplier = position_multiplier(z);
    if multiplier == 0.0 {
        return None;
    }

    let (primary_side, hedge_side) = if z > 0.0 {
        (LegSide::Short, LegSide::Long)
    } else {
        (LegSide::Long, LegSide::Short)
    };

    Some(PositionRecommendation {
        multiplier,
        hedge_ratio,
        primary: LegInstruction {
            symbol: second_symbol.to_string(),
            side: primary_side,
            units: multiplier,
        },
        hedge: LegInstruction {
            symbol: first_symbol.to_string(),
            side: hedge_side,
            units: multiplier * hedge_ratio,
        },
    })
}

/// Generates signals for one instrument pair.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    alert_threshold: f64,
    first_symbol: String,
    second_symbol: String,
}

impl SignalGenerator {
    pub fn new(alert_threshold: f64, first_symbol: &str, second_symbol: &str) -> Self {
        Self {
            alert_threshold,
            first_symbol: first_symbol.to_string(),
            second_symbol: second_symbol.to_string(),
        }
    }

    pub fn alert_threshold(&self) -> f64 {
        self.alert_threshold
    }

    /// Score `latest` against the fitted spread statistics.
    pub fn generate(
        &self,
        latest: f64,
        mean: f64,
        std_dev: f64,
        hedge_ratio: f64,
    ) -> Result<Signal, MonitorError> {
        let z = zscore(latest, mean, std_dev)?;
        let category = classify(z, self.alert_threshold);
        let position = size_position(z, hedge_ratio, &self.first_symbol, &self.second_symbol);
        let position_multiplier = position.as_ref().map_or(0.0, |p| p.multiplier);

        debug!(
            zscore = format!("{z:.4}"),
            category = ?category,
            multiplier = format!("{position_multiplier:.2}"),
            "Signal generated"
        );

        Ok(Signal {
            zscore: z,
            category,
            position_multiplier,
            position,
        })
    }
}
