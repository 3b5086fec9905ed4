//! Pair monitor: one fetch → align → estimate → signal cycle.
//!
//! The monitor owns the price source and the process-start configuration.
//! It keeps no fitted parameters between cycles; every call rebuilds the
//! whole chain of stage results and returns them in an `AnalysisReport`.

use chrono::{DateTime, Utc};
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::aligner;
use super::estimator;
use super::signal::SignalGenerator;
use crate::config::MonitorConfig;
use crate::data::PriceSource;
use crate::types::{AnalysisReport, DateWindow, MonitorError, PriceSeries};

pub struct Monitor {
    source: Box<dyn PriceSource>,
    config: MonitorConfig,
    signals: SignalGenerator,
}

impl Monitor {
    /// Create a monitor, rejecting configurations the pipeline cannot run.
    pub fn new(source: Box<dyn PriceSource>, config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;
        let signals = SignalGenerator::new(config.alert_threshold, &config.pair_a, &config.pair_b);
        Ok(Self {
            source,
            config,
            signals,
        })
    }

    /// Run one analysis cycle ending now.
    pub async fn run_analysis(&self) -> Result<AnalysisReport, MonitorError> {
        self.run_analysis_at(Utc::now()).await
    }

    /// Run one analysis cycle whose lookback window ends at `now`.
    pub async fn run_analysis_at(&self, now: DateTime<Utc>) -> Result<AnalysisReport, MonitorError> {
        let cycle_id = Uuid::new_v4();
        let span = info_span!("cycle", id = %cycle_id);

        let result = self.analyse(now).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| error!(error = %e, "Analysis failed"));
        }
        result
    }

    async fn analyse(&self, now: DateTime<Utc>) -> Result<AnalysisReport, MonitorError> {
        let window = DateWindow::lookback(now, self.config.lookback_days);
        info!(
            pair_a = %self.config.pair_a,
            pair_b = %self.config.pair_b,
            window = %window,
            source = self.source.name(),
            "Starting analysis"
        );

        let a = self.fetch(&self.config.pair_a, window).await?;
        let b = self.fetch(&self.config.pair_b, window).await?;

        let aligned = aligner::align(&a, &b, self.config.min_observations)?;
        info!(observations = aligned.len(), "Aligned daily closes");

        let estimation = estimator::estimate(&aligned)?;
        let latest = estimation
            .spread
            .latest()
            .ok_or_else(|| MonitorError::Estimation("spread is empty".into()))?;

        let signal = self.signals.generate(
            latest,
            estimation.spread.mean,
            estimation.spread.std_dev,
            estimation.fit.hedge_ratio,
        )?;
        info!(
            zscore = format!("{:.4}", signal.zscore),
            category = ?signal.category,
            multiplier = format!("{:.2}", signal.position_multiplier),
            "Signal generated"
        );

        Ok(AnalysisReport {
            started_at: now,
            pair_a: self.config.pair_a.clone(),
            pair_b: self.config.pair_b.clone(),
            window,
            observations: aligned.len(),
            first_observation: aligned.first_date(),
            last_observation: aligned.last_date(),
            alert_threshold: self.signals.alert_threshold(),
            estimation,
            signal,
        })
    }

    async fn fetch(&self, symbol: &str, window: DateWindow) -> Result<PriceSeries, MonitorError> {
        let series = self
            .source
            .fetch_daily_closes(symbol, window)
            .await
            .map_err(|e| MonitorError::data_source(symbol, format!("{e:#}")))?;

        if series.valid_count() == 0 {
            return Err(MonitorError::data_source(symbol, "empty response"));
        }
        Ok(series)
    }
}
