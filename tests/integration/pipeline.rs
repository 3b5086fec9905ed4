//! End-to-end analysis cycles.

use pairwatch::config::MonitorConfig;
use pairwatch::engine::monitor::Monitor;
use pairwatch::types::{MonitorError, PricePoint, PriceSeries};

use crate::mock_source::{synthetic_pair, weekdays, MockSource, FIRST, SECOND};

fn monitor(source: &MockSource) -> Monitor {
    Monitor::new(Box::new(source.clone()), MonitorConfig::default()).unwrap()
}

#[tokio::test]
async fn test_full_cycle_on_cointegrated_pair() {
    let source = MockSource::with_pair(500);
    let report = monitor(&source).run_analysis().await.unwrap();

    // 20 of the 500 second-leg closes are missing.
    assert_eq!(report.observations, 480);
    assert_eq!(source.calls(), vec![FIRST.to_string(), SECOND.to_string()]);

    let est = &report.estimation;
    assert!((est.fit.hedge_ratio - 1.5).abs() < 0.05);
    assert!(est.fit.r_squared > 0.9);
    assert!(est.cointegration.is_cointegrated());
    assert_eq!(est.spread.values.len(), 480);

    let expected_z = (est.spread.latest().unwrap() - est.spread.mean) / est.spread.std_dev;
    assert!((report.signal.zscore - expected_z).abs() < 1e-12);
    assert_eq!(report.last_observation, weekdays(500).last().copied());

    let text = report.to_string();
    assert!(text.contains(FIRST));
    assert!(text.contains(SECOND));
}

#[tokio::test]
async fn test_cycles_are_independent() {
    let source = MockSource::with_pair(300);
    let monitor = monitor(&source);
    let first = monitor.run_analysis().await.unwrap();
    let second = monitor.run_analysis().await.unwrap();
    assert_eq!(first.estimation.fit, second.estimation.fit);
    assert_eq!(first.signal, second.signal);
    assert_eq!(source.call_count(), 4);
}

#[tokio::test]
async fn test_short_overlap_skips_estimation() {
    let (a, _) = synthetic_pair(300);
    // Second leg only overlaps the last 80 dates.
    let dates = weekdays(300);
    let b = PriceSeries::new(
        SECOND,
        dates[220..]
            .iter()
            .enumerate()
            .map(|(i, d)| PricePoint::new(*d, 150.0 + i as f64 * 0.1))
            .collect(),
    );
    let source = MockSource::new(vec![a, b]);

    let err = monitor(&source).run_analysis().await.unwrap_err();
    assert_eq!(err, MonitorError::InsufficientData { required: 100, actual: 80 });
}

#[tokio::test]
async fn test_provider_failure_aborts_cycle() {
    let source = MockSource::with_pair(300);
    source.set_error("HTTP 503");

    let err = monitor(&source).run_analysis().await.unwrap_err();
    match err {
        MonitorError::DataSource { symbol, message } => {
            assert_eq!(symbol, FIRST);
            assert!(message.contains("503"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // The second leg is never requested.
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn test_second_leg_failure_names_second_symbol() {
    let source = MockSource::with_pair(300);
    source.fail_call(2);

    let err = monitor(&source).run_analysis().await.unwrap_err();
    assert!(matches!(err, MonitorError::DataSource { ref symbol, .. } if symbol == SECOND));
}

#[tokio::test]
async fn test_unknown_symbol_is_data_source_error() {
    let source = MockSource::with_pair(300);
    let config = MonitorConfig {
        pair_b: "AUDJPY=X".into(),
        ..MonitorConfig::default()
    };
    let monitor = Monitor::new(Box::new(source.clone()), config).unwrap();

    let err = monitor.run_analysis().await.unwrap_err();
    assert!(err.to_string().contains("AUDJPY=X"));
}
