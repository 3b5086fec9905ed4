//! Monitoring loop under paused tokio time.

use std::time::Duration;
use tokio::time::Instant;

use pairwatch::config::MonitorConfig;
use pairwatch::engine::monitor::Monitor;
use pairwatch::engine::scheduler::{run_continuous, shutdown_channel, RunSummary};

use crate::mock_source::MockSource;

const HOUR: Duration = Duration::from_secs(3600);

fn monitor(source: &MockSource) -> Monitor {
    Monitor::new(Box::new(source.clone()), MonitorConfig::default()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_mid_cycle_finishes_cycle() {
    let source = MockSource::with_pair(200);
    let (trigger, token) = shutdown_channel();
    // Fires during the second cycle's second fetch.
    source.shutdown_after(4, trigger);

    let mut outcomes = Vec::new();
    let summary = run_continuous(&monitor(&source), HOUR, token, |cycle, outcome| {
        outcomes.push((cycle, outcome.is_ok()));
    })
    .await;

    assert_eq!(summary, RunSummary { cycles: 2, failures: 0 });
    assert_eq!(outcomes, vec![(1, true), (2, true)]);
    assert_eq!(source.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycle_does_not_stop_loop() {
    let source = MockSource::with_pair(200);
    source.fail_call(1);
    let (trigger, token) = shutdown_channel();
    // Cycle 1 aborts after one fetch; cycle 2 makes calls 2 and 3.
    source.shutdown_after(3, trigger);

    let mut outcomes = Vec::new();
    let summary = run_continuous(&monitor(&source), HOUR, token, |_, outcome| {
        outcomes.push(outcome.is_ok());
    })
    .await;

    assert_eq!(summary, RunSummary { cycles: 2, failures: 1 });
    assert_eq!(outcomes, vec![false, true]);
}

#[tokio::test(start_paused = true)]
async fn test_waits_interval_between_cycles() {
    let source = MockSource::with_pair(200);
    let (trigger, token) = shutdown_channel();
    source.shutdown_after(6, trigger);

    let started = Instant::now();
    let summary = run_continuous(&monitor(&source), HOUR, token, |_, _| {}).await;
    let elapsed = started.elapsed();

    assert_eq!(summary.cycles, 3);
    assert!(elapsed >= 2 * HOUR, "elapsed {elapsed:?}");
    assert!(elapsed < 3 * HOUR, "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_wait_exits_promptly() {
    let source = MockSource::with_pair(200);
    let (trigger, token) = shutdown_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(90 * 60)).await;
        trigger.trigger();
    });

    let started = Instant::now();
    let summary = run_continuous(&monitor(&source), HOUR, token, |_, _| {}).await;

    // Cycles at t=0 and t=60min; shutdown at t=90min ends the second wait.
    assert_eq!(summary.cycles, 2);
    assert!(started.elapsed() < 2 * HOUR);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_start_runs_nothing() {
    let source = MockSource::with_pair(200);
    let (trigger, token) = shutdown_channel();
    trigger.trigger();

    let summary = run_continuous(&monitor(&source), HOUR, token, |_, _| {}).await;
    assert_eq!(summary, RunSummary::default());
    assert_eq!(source.call_count(), 0);
}
