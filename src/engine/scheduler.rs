//! Continuous monitoring loop with cooperative shutdown.
//!
//! A cycle that has started always runs to completion; shutdown is
//! observed before each cycle and while sleeping between cycles.

use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use super::monitor::Monitor;
use crate::types::{AnalysisReport, MonitorError};

// ---------------------------------------------------------------------------
// Shutdown signalling
// ---------------------------------------------------------------------------

/// Sending half: fires shutdown once, idempotently.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// Receiving half, handed to the loop.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownToken { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl ShutdownToken {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown has been requested. Never resolves if the
    /// trigger is dropped without firing.
    pub async fn triggered(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

/// Totals reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub failures: u64,
}

/// Run analysis cycles every `interval` until shutdown.
///
/// `on_cycle` receives the cycle number (from 1) and its outcome; a failed
/// cycle never stops the loop.
pub async fn run_continuous<F>(
    monitor: &Monitor,
    interval: Duration,
    mut shutdown: ShutdownToken,
    mut on_cycle: F,
) -> RunSummary
where
    F: FnMut(u64, &Result<AnalysisReport, MonitorError>),
{
    let mut summary = RunSummary::default();
    info!(interval_secs = interval.as_secs(), "Continuous monitoring started");

    loop {
        if shutdown.is_triggered() {
            break;
        }

        summary.cycles += 1;
        let outcome = monitor.run_analysis().await;
        if outcome.is_err() {
            summary.failures += 1;
        }
        on_cycle(summary.cycles, &outcome);

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.triggered() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    info!(
        cycles = summary.cycles,
        failures = summary.failures,
        "Continuous monitoring stopped"
    );
    summary
}
