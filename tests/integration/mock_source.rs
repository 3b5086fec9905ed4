//! Mock price source for integration testing.
//!
//! Provides a deterministic `PriceSource` that serves canned daily closes,
//! records every fetch, and can be told to fail specific calls or to fire
//! shutdown after a number of fetches. All state is in-memory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use pairwatch::data::PriceSource;
use pairwatch::engine::scheduler::ShutdownTrigger;
use pairwatch::types::{DateWindow, PricePoint, PriceSeries};

pub const FIRST: &str = "CADJPY=X";
pub const SECOND: &str = "NZDJPY=X";

/// A mock price source for deterministic testing.
///
/// Clones share state, so a test can hand one clone to the monitor and
/// inspect the other.
#[derive(Clone)]
pub struct MockSource {
    series: Arc<HashMap<String, PriceSeries>>,
    calls: Arc<Mutex<Vec<String>>>,
    /// If set, every fetch returns this error.
    force_error: Arc<Mutex<Option<String>>>,
    /// 1-based call numbers that fail.
    failing_calls: Arc<Mutex<HashSet<usize>>>,
    shutdown_after: Arc<Mutex<Option<(usize, ShutdownTrigger)>>>,
}

impl MockSource {
    pub fn new(series: Vec<PriceSeries>) -> Self {
        Self {
            series: Arc::new(series.into_iter().map(|s| (s.symbol.clone(), s)).collect()),
            calls: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
            failing_calls: Arc::new(Mutex::new(HashSet::new())),
            shutdown_after: Arc::new(Mutex::new(None)),
        }
    }

    /// Mock serving `synthetic_pair(n)`.
    pub fn with_pair(n: usize) -> Self {
        let (a, b) = synthetic_pair(n);
        Self::new(vec![a, b])
    }

    /// Force all subsequent fetches to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Fail the `call`-th fetch (1-based).
    pub fn fail_call(&self, call: usize) {
        self.failing_calls.lock().unwrap().insert(call);
    }

    /// Fire `trigger` once `calls` fetches have completed.
    pub fn shutdown_after(&self, calls: usize, trigger: ShutdownTrigger) {
        *self.shutdown_after.lock().unwrap() = Some((calls, trigger));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for MockSource {
    async fn fetch_daily_closes(&self, symbol: &str, _window: DateWindow) -> Result<PriceSeries> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(symbol.to_string());
            calls.len()
        };

        if let Some((after, trigger)) = self.shutdown_after.lock().unwrap().as_ref() {
            if call >= *after {
                trigger.trigger();
            }
        }

        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        if self.failing_calls.lock().unwrap().contains(&call) {
            return Err(anyhow!("simulated outage on call {call}"));
        }

        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("unknown symbol {symbol}"))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Synthetic data
// ---------------------------------------------------------------------------

/// Uniform shocks in [-0.5, 0.5) from a fixed-seed LCG.
pub fn shocks(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 11) as f64 / (1u64 << 53) as f64) - 0.5
        })
        .collect()
}

/// `n` consecutive weekdays starting 2022-01-03.
pub fn weekdays(n: usize) -> Vec<NaiveDate> {
    let mut date = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(date);
        }
        date += Duration::days(1);
    }
    out
}

/// Random-walk first leg around 100 and a second leg `1.5·a + noise`.
///
/// Every 25th close of the second leg is missing, so the aligned table is
/// `n - ceil(n / 25)` rows long.
pub fn synthetic_pair(n: usize) -> (PriceSeries, PriceSeries) {
    let dates = weekdays(n);
    let mut level = 100.0;
    let a: Vec<f64> = shocks(n, 17)
        .into_iter()
        .map(|s| {
            level += s;
            level
        })
        .collect();
    let noise = shocks(n, 23);

    let first = PriceSeries::new(
        FIRST,
        dates.iter().zip(&a).map(|(d, v)| PricePoint::new(*d, *v)).collect(),
    );
    let second = PriceSeries::new(
        SECOND,
        dates
            .iter()
            .enumerate()
            .map(|(i, d)| {
                if i % 25 == 0 {
                    PricePoint::missing(*d)
                } else {
                    PricePoint::new(*d, 1.5 * a[i] + noise[i])
                }
            })
            .collect(),
    );
    (first, second)
}
