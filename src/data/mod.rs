//! Market-data providers.
//!
//! Defines the `PriceSource` trait consumed by the monitor and the Yahoo
//! Finance implementation used in production.

pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{DateWindow, PriceSeries};

/// Abstraction over an external daily-close provider.
///
/// Retry, backoff, authentication and rate limiting are the provider's
/// concern; the monitor calls each method once per cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch daily closes for `symbol` within `window`.
    async fn fetch_daily_closes(&self, symbol: &str, window: DateWindow) -> Result<PriceSeries>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
