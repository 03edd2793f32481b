pub mod yahoo;

use crate::errors::PricerResult;
use crate::state::PriceSeries;
use std::future::Future;

/// Source of spot prices and daily closes.
/// Each call is a single request: no retries, no backoff.
pub trait MarketData {
    /// Latest traded price for `ticker`.
    fn spot_price(&self, ticker: &str) -> impl Future<Output = PricerResult<f64>>;

    /// Daily closes for `ticker` covering the last `period_days` calendar days,
    /// oldest first. Never returns an empty series.
    fn daily_closes(
        &self,
        ticker: &str,
        period_days: u32,
    ) -> impl Future<Output = PricerResult<PriceSeries>>;
}
