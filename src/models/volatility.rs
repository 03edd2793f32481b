use crate::errors::{PricerError, PricerResult};
use crate::feeds::MarketData;
use crate::state::PriceSeries;
use statrs::statistics::Statistics;

/// Trading days per year used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// The unbiased (N-1) standard deviation needs two returns, so three closes.
pub const MIN_PRICES: usize = 3;

/// Log returns `ln(P_i / P_{i-1})` of consecutive closes.
/// The first close has no return and contributes only as a denominator.
pub fn log_returns(prices: &[f64]) -> PricerResult<Vec<f64>> {
    if let Some((index, &price)) = prices
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p > 0.0))
    {
        return Err(PricerError::InvalidPrice { index, price });
    }

    Ok(prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
}

/// Annualized historical volatility of a chronological close series.
///
/// sigma_annual = stddev(log returns, N-1) * sqrt(252)
pub fn historical_volatility(prices: &[f64]) -> PricerResult<f64> {
    let returns = log_returns(prices)?;
    if prices.len() < MIN_PRICES {
        return Err(PricerError::InsufficientData {
            needed: MIN_PRICES,
            got: prices.len(),
        });
    }

    let daily = returns.iter().std_dev();
    let annual = daily * TRADING_DAYS_PER_YEAR.sqrt();

    tracing::debug!(
        observations = prices.len(),
        daily_vol = daily,
        annual_vol = annual,
        "historical volatility computed"
    );

    Ok(annual)
}

pub fn historical_volatility_from_series(series: &PriceSeries) -> PricerResult<f64> {
    historical_volatility(&series.closes())
}

/// Fetches `period_days` of closes for `ticker` and estimates volatility from them.
/// Same math as `historical_volatility`; only the source of prices differs.
pub async fn historical_volatility_for<M: MarketData>(
    provider: &M,
    ticker: &str,
    period_days: u32,
) -> PricerResult<f64> {
    let series = provider.daily_closes(ticker, period_days).await?;
    historical_volatility_from_series(&series)
}
