use crate::errors::{PricerError, PricerResult};
use crate::feeds::MarketData;
use crate::state::{PricePoint, PriceSeries};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance chart API client.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(concat!("bs_pricer/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chart(&self, ticker: &str, range: &str) -> PricerResult<ChartResult> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| PricerError::DataUnavailable(format!("{ticker}: request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| PricerError::DataUnavailable(format!("{ticker}: reading body failed: {e}")))?;
        if !status.is_success() {
            // Yahoo still sends a chart envelope with an error description on 4xx
            return match parse_chart(ticker, &body) {
                Err(e @ PricerError::DataUnavailable(_)) => Err(e),
                _ => Err(PricerError::DataUnavailable(format!("{ticker}: HTTP {status}: {body}"))),
            };
        }

        parse_chart(ticker, &body)
    }
}

impl MarketData for YahooClient {
    async fn spot_price(&self, ticker: &str) -> PricerResult<f64> {
        let chart = self.fetch_chart(ticker, "1d").await?;

        let price = chart
            .meta
            .as_ref()
            .and_then(|m| m.regular_market_price)
            .or_else(|| closes_of(&chart).into_iter().flatten().last())
            .ok_or_else(|| PricerError::DataUnavailable(format!("{ticker}: no spot price")))?;

        if price <= 0.0 || !price.is_finite() {
            return Err(PricerError::DataUnavailable(format!("{ticker}: invalid spot price {price}")));
        }

        tracing::info!(ticker = %ticker, spot = price, "spot price fetched");
        Ok(price)
    }

    async fn daily_closes(&self, ticker: &str, period_days: u32) -> PricerResult<PriceSeries> {
        let chart = self.fetch_chart(ticker, &format!("{period_days}d")).await?;
        let series = series_from_chart(ticker, &chart)?;

        tracing::info!(
            ticker = %ticker,
            period_days = period_days,
            observations = series.len(),
            "daily closes fetched"
        );
        Ok(series)
    }
}

// Response shape (trimmed):
// {
//   "chart": {
//     "result": [{
//       "meta": { "symbol": "MSFT", "regularMarketPrice": 415.2 },
//       "timestamp": [1717075800, 1717162200],
//       "indicators": { "quote": [{ "close": [414.67, null] }] }
//     }],
//     "error": null
//   }
// }

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<Quote>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

fn parse_chart(ticker: &str, body: &str) -> PricerResult<ChartResult> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(PricerError::DataUnavailable(format!(
            "{ticker}: {} ({})",
            err.description.unwrap_or_default(),
            err.code.unwrap_or_default()
        )));
    }

    envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| PricerError::DataUnavailable(format!("{ticker}: empty chart result")))
}

fn closes_of(chart: &ChartResult) -> Vec<Option<f64>> {
    chart
        .indicators
        .as_ref()
        .and_then(|i| i.quote.as_ref())
        .and_then(|q| q.first())
        .and_then(|q| q.close.clone())
        .unwrap_or_default()
}

/// Pairs timestamps with closes. Null closes (halts, partial bars) are skipped.
fn series_from_chart(ticker: &str, chart: &ChartResult) -> PricerResult<PriceSeries> {
    let timestamps = chart.timestamp.as_deref().unwrap_or_default();
    let closes = closes_of(chart);

    let points: Vec<PricePoint> = timestamps
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = chrono::DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(PricePoint { date, close: close? })
        })
        .collect();

    if points.is_empty() {
        return Err(PricerError::DataUnavailable(format!("{ticker}: no daily closes")));
    }

    Ok(PriceSeries::new(ticker, points))
}
