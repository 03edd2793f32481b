use crate::errors::{PricerError, PricerResult};
use chrono::NaiveDate;

/// Calendar days per year used to turn an expiration day-count into years.
pub const DAYS_PER_YEAR: f64 = 365.0;

// ── Pricing inputs and outputs ──

/// One pricing request. Built through `PricingInputs::new`, which rejects
/// anything the closed-form formula cannot handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingInputs {
    pub spot: f64,
    pub strike: f64,
    pub days: i64,
    pub rate: f64,
    pub sigma: f64,
}

impl PricingInputs {
    pub fn new(spot: f64, strike: f64, days: i64, rate: f64, sigma: f64) -> PricerResult<Self> {
        if !(spot.is_finite() && spot > 0.0) {
            return Err(PricerError::InvalidInput(format!("spot must be positive, got {spot}")));
        }
        if !(strike.is_finite() && strike > 0.0) {
            return Err(PricerError::InvalidInput(format!("strike must be positive, got {strike}")));
        }
        if !rate.is_finite() {
            return Err(PricerError::InvalidInput(format!("rate must be finite, got {rate}")));
        }
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(PricerError::InvalidInput(format!(
                "volatility must be non-negative, got {sigma}"
            )));
        }
        Ok(Self { spot, strike, days, rate, sigma })
    }

    #[inline]
    pub fn years(&self) -> f64 {
        days_to_years(self.days)
    }
}

#[inline]
pub fn days_to_years(days: i64) -> f64 {
    days as f64 / DAYS_PER_YEAR
}

/// Call and put prices for a single expiration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionPrices {
    pub call: f64,
    pub put: f64,
}

/// Precomputed terms shared by the call and put legs.
#[derive(Debug, Clone, Copy)]
pub struct ModelParams {
    pub spot: f64,
    pub strike: f64,
    pub ttl_years: f64,
    pub rate: f64,
    // Precomputed
    pub ln_s_k: f64,
    pub sigma_sqrt_t: f64,
    pub half_sigma_sq: f64,
    pub discount: f64,
}

impl ModelParams {
    #[inline]
    pub fn new(inputs: &PricingInputs) -> Self {
        let ttl_years = inputs.years();
        Self {
            spot: inputs.spot,
            strike: inputs.strike,
            ttl_years,
            rate: inputs.rate,
            ln_s_k: (inputs.spot / inputs.strike).ln(),
            sigma_sqrt_t: inputs.sigma * ttl_years.max(0.0).sqrt(),
            half_sigma_sq: 0.5 * inputs.sigma * inputs.sigma,
            discount: (-inputs.rate * ttl_years.max(0.0)).exp(),
        }
    }

    /// Strike discounted to today, `K * e^(-rT)`.
    #[inline]
    pub fn discounted_strike(&self) -> f64 {
        self.strike * self.discount
    }
}

// ── Historical prices ──

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronological daily closes. Only used to derive volatility.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, sorting by date so returns are always taken forward in time.
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { ticker: ticker.into(), points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }
}
