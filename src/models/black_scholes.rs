use crate::errors::{PricerError, PricerResult};
use crate::models::PricingModel;
use crate::state::{ModelParams, OptionPrices, PricingInputs};
use statrs::distribution::{ContinuousCDF, Normal};

/// Below this `sigma * sqrt(T)` the option carries no time value and the
/// d1/d2 terms are not evaluated.
const MIN_SIGMA_SQRT_T: f64 = 1e-12;

/// Black-Scholes European call/put pricing.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
///
/// call = S*Phi(d1) - K*e^(-rT)*Phi(d2)
/// put  = K*e^(-rT)*Phi(-d2) - S*Phi(-d1)
///
/// Both legs come out of one d1/d2 evaluation so put-call parity holds.
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self { normal: Normal::standard() }
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingModel for BlackScholes {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn price(&self, params: &ModelParams) -> PricerResult<OptionPrices> {
        // At or past expiry: plain intrinsic value
        if params.ttl_years <= 0.0 {
            return Ok(OptionPrices {
                call: (params.spot - params.strike).max(0.0),
                put: (params.strike - params.spot).max(0.0),
            });
        }

        let k_disc = params.discounted_strike();

        // No volatility: the forward is certain, so price is discounted intrinsic
        if params.sigma_sqrt_t < MIN_SIGMA_SQRT_T {
            return floor_at_zero(params.spot - k_disc, k_disc - params.spot);
        }

        let d1 = (params.ln_s_k + (params.rate + params.half_sigma_sq) * params.ttl_years)
            / params.sigma_sqrt_t;
        let d2 = d1 - params.sigma_sqrt_t;

        let call = params.spot * self.normal.cdf(d1) - k_disc * self.normal.cdf(d2);
        let put = k_disc * self.normal.cdf(-d2) - params.spot * self.normal.cdf(-d1);

        floor_at_zero(call, put)
    }
}

/// Rounding can leave deep out-of-the-money legs a hair below zero.
/// `f64::max` would also swallow NaN, so non-finite legs are rejected first.
fn floor_at_zero(call: f64, put: f64) -> PricerResult<OptionPrices> {
    if !(call.is_finite() && put.is_finite()) {
        return Err(PricerError::Model(format!("non-finite price: call={call} put={put}")));
    }
    Ok(OptionPrices {
        call: call.max(0.0),
        put: put.max(0.0),
    })
}

/// Validates the inputs and prices one call/put pair.
pub fn price(spot: f64, strike: f64, days: i64, rate: f64, sigma: f64) -> PricerResult<OptionPrices> {
    let inputs = PricingInputs::new(spot, strike, days, rate, sigma)?;
    BlackScholes::new().price(&ModelParams::new(&inputs))
}
