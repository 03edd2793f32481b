pub mod black_scholes;
pub mod volatility;

use crate::errors::PricerResult;
use crate::state::{ModelParams, OptionPrices};

/// Closed-form European option models.
/// price() must be a pure function: deterministic output from inputs only.
pub trait PricingModel {
    fn name(&self) -> &'static str;

    /// Call and put prices from precomputed parameters.
    /// Non-finite results are returned as `PricerError::Model`, never as prices.
    fn price(&self, params: &ModelParams) -> PricerResult<OptionPrices>;
}
