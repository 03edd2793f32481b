use crate::errors::{PricerError, PricerResult};
use crate::report::OutputFormat;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub market_data_base_url: String,
    pub market_data_timeout_secs: u64,
    pub default_risk_free_rate: f64,
    pub default_vol_period_days: u32,
    pub output_format: OutputFormat,
}

impl AppConfig {
    pub fn from_env() -> PricerResult<Self> {
        dotenvy::dotenv().ok();

        let market_data_timeout_secs = env_var_or("MARKET_DATA_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| PricerError::Config(format!("MARKET_DATA_TIMEOUT_SECS: {e}")))?;

        let default_risk_free_rate = env_var_or("DEFAULT_RISK_FREE_RATE", "0.04")
            .parse::<f64>()
            .map_err(|e| PricerError::Config(format!("DEFAULT_RISK_FREE_RATE: {e}")))?;
        if !default_risk_free_rate.is_finite() {
            return Err(PricerError::Config("DEFAULT_RISK_FREE_RATE: must be finite".into()));
        }

        let default_vol_period_days = env_var_or("DEFAULT_VOL_PERIOD_DAYS", "30")
            .parse::<u32>()
            .map_err(|e| PricerError::Config(format!("DEFAULT_VOL_PERIOD_DAYS: {e}")))?;
        if default_vol_period_days == 0 {
            return Err(PricerError::Config("DEFAULT_VOL_PERIOD_DAYS: must be positive".into()));
        }

        let output_format = env_var_or("OUTPUT_FORMAT", "table")
            .parse::<OutputFormat>()
            .map_err(|e| PricerError::Config(format!("OUTPUT_FORMAT: {e}")))?;

        Ok(Self {
            market_data_base_url: env_var_or(
                "MARKET_DATA_BASE_URL",
                "https://query1.finance.yahoo.com",
            ),
            market_data_timeout_secs,
            default_risk_free_rate,
            default_vol_period_days,
            output_format,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
