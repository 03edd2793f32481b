/// Error taxonomy for the pricer.
/// Every pricing and volatility failure is surfaced to the caller; nothing is
/// silently defaulted to zero or NaN.
#[derive(Debug, thiserror::Error)]
pub enum PricerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("insufficient data: need at least {needed} prices, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("invalid price {price} at index {index}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("model computation error: {0}")]
    Model(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for PricerError {
    fn from(e: reqwest::Error) -> Self {
        PricerError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        PricerError::Parse(e.to_string())
    }
}

impl From<csv::Error> for PricerError {
    fn from(e: csv::Error) -> Self {
        PricerError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for PricerError {
    fn from(e: std::io::Error) -> Self {
        PricerError::Io(e.to_string())
    }
}

pub type PricerResult<T> = Result<T, PricerError>;
