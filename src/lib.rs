//! European option pricing with Black-Scholes and historical volatility.
//!
//! The core is pure: [`models::black_scholes::price`] and
//! [`models::volatility::historical_volatility`] take explicit inputs and
//! return explicit results. Market data arrives through [`feeds::MarketData`];
//! prompting lives in [`cli`] and is only driven by the binary.

pub mod cli;
pub mod config;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod report;
pub mod state;
