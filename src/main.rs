use bs_pricer::feeds::yahoo::YahooClient;
use bs_pricer::feeds::MarketData;
use bs_pricer::models::black_scholes::BlackScholes;
use bs_pricer::models::volatility;
use bs_pricer::report::PricingReport;
use bs_pricer::{cli, config, errors};
use std::io::Write;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr so stdout carries only prompts and the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    // Collect user inputs before touching the network
    let inputs = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        match cli::collect_inputs(&mut input, &mut output, &cfg) {
            Ok(i) => i,
            Err(e) => {
                tracing::error!("input error: {e}");
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = run(&cfg, &inputs).await {
        tracing::error!(error = %e, ticker = %inputs.ticker, "pricing failed");
        std::process::exit(1);
    }
}

/// Fetch market data, estimate volatility, price every expiration, print the report.
async fn run(cfg: &config::AppConfig, inputs: &cli::UserInputs) -> errors::PricerResult<()> {
    let provider = YahooClient::new(
        &cfg.market_data_base_url,
        Duration::from_secs(cfg.market_data_timeout_secs),
    );

    let sigma =
        volatility::historical_volatility_for(&provider, &inputs.ticker, inputs.vol_period_days)
            .await?;
    let spot = provider.spot_price(&inputs.ticker).await?;

    tracing::info!(
        ticker = %inputs.ticker,
        spot = spot,
        sigma = sigma,
        period_days = inputs.vol_period_days,
        "market inputs resolved"
    );

    let model = BlackScholes::new();
    let report = PricingReport::build(
        &model,
        &inputs.ticker,
        spot,
        inputs.strike,
        inputs.rate,
        sigma,
        &inputs.expirations,
    )?;

    let rendered = report.render(cfg.output_format)?;
    let mut stdout = std::io::stdout();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
