use crate::config::AppConfig;
use crate::errors::{PricerError, PricerResult};
use std::io::{BufRead, Write};

/// Everything the pricer needs from the user, resolved before any pricing runs.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInputs {
    pub ticker: String,
    pub strike: f64,
    pub rate: f64,
    pub expirations: Vec<i64>,
    pub vol_period_days: u32,
}

// ── Parsers ──

pub fn parse_ticker(raw: &str) -> PricerResult<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(PricerError::InvalidInput("ticker is empty".into()));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(PricerError::InvalidInput(format!("invalid ticker '{ticker}'")));
    }
    Ok(ticker)
}

pub fn parse_strike(raw: &str) -> PricerResult<f64> {
    let strike: f64 = raw
        .trim()
        .parse()
        .map_err(|_| PricerError::InvalidInput(format!("strike '{}' is not a number", raw.trim())))?;
    if !(strike.is_finite() && strike > 0.0) {
        return Err(PricerError::InvalidInput(format!("strike must be positive, got {strike}")));
    }
    Ok(strike)
}

/// Decimal (`0.05`) or percent (`5%`). Empty input selects `default`.
pub fn parse_rate(raw: &str, default: f64) -> PricerResult<f64> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Ok(default);
    }

    let (number, scale) = match cleaned.strip_suffix('%') {
        Some(pct) => (pct.trim(), 100.0),
        None => (cleaned, 1.0),
    };

    let rate = number
        .parse::<f64>()
        .map_err(|_| PricerError::InvalidInput(format!("rate '{cleaned}' is not a number")))?
        / scale;

    if !rate.is_finite() {
        return Err(PricerError::InvalidInput(format!("rate must be finite, got {cleaned}")));
    }
    Ok(rate)
}

/// Comma-separated day counts, e.g. `30,60,90`. Order is preserved.
pub fn parse_expirations(raw: &str) -> PricerResult<Vec<i64>> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            let days: i64 = part.parse().map_err(|_| {
                PricerError::InvalidInput(format!("expiration '{part}' is not a whole number of days"))
            })?;
            if days < 0 {
                return Err(PricerError::InvalidInput(format!(
                    "expiration must not be negative, got {days}"
                )));
            }
            Ok(days)
        })
        .collect()
}

/// Positive number of days. Empty input selects `default`.
pub fn parse_period(raw: &str, default: u32) -> PricerResult<u32> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return Ok(default);
    }
    match cleaned.parse::<u32>() {
        Ok(period) if period > 0 => Ok(period),
        _ => Err(PricerError::InvalidInput(format!(
            "period '{cleaned}' must be a positive whole number of days"
        ))),
    }
}

// ── Prompts ──

/// Writes `message`, reads a line and re-asks until `parse` accepts it.
/// Closed input is an error rather than an endless loop.
pub fn prompt_until<T, R, W, F>(input: &mut R, output: &mut W, message: &str, parse: F) -> PricerResult<T>
where
    R: BufRead,
    W: Write,
    F: Fn(&str) -> PricerResult<T>,
{
    loop {
        write!(output, "{message}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(PricerError::InvalidInput("input closed".into()));
        }

        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(e) => writeln!(output, "Invalid input: {e}. Please try again.")?,
        }
    }
}

pub fn collect_inputs<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    config: &AppConfig,
) -> PricerResult<UserInputs> {
    let ticker = prompt_until(
        input,
        output,
        "Enter the stock ticker symbol (e.g., AAPL, MSFT): ",
        parse_ticker,
    )?;

    let strike = prompt_until(input, output, "Enter the strike price: ", parse_strike)?;

    let default_rate = config.default_risk_free_rate;
    let rate = prompt_until(
        input,
        output,
        &format!(
            "Enter the risk-free interest rate as a decimal (0.05) or percent (5%).\n\
             Press Enter to use the default {:.2}%: ",
            default_rate * 100.0
        ),
        |raw| parse_rate(raw, default_rate),
    )?;

    let expirations = prompt_until(
        input,
        output,
        "Enter expiration times in days (comma-separated, e.g., 30,60,90): ",
        parse_expirations,
    )?;

    let default_period = config.default_vol_period_days;
    let vol_period_days = prompt_until(
        input,
        output,
        &format!(
            "Enter the historical volatility period in days (e.g., 30, 60, 90, 252).\n\
             Press Enter to use the default {default_period} days: "
        ),
        |raw| parse_period(raw, default_period),
    )?;

    Ok(UserInputs {
        ticker,
        strike,
        rate,
        expirations,
        vol_period_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OutputFormat;
    use std::io::Cursor;

    fn test_config() -> AppConfig {
        AppConfig {
            market_data_base_url: "http://localhost".into(),
            market_data_timeout_secs: 1,
            default_risk_free_rate: 0.04,
            default_vol_period_days: 30,
            output_format: OutputFormat::Table,
        }
    }

    #[test]
    fn test_ticker_upper_cased() {
        assert_eq!(parse_ticker("  msft\n").unwrap(), "MSFT");
        assert_eq!(parse_ticker("brk.b").unwrap(), "BRK.B");
        assert_eq!(parse_ticker("^gspc").unwrap(), "^GSPC");
        assert!(parse_ticker("   ").is_err());
        assert!(parse_ticker("MS FT").is_err());
    }

    #[test]
    fn test_strike_must_be_positive() {
        assert_eq!(parse_strike("105.5").unwrap(), 105.5);
        assert!(parse_strike("0").is_err());
        assert!(parse_strike("-10").is_err());
        assert!(parse_strike("abc").is_err());
        assert!(parse_strike("inf").is_err());
    }

    #[test]
    fn test_rate_decimal_and_percent() {
        assert_eq!(parse_rate("0.05", 0.04).unwrap(), 0.05);
        assert!((parse_rate("5%", 0.04).unwrap() - 0.05).abs() < 1e-15);
        assert!((parse_rate(" 4.5 % ", 0.04).unwrap() - 0.045).abs() < 1e-15);
        assert_eq!(parse_rate("  \n", 0.04).unwrap(), 0.04);
        assert!(parse_rate("%", 0.04).is_err());
        assert!(parse_rate("five", 0.04).is_err());
    }

    #[test]
    fn test_expirations_keep_order() {
        assert_eq!(parse_expirations("30, 60,90").unwrap(), vec![30, 60, 90]);
        assert_eq!(parse_expirations("90,30").unwrap(), vec![90, 30]);
        assert_eq!(parse_expirations("0").unwrap(), vec![0]);
        assert!(parse_expirations("30,,60").is_err());
        assert!(parse_expirations("30,-5").is_err());
        assert!(parse_expirations("30.5").is_err());
    }

    #[test]
    fn test_period_default_and_positive() {
        assert_eq!(parse_period("", 30).unwrap(), 30);
        assert_eq!(parse_period("252", 30).unwrap(), 252);
        assert!(parse_period("0", 30).is_err());
        assert!(parse_period("-7", 30).is_err());
    }

    #[test]
    fn test_prompt_reasks_until_valid() {
        let mut input = Cursor::new("abc\n-3\n42\n");
        let mut output = Vec::new();
        let strike = prompt_until(&mut input, &mut output, "strike: ", parse_strike).unwrap();
        assert_eq!(strike, 42.0);

        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("strike: ").count(), 3);
        assert_eq!(shown.matches("Invalid input").count(), 2);
    }

    #[test]
    fn test_prompt_fails_on_closed_input() {
        let mut input = Cursor::new("abc\n");
        let mut output = Vec::new();
        let result = prompt_until(&mut input, &mut output, "strike: ", parse_strike);
        assert!(matches!(result, Err(PricerError::InvalidInput(_))));
    }

    #[test]
    fn test_collect_inputs_with_defaults() {
        let mut input = Cursor::new("aapl\n150\n\n30,60,90\n\n");
        let mut output = Vec::new();
        let inputs = collect_inputs(&mut input, &mut output, &test_config()).unwrap();
        assert_eq!(
            inputs,
            UserInputs {
                ticker: "AAPL".into(),
                strike: 150.0,
                rate: 0.04,
                expirations: vec![30, 60, 90],
                vol_period_days: 30,
            }
        );
    }
}
