use crate::errors::{PricerError, PricerResult};
use crate::models::PricingModel;
use crate::state::{days_to_years, ModelParams, OptionPrices, PricingInputs};
use csv::WriterBuilder;
use std::fmt::Write as _;
use std::str::FromStr;

const TABLE_WIDTH: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format '{other}' (expected table, json or csv)")),
        }
    }
}

/// One expiration's outcome. A priced row carries `call`/`put`; a row the
/// model could not price carries `error` instead, and the rest of the batch
/// is unaffected.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReportRow {
    pub days: i64,
    pub years: f64,
    pub call: Option<f64>,
    pub put: Option<f64>,
    pub error: Option<String>,
}

impl ReportRow {
    fn priced(days: i64, prices: OptionPrices) -> Self {
        Self {
            days,
            years: days_to_years(days),
            call: Some(prices.call),
            put: Some(prices.put),
            error: None,
        }
    }

    fn failed(days: i64, error: &PricerError) -> Self {
        Self {
            days,
            years: days_to_years(days),
            call: None,
            put: None,
            error: Some(error.to_string()),
        }
    }

    #[inline]
    pub fn is_priced(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PricingReport {
    pub ticker: String,
    pub model: &'static str,
    pub spot: f64,
    pub strike: f64,
    pub rate: f64,
    pub volatility: f64,
    pub rows: Vec<ReportRow>,
}

impl PricingReport {
    /// Prices every expiration with the same spot, strike, rate and volatility.
    /// The shared inputs are validated once; each row is then priced on its own,
    /// in input order, and a failing row is recorded rather than propagated.
    pub fn build<M: PricingModel + ?Sized>(
        model: &M,
        ticker: &str,
        spot: f64,
        strike: f64,
        rate: f64,
        volatility: f64,
        expirations: &[i64],
    ) -> PricerResult<Self> {
        PricingInputs::new(spot, strike, 0, rate, volatility)?;

        let rows: Vec<ReportRow> = expirations
            .iter()
            .map(|&days| match price_row(model, spot, strike, days, rate, volatility) {
                Ok(prices) => ReportRow::priced(days, prices),
                Err(e) => {
                    tracing::warn!(ticker = %ticker, days = days, error = %e, "expiration not priced");
                    ReportRow::failed(days, &e)
                }
            })
            .collect();

        tracing::debug!(
            ticker = %ticker,
            rows = rows.len(),
            failed = rows.iter().filter(|r| !r.is_priced()).count(),
            "pricing report built"
        );

        Ok(Self {
            ticker: ticker.to_string(),
            model: model.name(),
            spot,
            strike,
            rate,
            volatility,
            rows,
        })
    }

    pub fn render(&self, format: OutputFormat) -> PricerResult<String> {
        match format {
            OutputFormat::Table => Ok(self.render_table()),
            OutputFormat::Json => self.render_json(),
            OutputFormat::Csv => self.render_csv(),
        }
    }

    pub fn render_table(&self) -> String {
        let rule = "=".repeat(TABLE_WIDTH);
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "Option Pricing Results for {}", self.ticker);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Current Stock Price: ${:.2}", self.spot);
        let _ = writeln!(out, "Strike Price: ${:.2}", self.strike);
        let _ = writeln!(out, "Risk-Free Rate: {:.2}%", self.rate * 100.0);
        let _ = writeln!(out, "Volatility: {:.2}%", self.volatility * 100.0);
        let _ = writeln!(out, "{rule}\n");

        let _ = writeln!(
            out,
            "{:<20} {:<25} {:<15} {:<15}",
            "Expiration (days)", "Time to Exp (years)", "Call Price", "Put Price"
        );
        let _ = writeln!(out, "{}", "-".repeat(TABLE_WIDTH));

        for row in &self.rows {
            let line = match (row.call, row.put, &row.error) {
                (Some(call), Some(put), _) => format!(
                    "{:<20} {:<25.4} ${:<14.2} ${:<14.2}",
                    row.days, row.years, call, put
                ),
                (_, _, error) => format!(
                    "{:<20} {:<25.4} error: {}",
                    row.days,
                    row.years,
                    error.as_deref().unwrap_or("not priced")
                ),
            };
            let _ = writeln!(out, "{}", line.trim_end());
        }

        let _ = writeln!(out, "\n{rule}");
        out
    }

    pub fn render_json(&self) -> PricerResult<String> {
        Ok(serde_json::to_string_pretty(self)? + "\n")
    }

    /// One header line, then one record per row. Unpriced rows leave
    /// `call`/`put` empty and fill `error`.
    pub fn render_csv(&self) -> PricerResult<String> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        let bytes = writer
            .into_inner()
            .map_err(|e| PricerError::Io(format!("csv buffer: {e}")))?;
        String::from_utf8(bytes).map_err(|e| PricerError::Parse(format!("csv utf-8: {e}")))
    }
}

/// Prices one expiration in isolation.
pub fn price_row<M: PricingModel + ?Sized>(
    model: &M,
    spot: f64,
    strike: f64,
    days: i64,
    rate: f64,
    volatility: f64,
) -> PricerResult<OptionPrices> {
    let inputs = PricingInputs::new(spot, strike, days, rate, volatility)?;
    model.price(&ModelParams::new(&inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::{self, BlackScholes};

    fn sample_report(expirations: &[i64]) -> PricingReport {
        PricingReport::build(&BlackScholes::new(), "MSFT", 100.0, 105.0, 0.04, 0.25, expirations).unwrap()
    }

    #[test]
    fn test_rows_follow_input_order() {
        let report = sample_report(&[30, 60, 90]);
        let days: Vec<i64> = report.rows.iter().map(|r| r.days).collect();
        assert_eq!(days, vec![30, 60, 90]);

        let report = sample_report(&[90, 0, 30, 30]);
        let days: Vec<i64> = report.rows.iter().map(|r| r.days).collect();
        assert_eq!(days, vec![90, 0, 30, 30]);
    }

    #[test]
    fn test_years_consistent_with_days() {
        for row in sample_report(&[30, 60, 90]).rows {
            assert_eq!(row.years, row.days as f64 / 365.0);
        }
    }

    #[test]
    fn test_rows_match_single_pricing() {
        let batch = sample_report(&[90, 30, 60]);
        for row in batch.rows {
            let single = black_scholes::price(100.0, 105.0, row.days, 0.04, 0.25).unwrap();
            assert_eq!(row.call, Some(single.call));
            assert_eq!(row.put, Some(single.put));
            assert!(row.is_priced());
        }
    }

    #[test]
    fn test_longer_expiry_worth_more() {
        let calls: Vec<f64> = sample_report(&[30, 60, 90])
            .rows
            .iter()
            .map(|r| r.call.unwrap())
            .collect();
        assert!(calls[0] < calls[1] && calls[1] < calls[2], "calls={calls:?}");
    }

    #[test]
    fn test_invalid_shared_inputs_rejected() {
        let result = PricingReport::build(&BlackScholes::new(), "MSFT", 100.0, 105.0, 0.04, -0.1, &[30]);
        assert!(matches!(result, Err(PricerError::InvalidInput(_))));
    }

    fn report_with_unpriceable_row() -> PricingReport {
        // e^(-rT) overflows at 10M days with a negative rate
        PricingReport::build(&BlackScholes::new(), "MSFT", 100.0, 100.0, -0.05, 0.2, &[30, 10_000_000, 60]).unwrap()
    }

    #[test]
    fn test_failed_row_does_not_abort_batch() {
        let report = report_with_unpriceable_row();
        assert_eq!(report.rows.len(), 3);

        let expected_30 = black_scholes::price(100.0, 100.0, 30, -0.05, 0.2).unwrap();
        assert_eq!(report.rows[0].call, Some(expected_30.call));
        assert!(report.rows[2].is_priced());

        let failed = &report.rows[1];
        assert_eq!(failed.days, 10_000_000);
        assert_eq!(failed.call, None);
        assert_eq!(failed.put, None);
        let msg = failed.error.as_deref().unwrap();
        assert!(msg.contains("non-finite"), "{msg}");
    }

    #[test]
    fn test_failed_row_rendered_in_place() {
        let report = report_with_unpriceable_row();

        let table = report.render_table();
        let failed_line = table
            .lines()
            .find(|l| l.starts_with("10000000 "))
            .expect("failed row line");
        assert!(failed_line.contains("error: model computation error"), "{failed_line}");

        let json: serde_json::Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert!(json["rows"][1]["call"].is_null());
        assert!(json["rows"][0]["call"].is_f64());
    }

    #[test]
    fn test_empty_expirations_give_empty_report() {
        assert!(sample_report(&[]).rows.is_empty());
    }

    #[test]
    fn test_table_layout() {
        let table = sample_report(&[30]).render_table();
        assert!(table.contains("Option Pricing Results for MSFT"));
        assert!(table.contains("Current Stock Price: $100.00"));
        assert!(table.contains("Risk-Free Rate: 4.00%"));
        assert!(table.contains("Volatility: 25.00%"));
        assert!(table.contains(&"=".repeat(75)));

        let row_line = table
            .lines()
            .find(|l| l.starts_with("30 "))
            .expect("row line");
        assert!(row_line.contains("0.0822"), "{row_line}");
        assert_eq!(&row_line[..20], format!("{:<20}", 30));
    }

    #[test]
    fn test_json_round_shape() {
        let json = sample_report(&[30, 60]).render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ticker"], "MSFT");
        assert_eq!(value["model"], "Black-Scholes");
        assert_eq!(value["rows"].as_array().map(|r| r.len()), Some(2));
        assert_eq!(value["rows"][1]["days"], 60);
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let csv = sample_report(&[30, 60, 90]).render_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "days,years,call,put,error");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("90,"));
        assert!(lines[3].ends_with(','), "priced row leaves error empty: {}", lines[3]);
    }

    #[test]
    fn test_csv_unpriced_row_has_empty_prices() {
        let csv = report_with_unpriceable_row().render_csv().unwrap();
        let failed = csv.lines().nth(2).expect("failed record");
        assert!(failed.starts_with("10000000,"), "{failed}");
        assert!(failed.contains(",,,model computation error"), "{failed}");
    }

    #[test]
    fn test_csv_quotes_error_text_with_commas() {
        let mut report = sample_report(&[30]);
        report.rows.push(ReportRow::failed(45, &PricerError::InvalidInput("a, b".into())));

        let csv = report.render_csv().unwrap();
        let last = csv.lines().last().expect("record");
        assert!(last.ends_with(",,,\"invalid input: a, b\""), "{last}");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!(" table ".parse::<OutputFormat>(), Ok(OutputFormat::Table));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
