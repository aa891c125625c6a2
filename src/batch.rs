//! Batch billing from a CSV of meter readings.

use crate::billing::{MeterBillingResult, PaperSize, compute_billing, currency};
use crate::config::BillingConfig;
use crate::error::{BillingError, BillingResult};
use crate::input::SizeReading;
use crate::period::BillingPeriod;
use bigdecimal::{BigDecimal, Zero};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::LazyLock;

static EXPECTED_HEADERS: LazyLock<StringRecord> = LazyLock::new(|| {
    StringRecord::from(vec![
        "contract",
        "period",
        "opening_a4",
        "closing_a4",
        "opening_a3",
        "closing_a3",
    ])
});

/// One row of the readings CSV, cells as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReadingRow {
    pub contract: String,
    pub period: String,
    pub opening_a4: String,
    pub closing_a4: String,
    pub opening_a3: String,
    pub closing_a3: String,
    #[serde(skip)]
    pub line: u64,
}

/// Column order of [`BillingRecord`] as written by [`write_records`].
pub const RECORD_HEADERS: [&str; 17] = [
    "contract",
    "period",
    "opening_a4",
    "closing_a4",
    "opening_a3",
    "closing_a3",
    "total_copies_a4",
    "extra_copies_a4",
    "extra_charge_a4",
    "total_copies_a3",
    "extra_copies_a3",
    "extra_charge_a3",
    "base_rent",
    "rent_tax",
    "extra_charge_tax",
    "grand_total",
    "status",
];

/// What gets handed to the billing store for one machine and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingRecord {
    pub contract: String,
    pub period: String,
    pub opening_a4: u64,
    pub closing_a4: u64,
    pub opening_a3: u64,
    pub closing_a3: u64,
    pub total_copies_a4: u64,
    pub extra_copies_a4: u64,
    pub extra_charge_a4: String,
    pub total_copies_a3: u64,
    pub extra_copies_a3: u64,
    pub extra_charge_a3: String,
    pub base_rent: String,
    pub rent_tax: String,
    pub extra_charge_tax: String,
    pub grand_total: String,
    pub status: String,
}

impl BillingRecord {
    fn new(
        contract: &str,
        period: BillingPeriod,
        a4: SizeReading,
        a3: SizeReading,
        result: &MeterBillingResult,
    ) -> Self {
        Self {
            contract: contract.to_string(),
            period: period.id(),
            opening_a4: a4.opening,
            closing_a4: a4.closing,
            opening_a3: a3.opening,
            closing_a3: a3.closing,
            total_copies_a4: result.total_copies_a4(),
            extra_copies_a4: result.extra_copies_a4(),
            extra_charge_a4: currency(result.extra_charge_a4()).to_string(),
            total_copies_a3: result.total_copies_a3(),
            extra_copies_a3: result.extra_copies_a3(),
            extra_charge_a3: currency(result.extra_charge_a3()).to_string(),
            base_rent: currency(&result.base_rent).to_string(),
            rent_tax: currency(&result.rent_tax).to_string(),
            extra_charge_tax: currency(&result.extra_charge_tax).to_string(),
            grand_total: currency(&result.grand_total).to_string(),
            status: status_label(result),
        }
    }
}

fn status_label(result: &MeterBillingResult) -> String {
    let inverted = result.inverted_sizes();
    if inverted.is_empty() {
        return "ok".to_string();
    }
    let sizes: Vec<&str> = inverted
        .iter()
        .map(|size| match size {
            PaperSize::A4 => "a4",
            PaperSize::A3 => "a3",
        })
        .collect();
    format!("inverted_{}", sizes.join("+"))
}

pub fn read_readings<R: Read>(reader: R) -> BillingResult<Vec<ReadingRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if headers != *EXPECTED_HEADERS {
        return Err(BillingError::UnexpectedHeaders {
            found: headers.iter().map(String::from).collect(),
            expected: EXPECTED_HEADERS.iter().map(String::from).collect(),
        });
    }
    csv_reader
        .records()
        .map(|record| {
            let record = record?;
            let line = record.position().map_or(0, |pos| pos.line());
            let mut row: ReadingRow = record
                .deserialize(Some(&headers))
                .map_err(|e| BillingError::from(e).at_line(line))?;
            row.line = line;
            Ok(row)
        })
        .collect()
}

/// Outcome of a batch run: one record per row plus the exact amount billed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRun {
    pub records: Vec<BillingRecord>,
    pub total_billed: BigDecimal,
}

impl BatchRun {
    /// Rows with at least one inverted reading pair.
    pub fn flagged(&self) -> usize {
        self.records.iter().filter(|r| r.status != "ok").count()
    }
}

/// Bills every row in order. A blank opening cell takes the previous closing
/// for the same contract, falling back to the contract's last recorded
/// closing.
pub fn bill_readings(config: &BillingConfig, rows: &[ReadingRow]) -> BillingResult<BatchRun> {
    let mut last_closings: HashMap<&str, (u64, u64)> = HashMap::new();
    let mut records = Vec::with_capacity(rows.len());
    let mut total_billed = BigDecimal::zero();

    for row in rows {
        let contract = config
            .contract(&row.contract)
            .map_err(|e| e.at_line(row.line))?;
        let period: BillingPeriod = row
            .period
            .parse()
            .map_err(|e: BillingError| e.at_line(row.line))?;

        let (prev_a4, prev_a3) = last_closings
            .get(row.contract.as_str())
            .copied()
            .unwrap_or((contract.last_closing_a4, contract.last_closing_a3));
        let a4 = SizeReading::entered(Some(&row.opening_a4), &row.closing_a4, prev_a4);
        let a3 = SizeReading::entered(Some(&row.opening_a3), &row.closing_a3, prev_a3);
        if !contract.supports_a3() && a3 != SizeReading::default() {
            tracing::warn!(
                "Line {}: {} has no A3 terms, ignoring A3 readings",
                row.line,
                row.contract
            );
        }

        let result = compute_billing(&contract.input_for(a4, a3));
        for size in result.inverted_sizes() {
            tracing::warn!(
                "Line {}: {} {} closing reading is below opening reading",
                row.line,
                row.contract,
                size
            );
        }
        tracing::debug!(
            "Billed {} for {}: grand total {}",
            row.contract,
            period,
            currency(&result.grand_total)
        );

        last_closings.insert(row.contract.as_str(), (a4.closing, a3.closing));
        total_billed += &result.grand_total;
        records.push(BillingRecord::new(&row.contract, period, a4, a3, &result));
    }

    Ok(BatchRun {
        records,
        total_billed,
    })
}

/// Writes billing records as CSV. The header row is written even when there
/// are no records.
pub fn write_records<W: Write>(writer: W, records: &[BillingRecord]) -> BillingResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(RECORD_HEADERS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use std::str::FromStr;

    const CONFIG: &str = r#"
[contracts.C-101]
base_rent = "1000"
tax_percent = "18"
last_closing_a4 = 1000
last_closing_a3 = 200
a4 = { included_copies = 400, overage_rate = "0.50" }
a3 = { included_copies = 50, overage_rate = "1.20" }
"#;

    fn rows(csv: &str) -> Vec<ReadingRow> {
        read_readings(csv.as_bytes()).unwrap()
    }

    #[test]
    fn rejects_unexpected_headers() {
        let err = read_readings("machine,period\nC-101,2026-09\n".as_bytes()).unwrap_err();
        assert!(matches!(err, BillingError::UnexpectedHeaders { .. }));
    }

    #[test]
    fn rows_remember_their_line() {
        let rows = rows(
            "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
             C-101,2026-09,1000,1500,200,260\n\
             C-101,2026-10,,1900,,300\n",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].opening_a4, "");
    }

    #[test]
    fn blank_openings_carry_forward() {
        let config = parse_config(CONFIG).unwrap();
        let rows = rows(
            "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
             C-101,2026-09,,1500,,260\n\
             C-101,2026-10,,1900,,300\n",
        );
        let run = bill_readings(&config, &rows).unwrap();
        let records = &run.records;
        assert_eq!(records[0].opening_a4, 1000);
        assert_eq!(records[0].opening_a3, 200);
        assert_eq!(records[0].grand_total, "1253.16");
        assert_eq!(records[1].opening_a4, 1500);
        assert_eq!(records[1].opening_a3, 260);
        assert_eq!(records[1].total_copies_a4, 400);
        assert_eq!(records[1].extra_copies_a4, 0);
        assert_eq!(records[1].period, "2026-10");
        assert_eq!(run.total_billed, BigDecimal::from_str("2433.16").unwrap());
    }

    #[test]
    fn inverted_rows_are_labelled() {
        let config = parse_config(CONFIG).unwrap();
        let rows = rows(
            "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
             C-101,2026-09,1500,1000,260,200\n",
        );
        let run = bill_readings(&config, &rows).unwrap();
        let records = &run.records;
        assert_eq!(run.flagged(), 1);
        assert_eq!(records[0].status, "inverted_a4+a3");
        assert_eq!(records[0].extra_charge_a4, "0.00");
        assert_eq!(records[0].grand_total, "1180.00");
    }

    #[test]
    fn unknown_contract_reports_line() {
        let config = parse_config(CONFIG).unwrap();
        let rows = rows(
            "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
             C-101,2026-09,1000,1500,200,260\n\
             C-404,2026-09,0,10,0,0\n",
        );
        let err = bill_readings(&config, &rows).unwrap_err();
        assert!(matches!(err, BillingError::Row { line: 3, .. }));
    }

    #[test]
    fn writes_header_and_rows() {
        let config = parse_config(CONFIG).unwrap();
        let rows = rows(
            "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
             C-101,2026-09,1000,1500,200,260\n",
        );
        let run = bill_readings(&config, &rows).unwrap();
        let mut out = Vec::new();
        write_records(&mut out, &run.records).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), RECORD_HEADERS.join(","));
        let fields: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(
            fields,
            [
                "C-101", "2026-09", "1000", "1500", "200", "260", "500", "100", "50.00", "60", "10",
                "12.00", "1000.00", "180.00", "11.16", "1253.16", "ok",
            ]
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_run_still_writes_header() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", RECORD_HEADERS.join(",")));
    }

    #[test]
    fn single_size_contract_ignores_a3_cells() {
        let config = parse_config(
            r#"
[contracts.M-1]
base_rent = "500"
tax_percent = "18"
a4 = { included_copies = 100, overage_rate = "0.40" }
"#,
        )
        .unwrap();
        let rows = rows(
            "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
             M-1,2026-09,0,150,0,900\n",
        );
        let run = bill_readings(&config, &rows).unwrap();
        assert_eq!(run.records[0].extra_copies_a3, 0);
        assert_eq!(run.records[0].extra_charge_a3, "0.00");
        // 500 + 90 rent tax + 20 overage + 3.60 overage tax.
        assert_eq!(run.records[0].grand_total, "613.60");
    }
}
