use amcmeter::BillingError;
use amcmeter::batch::{bill_readings, read_readings, write_records};
use amcmeter::config::load_config;
use bigdecimal::{BigDecimal, Zero};
use std::fs::{self, File};
use std::io::BufReader;
use std::str::FromStr;

const CONFIG: &str = r#"
[contracts.C-101]
machine = "Canon IR 2520"
base_rent = "1000"
tax_percent = "18"
last_closing_a4 = 1000
last_closing_a3 = 200
a4 = { included_copies = 400, overage_rate = "0.50" }
a3 = { included_copies = 50, overage_rate = "1.20" }

[contracts.C-102]
machine = "Kyocera 2040"
base_rent = "750"
tax_percent = "18"
tax_mode = "inter"
last_closing_a4 = 20000
a4 = { included_copies = 1000, overage_rate = "0.35" }
"#;

const READINGS: &str = "\
contract,period,opening_a4,closing_a4,opening_a3,closing_a3
C-101,2026-09,,1500,,260
C-102,2026-09,,21200,,
C-101,2026-10,,1900,,300
";

#[test]
fn batch_run_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("amcmeter.toml");
    let readings_path = dir.path().join("readings.csv");
    let output_path = dir.path().join("bills.csv");
    fs::write(&config_path, CONFIG).unwrap();
    fs::write(&readings_path, READINGS).unwrap();

    let config = load_config(Some(&config_path)).unwrap();
    let rows = read_readings(BufReader::new(File::open(&readings_path).unwrap())).unwrap();
    let run = bill_readings(&config, &rows).unwrap();
    assert_eq!(run.flagged(), 0);
    assert_eq!(run.total_billed, BigDecimal::from_str("3400.76").unwrap());
    write_records(File::create(&output_path).unwrap(), &run.records).unwrap();

    let written = fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "C-101,2026-09,1000,1500,200,260,500,100,50.00,60,10,12.00,\
         1000.00,180.00,11.16,1253.16,ok"
    );
    // 200 extra A4 copies at 0.35 = 70.00, taxed at 18% = 12.60.
    assert_eq!(
        lines[2],
        "C-102,2026-09,20000,21200,0,0,1200,200,70.00,0,0,0.00,\
         750.00,135.00,12.60,967.60,ok"
    );
    // October opens where September closed; usage stays within the allowance.
    assert_eq!(
        lines[3],
        "C-101,2026-10,1500,1900,260,300,400,0,0.00,40,0,0.00,\
         1000.00,180.00,0.00,1180.00,ok"
    );
}

#[test]
fn empty_readings_file_gives_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("bills.csv");
    let config = amcmeter::config::parse_config(CONFIG).unwrap();
    let rows = read_readings(
        "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n".as_bytes(),
    )
    .unwrap();
    let run = bill_readings(&config, &rows).unwrap();
    assert!(run.total_billed.is_zero());
    write_records(File::create(&output_path).unwrap(), &run.records).unwrap();

    let written = fs::read_to_string(&output_path).unwrap();
    assert!(written.starts_with("contract,period,opening_a4,closing_a4,"));
    assert!(written.trim_end().ends_with(",grand_total,status"));
    assert_eq!(written.lines().count(), 1);
}

#[test]
fn bad_period_names_the_line() {
    let config = amcmeter::config::parse_config(CONFIG).unwrap();
    let rows = read_readings(
        "contract,period,opening_a4,closing_a4,opening_a3,closing_a3\n\
         C-101,Sept,1000,1500,200,260\n"
            .as_bytes(),
    )
    .unwrap();
    match bill_readings(&config, &rows) {
        Err(BillingError::Row { line, source }) => {
            assert_eq!(line, 2);
            assert!(matches!(*source, BillingError::InvalidPeriod { .. }));
        }
        other => panic!("expected a row error, got {other:?}"),
    }
}
