use amcmeter::batch::{bill_readings, read_readings, write_records};
use amcmeter::billing::{compute_billing, currency};
use amcmeter::config::load_config;
use amcmeter::period::BillingPeriod;
use amcmeter::report::render;
use amcmeter::{BillingResult, RawMeterReadingInput, SizeReading};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Meter-reading billing for copier/printer maintenance contracts.
/// Works out copies made, overage beyond the contract allowance, GST and the
/// amount due for a billing period.
#[derive(Parser, Debug)]
#[command(version, long_about)]
struct Amcmeter {
    /// Log every computed bill.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Contract terms file. Defaults to `amcmeter.toml` in the current directory.
    #[arg(short, long, global = true, env = "AMCMETER_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bill one period from values given on the command line. Blank or
    /// unparseable values count as zero.
    Compute(ComputeArgs),
    /// Bill one period of a contract from the config file.
    Bill(BillArgs),
    /// Bill every row of a readings CSV and write billing records as CSV.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct ComputeArgs {
    #[arg(long, default_value = "")]
    opening_a4: String,
    #[arg(long, default_value = "")]
    closing_a4: String,
    #[arg(long, default_value = "")]
    opening_a3: String,
    #[arg(long, default_value = "")]
    closing_a3: String,
    /// Free A4 copies per period.
    #[arg(long, default_value = "")]
    included_a4: String,
    /// Free A3 copies per period.
    #[arg(long, default_value = "")]
    included_a3: String,
    /// Charge per A4 copy beyond the allowance.
    #[arg(long, default_value = "")]
    rate_a4: String,
    /// Charge per A3 copy beyond the allowance.
    #[arg(long, default_value = "")]
    rate_a3: String,
    #[arg(long, default_value = "")]
    base_rent: String,
    /// Tax percentage, e.g. 18 for 18% GST.
    #[arg(long, default_value = "")]
    tax_percent: String,
}

#[derive(Args, Debug)]
struct BillArgs {
    /// Contract id as it appears in the config file.
    #[arg(long)]
    contract: String,
    /// Billing month, `YYYY-MM`.
    #[arg(long)]
    period: Option<BillingPeriod>,
    /// Defaults to the contract's last recorded A4 closing.
    #[arg(long)]
    opening_a4: Option<String>,
    #[arg(long)]
    closing_a4: String,
    /// Defaults to the contract's last recorded A3 closing.
    #[arg(long)]
    opening_a3: Option<String>,
    #[arg(long, default_value = "")]
    closing_a3: String,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// CSV with columns contract,period,opening_a4,closing_a4,opening_a3,closing_a3.
    #[arg(long)]
    readings: PathBuf,
    /// Where to write billing records. Standard output when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Amcmeter::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Amcmeter) -> BillingResult<()> {
    match args.command {
        Command::Compute(compute) => {
            let raw = RawMeterReadingInput {
                opening_a4: compute.opening_a4,
                closing_a4: compute.closing_a4,
                opening_a3: compute.opening_a3,
                closing_a3: compute.closing_a3,
                included_copies_a4: compute.included_a4,
                included_copies_a3: compute.included_a3,
                overage_rate_a4: compute.rate_a4,
                overage_rate_a3: compute.rate_a3,
                base_rent: compute.base_rent,
                tax_percent: compute.tax_percent,
            };
            let result = compute_billing(&raw.coerce());
            println!("{}", render(&result, None));
        }
        Command::Bill(bill) => {
            let config = load_config(args.config.as_deref())?;
            let contract = config.contract(&bill.contract)?;
            let a4 = SizeReading::entered(
                bill.opening_a4.as_deref(),
                &bill.closing_a4,
                contract.last_closing_a4,
            );
            let a3 = SizeReading::entered(
                bill.opening_a3.as_deref(),
                &bill.closing_a3,
                contract.last_closing_a3,
            );
            if !contract.supports_a3() && a3 != SizeReading::default() {
                tracing::warn!("{} has no A3 terms, ignoring A3 readings", bill.contract);
            }
            let result = compute_billing(&contract.input_for(a4, a3));
            if let Some(period) = bill.period {
                println!(
                    "{} ({}), {} to {}",
                    bill.contract,
                    contract.machine,
                    period.start(),
                    period.end()
                );
            }
            let split = contract.tax_split(&result.total_tax());
            println!("{}", render(&result, Some(&split)));
            if let Some(period) = bill.period.and_then(|p| p.next()) {
                tracing::info!(
                    "Next period {} opens at A4 {} / A3 {}",
                    period,
                    a4.closing,
                    a3.closing
                );
            }
        }
        Command::Batch(batch) => {
            let config = load_config(args.config.as_deref())?;
            let rows = read_readings(BufReader::new(File::open(&batch.readings)?))?;
            tracing::info!("Found {} reading rows", rows.len());
            let run = bill_readings(&config, &rows)?;
            let flagged = run.flagged();
            if flagged > 0 {
                tracing::warn!(
                    "{} rows have inverted readings, billed as zero usage for that size",
                    flagged
                );
            }
            match &batch.output {
                Some(path) => write_records(BufWriter::new(File::create(path)?), &run.records)?,
                None => write_records(io::stdout().lock(), &run.records)?,
            }
            tracing::info!("Total billed: {}", currency(&run.total_billed));
        }
    }
    Ok(())
}
