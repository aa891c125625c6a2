//! Meter-reading billing for annual maintenance contracts on copiers and
//! printers.
//!
//! [`billing::compute_billing`] turns opening/closing meter readings and a
//! contract's allowance, overage rates, rent and tax into the amount due for a
//! period. It is pure and total: half-entered or inverted readings degrade to
//! zero-valued charges instead of failing. The other modules wrap it with
//! contract terms, billing periods and a CSV batch run.

pub mod batch;
pub mod billing;
pub mod config;
pub mod contract;
pub mod error;
pub mod input;
pub mod period;
pub mod report;

pub use billing::{MeterBillingResult, PaperSize, ReadingStatus, compute_billing};
pub use error::{BillingError, BillingResult};
pub use input::{MeterReadingInput, RawMeterReadingInput, SizeReading};
