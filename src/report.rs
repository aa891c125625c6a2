use crate::billing::{MeterBillingResult, PaperSize, ReadingStatus, currency};
use crate::contract::TaxSplit;
use std::fmt::Write;

/// Multi-line summary of a billing result for the terminal.
pub fn render(result: &MeterBillingResult, split: Option<&TaxSplit>) -> String {
    let mut out = String::new();
    for size in PaperSize::ALL {
        let usage = result.usage(size);
        if usage.status == ReadingStatus::Inverted {
            let _ = writeln!(
                out,
                "{size}: closing reading is below opening reading, not computable"
            );
            continue;
        }
        let _ = writeln!(
            out,
            "{size}: {} copies, {} extra, extra charge {}",
            usage.total_copies,
            usage.extra_copies,
            currency(&usage.extra_charge)
        );
    }
    let _ = writeln!(out, "Rent: {}", currency(&result.base_rent));
    let _ = writeln!(out, "Rent tax: {}", currency(&result.rent_tax));
    let _ = writeln!(out, "Extra charge tax: {}", currency(&result.extra_charge_tax));
    if let Some(split) = split {
        let _ = writeln!(
            out,
            "  CGST {} / SGST {} / IGST {}",
            currency(&split.cgst),
            currency(&split.sgst),
            currency(&split.igst)
        );
    }
    let _ = write!(out, "Grand total: {}", currency(&result.grand_total));
    out
}
