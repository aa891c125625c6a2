use crate::input::{MeterReadingInput, SizeReading};
use bigdecimal::{BigDecimal, RoundingMode, Zero};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperSize {
    A4,
    A3,
}

impl PaperSize {
    pub const ALL: [PaperSize; 2] = [PaperSize::A4, PaperSize::A3];
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::A4 => f.write_str("A4"),
            PaperSize::A3 => f.write_str("A3"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingStatus {
    Valid,
    /// Closing counter below opening; copies and charges read as zero.
    Inverted,
}

/// Usage and overage for one paper size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeUsage {
    pub status: ReadingStatus,
    pub total_copies: u64,
    pub extra_copies: u64,
    pub extra_charge: BigDecimal,
}

impl SizeUsage {
    fn compute(reading: SizeReading, included: u64, rate: &BigDecimal) -> Self {
        let (status, total_copies) = match reading.copies() {
            Some(copies) => (ReadingStatus::Valid, copies),
            None => (ReadingStatus::Inverted, 0),
        };
        let extra_copies = total_copies.saturating_sub(included);
        Self {
            status,
            total_copies,
            extra_copies,
            extra_charge: BigDecimal::from(extra_copies) * rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeterBillingResult {
    pub a4: SizeUsage,
    pub a3: SizeUsage,
    pub base_rent: BigDecimal,
    pub rent_tax: BigDecimal,
    pub extra_charge_tax: BigDecimal,
    pub grand_total: BigDecimal,
}

impl MeterBillingResult {
    pub fn usage(&self, size: PaperSize) -> &SizeUsage {
        match size {
            PaperSize::A4 => &self.a4,
            PaperSize::A3 => &self.a3,
        }
    }

    pub fn status(&self, size: PaperSize) -> ReadingStatus {
        self.usage(size).status
    }

    pub fn inverted_sizes(&self) -> Vec<PaperSize> {
        PaperSize::ALL
            .into_iter()
            .filter(|size| self.status(*size) == ReadingStatus::Inverted)
            .collect()
    }

    pub fn is_computable(&self) -> bool {
        self.inverted_sizes().is_empty()
    }

    pub fn total_copies_a4(&self) -> u64 {
        self.a4.total_copies
    }

    pub fn extra_copies_a4(&self) -> u64 {
        self.a4.extra_copies
    }

    pub fn extra_charge_a4(&self) -> &BigDecimal {
        &self.a4.extra_charge
    }

    pub fn total_copies_a3(&self) -> u64 {
        self.a3.total_copies
    }

    pub fn extra_copies_a3(&self) -> u64 {
        self.a3.extra_copies
    }

    pub fn extra_charge_a3(&self) -> &BigDecimal {
        &self.a3.extra_charge
    }

    pub fn total_tax(&self) -> BigDecimal {
        &self.rent_tax + &self.extra_charge_tax
    }
}

/// Derives copies, overage charges, tax and the amount due for one period.
///
/// Overage for both sizes is summed before tax is applied to it, and the tax
/// is added once. An inverted reading pair bills nothing for that size.
pub fn compute_billing(input: &MeterReadingInput) -> MeterBillingResult {
    let a4 = SizeUsage::compute(input.a4, input.included_copies_a4, &input.overage_rate_a4);
    let a3 = SizeUsage::compute(input.a3, input.included_copies_a3, &input.overage_rate_a3);

    let rent_tax = percent_of(&input.base_rent, &input.tax_percent);
    let extra_charges = &a4.extra_charge + &a3.extra_charge;
    let extra_charge_tax = percent_of(&extra_charges, &input.tax_percent);
    let grand_total = &input.base_rent + &rent_tax + &extra_charges + &extra_charge_tax;

    MeterBillingResult {
        a4,
        a3,
        base_rent: input.base_rent.clone(),
        rent_tax,
        extra_charge_tax,
        grand_total,
    }
}

fn percent_of(amount: &BigDecimal, percent: &BigDecimal) -> BigDecimal {
    if amount.is_zero() || percent.is_zero() {
        return BigDecimal::zero();
    }
    amount * percent / BigDecimal::from(100)
}

/// Rounds to paise/cents for display, half away from zero.
pub fn currency(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}
