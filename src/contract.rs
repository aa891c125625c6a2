use crate::input::{MeterReadingInput, SizeReading};
use bigdecimal::{BigDecimal, Zero};
use serde::Deserialize;

/// Free allowance and overage rate for one paper size.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SizeTerms {
    #[serde(default)]
    pub included_copies: u64,
    pub overage_rate: BigDecimal,
}

/// Whether GST on the invoice is levied within one state or across states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxMode {
    #[default]
    Intra,
    Inter,
}

/// GST breakdown of a tax amount. CGST and SGST each take half of an
/// intra-state levy; an inter-state levy is all IGST.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxSplit {
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
    pub igst: BigDecimal,
}

impl TaxSplit {
    pub fn new(mode: TaxMode, total_tax: &BigDecimal) -> Self {
        match mode {
            TaxMode::Intra => {
                let half = total_tax / BigDecimal::from(2);
                Self {
                    cgst: half.clone(),
                    sgst: half,
                    igst: BigDecimal::zero(),
                }
            }
            TaxMode::Inter => Self {
                cgst: BigDecimal::zero(),
                sgst: BigDecimal::zero(),
                igst: total_tax.clone(),
            },
        }
    }
}

/// An annual maintenance contract on one machine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AmcContract {
    #[serde(default)]
    pub machine: String,
    pub base_rent: BigDecimal,
    pub tax_percent: BigDecimal,
    #[serde(default)]
    pub tax_mode: TaxMode,
    pub a4: SizeTerms,
    /// `None` for single-size machines.
    #[serde(default)]
    pub a3: Option<SizeTerms>,
    #[serde(default)]
    pub last_closing_a4: u64,
    #[serde(default)]
    pub last_closing_a3: u64,
}

impl AmcContract {
    pub fn supports_a3(&self) -> bool {
        self.a3.is_some()
    }

    /// Builds calculator input from this contract's terms. A3 readings are
    /// dropped for single-size machines.
    pub fn input_for(&self, a4: SizeReading, a3: SizeReading) -> MeterReadingInput {
        let (a3, a3_terms) = match &self.a3 {
            Some(terms) => (a3, terms.clone()),
            None => (SizeReading::default(), SizeTerms::default()),
        };
        MeterReadingInput {
            a4,
            a3,
            included_copies_a4: self.a4.included_copies,
            included_copies_a3: a3_terms.included_copies,
            overage_rate_a4: self.a4.overage_rate.clone(),
            overage_rate_a3: a3_terms.overage_rate,
            base_rent: self.base_rent.clone(),
            tax_percent: self.tax_percent.clone(),
        }
    }

    pub fn tax_split(&self, total_tax: &BigDecimal) -> TaxSplit {
        TaxSplit::new(self.tax_mode, total_tax)
    }
}
