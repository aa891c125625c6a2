use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use std::str::FromStr;

/// Opening and closing counter values for one paper size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeReading {
    pub opening: u64,
    pub closing: u64,
}

impl SizeReading {
    pub fn new(opening: u64, closing: u64) -> Self {
        Self { opening, closing }
    }

    /// Reading from entered fields. A missing or blank opening carries the
    /// previous period's closing forward.
    pub fn entered(opening: Option<&str>, closing: &str, carried: u64) -> Self {
        let opening = match opening.map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_count(raw),
            _ => carried,
        };
        Self::new(opening, parse_count(closing))
    }

    /// `None` when the closing counter is below the opening one.
    pub fn copies(&self) -> Option<u64> {
        self.closing.checked_sub(self.opening)
    }
}

/// Typed input for one billing period of one machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterReadingInput {
    pub a4: SizeReading,
    pub a3: SizeReading,
    pub included_copies_a4: u64,
    pub included_copies_a3: u64,
    pub overage_rate_a4: BigDecimal,
    pub overage_rate_a3: BigDecimal,
    pub base_rent: BigDecimal,
    pub tax_percent: BigDecimal,
}

/// Input exactly as typed, before any coercion. Any field may be empty or
/// half-entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMeterReadingInput {
    pub opening_a4: String,
    pub closing_a4: String,
    pub opening_a3: String,
    pub closing_a3: String,
    pub included_copies_a4: String,
    pub included_copies_a3: String,
    pub overage_rate_a4: String,
    pub overage_rate_a3: String,
    pub base_rent: String,
    pub tax_percent: String,
}

impl RawMeterReadingInput {
    pub fn coerce(&self) -> MeterReadingInput {
        MeterReadingInput {
            a4: SizeReading::new(parse_count(&self.opening_a4), parse_count(&self.closing_a4)),
            a3: SizeReading::new(parse_count(&self.opening_a3), parse_count(&self.closing_a3)),
            included_copies_a4: parse_count(&self.included_copies_a4),
            included_copies_a3: parse_count(&self.included_copies_a3),
            overage_rate_a4: parse_amount(&self.overage_rate_a4),
            overage_rate_a3: parse_amount(&self.overage_rate_a3),
            base_rent: parse_amount(&self.base_rent),
            tax_percent: parse_amount(&self.tax_percent),
        }
    }
}

/// Most decimal places or whole-number digits an entered value may carry.
/// Exponent notation such as `1e99999999` would otherwise expand into a huge
/// exact integer on the first comparison or multiplication.
const MAX_PLACES: i64 = 20;

/// Significant digits an entered value may carry.
const MAX_DIGITS: u64 = 40;

/// Parses a non-negative decimal of bounded size. Checks only the digit count
/// and exponent before any arithmetic touches the value.
fn parse_bounded(raw: &str) -> Option<BigDecimal> {
    let value = BigDecimal::from_str(raw.trim()).ok()?;
    let digits = value.digits();
    if digits > MAX_DIGITS {
        return None;
    }
    let (_, scale) = value.as_bigint_and_exponent();
    if !(-MAX_PLACES..=MAX_PLACES).contains(&scale) || digits as i64 - scale > MAX_PLACES {
        return None;
    }
    (value >= BigDecimal::zero()).then_some(value)
}

/// Parses a counter or copy count. Anything that isn't a non-negative number
/// reads as 0; fractions are truncated.
pub fn parse_count(raw: &str) -> u64 {
    if let Ok(count) = raw.trim().parse::<u64>() {
        return count;
    }
    parse_bounded(raw)
        .filter(|value| *value <= BigDecimal::from(u64::MAX))
        .and_then(|value| value.with_scale(0).to_u64())
        .unwrap_or(0)
}

/// Parses a rate or currency amount. Anything that isn't a non-negative
/// number of sane size reads as 0.
pub fn parse_amount(raw: &str) -> BigDecimal {
    parse_bounded(raw).unwrap_or_else(BigDecimal::zero)
}
