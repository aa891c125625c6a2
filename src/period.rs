use crate::error::BillingError;
use jiff::ToSpan;
use jiff::civil::Date;
use std::fmt;
use std::str::FromStr;

/// A calendar-month billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillingPeriod {
    start: Date,
}

impl BillingPeriod {
    pub fn containing(date: Date) -> Self {
        Self {
            start: date.first_of_month(),
        }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.start.last_of_month()
    }

    /// The period following this one, or `None` past the end of the calendar.
    pub fn next(&self) -> Option<Self> {
        self.start.checked_add(1.month()).ok().map(Self::containing)
    }

    /// `YYYY-MM`, used as the period identifier on billing records.
    pub fn id(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl FromStr for BillingPeriod {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| BillingError::InvalidPeriod {
            value: s.to_string(),
            reason,
        };
        // Bare `YYYY-MM` is completed to the first of the month.
        let date = if s.len() == 7 {
            Date::from_str(&format!("{s}-01"))
        } else {
            Date::from_str(s)
        };
        date.map(Self::containing).map_err(|e| invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn parses_month_and_full_date() {
        let month: BillingPeriod = "2026-09".parse().unwrap();
        let day: BillingPeriod = "2026-09-17".parse().unwrap();
        assert_eq!(month, day);
        assert_eq!(month.start(), date(2026, 9, 1));
        assert_eq!(month.end(), date(2026, 9, 30));
        assert_eq!(month.id(), "2026-09");
    }

    #[test]
    fn rejects_garbage() {
        assert!("September".parse::<BillingPeriod>().is_err());
        assert!("2026-13".parse::<BillingPeriod>().is_err());
        assert!("".parse::<BillingPeriod>().is_err());
    }

    #[test]
    fn next_rolls_over_year_end() {
        let december: BillingPeriod = "2026-12".parse().unwrap();
        let january = december.next().unwrap();
        assert_eq!(january.id(), "2027-01");
        assert_eq!(january.end(), date(2027, 1, 31));
    }

    #[test]
    fn february_end_tracks_leap_years() {
        let feb: BillingPeriod = "2028-02".parse().unwrap();
        assert_eq!(feb.end(), date(2028, 2, 29));
    }
}
