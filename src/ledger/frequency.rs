use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// How often a recurring rule comes due.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// Returns the occurrence that follows `from`.
    ///
    /// Monthly and yearly steps keep the day of month when the target month has it
    /// and clamp to the target month's last day otherwise, so Jan 31 becomes Feb 28
    /// (or Feb 29 in a leap year). Dates carry no time of day, so DST transitions
    /// cannot move the result. Saturates at [`NaiveDate::MAX`].
    pub fn advance(self, from: NaiveDate) -> NaiveDate {
        let next = match self {
            Frequency::Daily => from.checked_add_signed(Duration::days(1)),
            Frequency::Weekly => from.checked_add_signed(Duration::weeks(1)),
            Frequency::Monthly => shift_month(from, 1),
            Frequency::Yearly => shift_year(from, 1),
        };
        next.unwrap_or(NaiveDate::MAX)
    }

    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|frequency| frequency.as_str() == normalized)
            .ok_or_else(|| LedgerError::Validation(format!("unknown frequency `{value}`")))
    }
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32)?);
    NaiveDate::from_ymd_opt(year, month as u32, day)
}

fn shift_year(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    let month = date.month();
    let day = date.day().min(days_in_month(year, month)?);
    NaiveDate::from_ymd_opt(year, month, day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => first_next.pred_opt().map(|last| last.day()),
        // December of the last representable year.
        None => NaiveDate::from_ymd_opt(year, month, 31).map(|_| 31),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_and_weekly_add_fixed_days() {
        assert_eq!(Frequency::Daily.advance(date(2024, 12, 31)), date(2025, 1, 1));
        assert_eq!(Frequency::Weekly.advance(date(2024, 2, 26)), date(2024, 3, 4));
    }

    #[test]
    fn monthly_clamps_to_last_day_of_target_month() {
        assert_eq!(Frequency::Monthly.advance(date(2024, 1, 31)), date(2024, 2, 29));
        assert_eq!(Frequency::Monthly.advance(date(2023, 1, 31)), date(2023, 2, 28));
        assert_eq!(Frequency::Monthly.advance(date(2024, 3, 31)), date(2024, 4, 30));
        assert_eq!(Frequency::Monthly.advance(date(2024, 12, 15)), date(2025, 1, 15));
    }

    #[test]
    fn yearly_clamps_leap_day() {
        assert_eq!(Frequency::Yearly.advance(date(2024, 2, 29)), date(2025, 2, 28));
        assert_eq!(Frequency::Yearly.advance(date(2023, 3, 1)), date(2024, 3, 1));
    }

    #[test]
    fn clamped_dates_do_not_recover_their_day() {
        let feb = Frequency::Monthly.advance(date(2023, 1, 31));
        assert_eq!(Frequency::Monthly.advance(feb), date(2023, 3, 28));
    }

    #[test]
    fn advance_is_strictly_increasing() {
        let mut current = date(2023, 11, 30);
        for frequency in Frequency::ALL {
            for _ in 0..40 {
                let next = frequency.advance(current);
                assert!(next > current, "{frequency} did not move past {current}");
                current = next;
            }
        }
    }

    #[test]
    fn advance_saturates_at_max_date() {
        assert_eq!(Frequency::Daily.advance(NaiveDate::MAX), NaiveDate::MAX);
        assert_eq!(Frequency::Yearly.advance(NaiveDate::MAX), NaiveDate::MAX);
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!(" Weekly ".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!("fortnightly".parse::<Frequency>().is_err());
        assert_eq!(Frequency::Yearly.label(), "Yearly");
    }
}
