use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        if end < start {
            return Err(LedgerError::Validation(
                "window end must not be before start".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Report periods offered by the reports screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    #[default]
    All,
    Today,
    /// Sunday through today.
    ThisWeek,
    Last7Days,
    /// Whole calendar month containing today.
    ThisMonth,
    Last30Days,
    Custom {
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl Timeframe {
    /// Resolves the timeframe against `today`. `All` has no bounds.
    pub fn window(&self, today: NaiveDate) -> Result<Option<DateWindow>, LedgerError> {
        let window = match *self {
            Timeframe::All => return Ok(None),
            Timeframe::Today => DateWindow::single_day(today),
            Timeframe::ThisWeek => {
                let offset = today.weekday().num_days_from_sunday() as i64;
                DateWindow::new(today - Duration::days(offset), today)?
            }
            Timeframe::Last7Days => DateWindow::new(today - Duration::days(6), today)?,
            Timeframe::ThisMonth => month_window(today)?,
            Timeframe::Last30Days => DateWindow::new(today - Duration::days(29), today)?,
            Timeframe::Custom { start, end } => DateWindow::new(start, end)?,
        };
        Ok(Some(window))
    }
}

fn month_window(today: NaiveDate) -> Result<DateWindow, LedgerError> {
    let start = today
        .with_day(1)
        .ok_or_else(|| LedgerError::InvalidDate(today.to_string()))?;
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .ok_or_else(|| LedgerError::InvalidDate(today.to_string()))?;
    DateWindow::new(start, end)
}
