//! A calendar month (`YYYY-MM`) and the date arithmetic built on it.
//!
//! Months bound every dashboard query: transactions are fetched for the
//! inclusive range [first day, last day], budgets are keyed by the month
//! string, and cache keys embed the `YYYY-MM` form.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, OffsetDateTime};

use crate::Error;

/// A year and month pair, e.g. `2024-03`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    // 1-12, validated on construction.
    month: u8,
}

impl Month {
    /// Create a month from a year and a 1-based month number.
    pub fn new(year: i32, month: u8) -> Result<Month, Error> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(Error::InvalidMonth(format!("{year:04}-{month:02}")));
        }

        Ok(Month { year, month })
    }

    /// The month that `date` falls in.
    pub fn containing(date: Date) -> Month {
        Month {
            year: date.year(),
            month: date.month() as u8,
        }
    }

    /// The current calendar month (UTC).
    pub fn current() -> Month {
        Month::containing(OffsetDateTime::now_utc().date())
    }

    /// The first day of the month.
    pub fn first_day(self) -> Date {
        Date::from_calendar_date(self.year, self.time_month(), 1)
            .expect("a validated month always has a first day")
    }

    /// The last day of the month.
    pub fn last_day(self) -> Date {
        let last = self.time_month().length(self.year);

        Date::from_calendar_date(self.year, self.time_month(), last)
            .expect("a validated month always has a last day")
    }

    /// The month immediately before this one.
    pub fn pred(self) -> Month {
        if self.month == 1 {
            Month {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Month {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The trailing `n` months ending at (and including) this one, oldest
    /// first.
    pub fn trailing(self, n: usize) -> Vec<Month> {
        let mut months = Vec::with_capacity(n);
        let mut month = self;

        for _ in 0..n {
            months.push(month);
            month = month.pred();
        }

        months.reverse();
        months
    }

    /// A short display label, e.g. "Mar 2024".
    pub fn label(self) -> String {
        format!("{} {}", &MONTH_NAMES[self.month as usize - 1][..3], self.year)
    }

    /// A full display label, e.g. "March 2024".
    pub fn full_label(self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize - 1], self.year)
    }

    fn time_month(self) -> time::Month {
        time::Month::try_from(self.month).expect("month is validated to 1..=12")
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidMonth(text.to_owned());

        let (year_text, month_text) = text.split_once('-').ok_or_else(invalid)?;

        if year_text.len() != 4 || month_text.len() != 2 {
            return Err(invalid());
        }

        let year: i32 = year_text.parse().map_err(|_| invalid())?;
        let month: u8 = month_text.parse().map_err(|_| invalid())?;

        Month::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(serde::de::Error::custom)
    }
}
