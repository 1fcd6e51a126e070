use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::utils::{first_of_month, last_sunday};

/// A calendar period of the user's history, relative to the local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    LastYear,
}

/// Half-open range `[start, end)` of epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    pub fn contains(&self, epoch: i64) -> bool {
        self.start <= epoch && epoch < self.end
    }
}

impl Timeframe {
    pub fn all() -> [Timeframe; 8] {
        [
            Timeframe::Today,
            Timeframe::Yesterday,
            Timeframe::ThisWeek,
            Timeframe::LastWeek,
            Timeframe::ThisMonth,
            Timeframe::LastMonth,
            Timeframe::ThisYear,
            Timeframe::LastYear,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Today => "today",
            Timeframe::Yesterday => "yesterday",
            Timeframe::ThisWeek => "this week",
            Timeframe::LastWeek => "last week",
            Timeframe::ThisMonth => "this month",
            Timeframe::LastMonth => "last month",
            Timeframe::ThisYear => "this year",
            Timeframe::LastYear => "last year",
        }
    }

    /// First day in and first day after the timeframe, as local dates.
    ///
    /// Weeks start on Sunday.
    pub fn dates(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let day = Duration::days(1);
        let week = Duration::days(7);
        let month = |offset| first_of_month(today, offset).unwrap_or(today);
        let year = |offset: i32| {
            NaiveDate::from_ymd_opt(today.year() + offset, 1, 1).unwrap_or(today)
        };

        match self {
            Timeframe::Today => (today, today + day),
            Timeframe::Yesterday => (today - day, today),
            Timeframe::ThisWeek => {
                let sunday = last_sunday(today);
                (sunday, sunday + week)
            }
            Timeframe::LastWeek => {
                let sunday = last_sunday(today);
                (sunday - week, sunday)
            }
            Timeframe::ThisMonth => (month(0), month(1)),
            Timeframe::LastMonth => (month(-1), month(0)),
            Timeframe::ThisYear => (year(0), year(1)),
            Timeframe::LastYear => (year(-1), year(0)),
        }
    }

    /// Window of the timeframe in the local time zone.
    pub fn window(self, today: NaiveDate) -> Window {
        self.window_in(today, &Local)
    }

    /// Window of the timeframe with day boundaries at midnight in `tz`.
    pub fn window_in<Tz: TimeZone>(self, today: NaiveDate, tz: &Tz) -> Window {
        let (start, end) = self.dates(today);
        Window {
            start: midnight(start, tz),
            end: midnight(end, tz),
        }
    }
}

/// Epoch seconds of midnight on `date` in `tz`. Falls back to UTC midnight
/// when a DST transition skips local midnight.
fn midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive).timestamp())
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Accepts labels in any case with spaces, dashes or underscores:
    /// `this week`, `this-week`, `THIS_WEEK`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        Timeframe::all()
            .into_iter()
            .find(|timeframe| timeframe.label() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = Timeframe::all().iter().map(|t| t.label()).collect();
                format!("unknown timeframe '{}', expected one of: {}", s, valid.join(", "))
            })
    }
}
