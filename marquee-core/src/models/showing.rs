//! Showing row and showtime models

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use sqlx::mysql::MySqlRow;
use sqlx::Row;
use std::fmt;

/// Date rendering used everywhere a showtime is displayed (`10/01/24`)
const DATE_FORMAT: &str = "%m/%d/%y";

/// Time rendering used everywhere a showtime is displayed (`7:00 PM`)
const TIME_FORMAT: &str = "%-I:%M %p";

/// One flat query result row: a scheduled screening of a movie
///
/// Rows arrive from the store ordered by title, then by screening start.
/// The grouping fold relies on that ordering; it is checked, not assumed,
/// before grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowtimeRow {
    /// Movie title (non-empty)
    pub title: String,
    /// Calendar date of the screening
    pub show_date: NaiveDate,
    /// Start time of the screening
    pub show_time: NaiveTime,
}

impl<'r> sqlx::FromRow<'r, MySqlRow> for ShowtimeRow {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            title: row.try_get("title")?,
            show_date: row.try_get("show_date")?,
            show_time: row.try_get("show_time")?,
        })
    }
}

/// One `(date, time)` pair inside a title group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Showtime {
    /// Calendar date of the screening
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    /// Start time of the screening
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveTime,
}

impl Showtime {
    /// Creates a showtime from its date and time
    #[must_use]
    pub const fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Renders the date as `mm/dd/yy`
    #[must_use]
    pub fn formatted_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Renders the time as `hh:mm AM/PM`
    #[must_use]
    pub fn formatted_time(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

impl fmt::Display for Showtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}",
            self.date.format(DATE_FORMAT),
            self.time.format(TIME_FORMAT)
        )
    }
}

fn serialize_date<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&date.format(DATE_FORMAT))
}

fn serialize_time<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&time.format(TIME_FORMAT))
}
