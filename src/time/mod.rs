//! Time module for the TDB clock driving trajectory playback
//!
//! Horizons tables are keyed in Barycentric Dynamical Time (TDB). The viewer
//! only needs millisecond accuracy, so UTC is shifted by a fixed offset
//! ([`TDB_MINUS_UTC_MS`]) instead of consulting a leap second table. This is
//! a documented approximation valid from 2017 onwards.

use crate::constants::{DAY_MS, TDB_MINUS_UTC_MS};
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use std::fmt;

/// Julian date of the Unix epoch, in milliseconds
const UNIX_EPOCH_JD_MS: i64 = 210_866_760_000_000;

/// A TDB instant stored as whole milliseconds since Julian date 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TdbTime {
    millis: i64,
}

/// Calendar breakdown of a TDB instant
#[derive(Debug, Clone, PartialEq)]
pub struct TdbCalendar {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// Minutes elapsed since 00:00 of `day`
    pub minute_of_day: u32,
    /// Seconds within the minute, including the millisecond fraction
    pub seconds: f64,
}

impl TdbTime {
    /// Convert a UTC instant to TDB
    pub fn from_utc(utc: DateTime<Utc>) -> Self {
        Self {
            millis: utc.timestamp_millis() + TDB_MINUS_UTC_MS + UNIX_EPOCH_JD_MS,
        }
    }

    /// Read the wall clock and convert it to TDB
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Seconds since Julian date 0, the live animation clock
    pub fn seconds(&self) -> f64 {
        self.millis as f64 / 1000.0
    }

    /// Fractional Julian date, the same scale as the `JDTDB` column
    pub fn jd(&self) -> f64 {
        self.millis as f64 / DAY_MS as f64
    }

    /// TDB reading expressed with chrono's civil calendar
    fn as_datetime(&self) -> DateTime<Utc> {
        // Only clocks tens of thousands of years off fall outside chrono's range
        DateTime::from_timestamp_millis(self.millis - UNIX_EPOCH_JD_MS).unwrap_or_default()
    }

    /// Break the instant down into calendar fields
    pub fn calendar(&self) -> TdbCalendar {
        let dt = self.as_datetime();
        TdbCalendar {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            minute_of_day: dt.hour() * 60 + dt.minute(),
            seconds: dt.second() as f64 + self.millis.rem_euclid(1000) as f64 / 1000.0,
        }
    }
}

impl fmt::Display for TdbTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} TDB",
            self.as_datetime().format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

impl From<DateTime<Utc>> for TdbTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

/// One calendar month of TDB time; the unit of caching and querying
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl MonthKey {
    /// Create a month key, normalizing out-of-range months into the year
    pub fn new(year: i32, month: u32) -> Self {
        Self::normalize(year, month as i64)
    }

    fn normalize(year: i32, month: i64) -> Self {
        let zero_based = month - 1;
        Self {
            year: year + zero_based.div_euclid(12) as i32,
            month: zero_based.rem_euclid(12) as u32 + 1,
        }
    }

    /// The month the given instant falls in
    pub fn containing(time: TdbTime) -> Self {
        let cal = time.calendar();
        Self {
            year: cal.year,
            month: cal.month,
        }
    }

    /// Shift by a (possibly negative) number of months
    pub fn offset(&self, months: i32) -> Self {
        Self::normalize(self.year, self.month as i64 + months as i64)
    }

    /// The following month
    pub fn next(&self) -> Self {
        self.offset(1)
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// 00:00 TDB on the first day of the month
    pub fn start(&self) -> TdbTime {
        let start = self.first_day().and_hms_opt(0, 0, 0).unwrap_or_default();
        TdbTime {
            millis: start.and_utc().timestamp_millis() + UNIX_EPOCH_JD_MS,
        }
    }

    /// Name of the cache directory holding this month, e.g. `2025_3`
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.year, self.month)
    }

    /// The query window for this month: its first day up to the first day of the next
    pub fn query_window(&self) -> QueryWindow {
        QueryWindow {
            start: self.first_day(),
            stop: self.next().first_day(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Start and stop dates of one Horizons request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub stop: NaiveDate,
}

impl QueryWindow {
    /// Start date as `YYYY-MM-DD`
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// Stop date as `YYYY-MM-DD`
    pub fn stop_str(&self) -> String {
        self.stop.format("%Y-%m-%d").to_string()
    }
}

/// Month whose data should be queried for the given UTC instant
///
/// The month is the one the TDB reading of `utc` falls in, moved by
/// `month_offset` for preloading adjacent months. Playback uses the same
/// reading (see [`secs_since_start_of_month`]), so both agree at rollover.
pub fn query_month(utc: DateTime<Utc>, month_offset: i32) -> MonthKey {
    MonthKey::containing(TdbTime::from_utc(utc)).offset(month_offset)
}

/// Seconds elapsed since 00:00 TDB on the first of the month `month_offset`
/// months away from the month containing `now`
///
/// With a zero offset this is the playback baseline; a positive offset
/// yields a negative value (the month has not started yet).
pub fn secs_since_start_of_month(now: TdbTime, month_offset: i32) -> f64 {
    let month = MonthKey::containing(now).offset(month_offset);
    (now.millis - month.start().millis) as f64 / 1000.0
}
