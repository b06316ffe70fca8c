//! Temporal value types.
//!
//! Component ranges are wider than chrono's (year spans the whole of i16),
//! so calendar arithmetic is done on civil day numbers here.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Date {
    pub year: i16,
    pub month: i8,
    pub day: i8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Time {
    pub hour: i8,
    pub minute: i8,
    pub sec: i8,
    pub microsec: i32,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct DateTime {
    pub year: i16,
    pub month: i8,
    pub day: i8,
    pub hour: i8,
    pub minute: i8,
    pub sec: i8,
    pub microsec: i32,
}

/// A calendar-aware span: months apart from seconds, because a month has no
/// fixed length in seconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Duration {
    pub months: i32,
    pub seconds: i64,
    pub microseconds: i32,
}

pub(crate) fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: i16, month: i8) -> i8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days since 1970-01-01 for a civil date (Howard Hinnant's algorithm).
fn days_from_civil(y: i64, m: i64, d: i64) -> i64 {
    let y = if m <= 2 { y - 1 } else { y };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146097 + doe - 719468
}

fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m, d)
}

impl Date {
    pub fn new(year: i16, month: i8, day: i8) -> Date {
        Date { year, month, day }
    }

    pub fn days_since_epoch(&self) -> i64 {
        days_from_civil(self.year as i64, self.month as i64, self.day as i64)
    }

    /// None when the resulting year leaves the representable range.
    pub fn from_days_since_epoch(days: i64) -> Option<Date> {
        let (y, m, d) = civil_from_days(days);
        if !(i16::MIN as i64..=i16::MAX as i64).contains(&y) {
            return None;
        }
        Some(Date {
            year: y as i16,
            month: m as i8,
            day: d as i8,
        })
    }

    /// Calendar addition: months first (day clamped to the target month),
    /// then whole days carried by the duration's seconds.
    pub fn add_duration(&self, dur: &Duration) -> Option<Date> {
        let total_months = self.year as i64 * 12 + (self.month as i64 - 1) + dur.months as i64;
        let year = total_months.div_euclid(12);
        let month = total_months.rem_euclid(12) + 1;
        if !(i16::MIN as i64..=i16::MAX as i64).contains(&year) {
            return None;
        }
        let day = (self.day).min(days_in_month(year as i16, month as i8));
        let base = days_from_civil(year, month, day as i64);
        Date::from_days_since_epoch(base + dur.seconds.div_euclid(86400))
    }

    pub fn sub_duration(&self, dur: &Duration) -> Option<Date> {
        self.add_duration(&dur.negated())
    }
}

impl Time {
    pub fn new(hour: i8, minute: i8, sec: i8, microsec: i32) -> Time {
        Time {
            hour,
            minute,
            sec,
            microsec,
        }
    }

    pub fn seconds_of_day(&self) -> i64 {
        self.hour as i64 * 3600 + self.minute as i64 * 60 + self.sec as i64
    }

    pub fn add_duration(&self, dur: &Duration) -> Time {
        let micros = (self.seconds_of_day() * 1_000_000 + self.microsec as i64)
            + (dur.seconds * 1_000_000 + dur.microseconds as i64);
        let micros = micros.rem_euclid(86400 * 1_000_000);
        let secs = micros / 1_000_000;
        Time {
            hour: (secs / 3600) as i8,
            minute: (secs % 3600 / 60) as i8,
            sec: (secs % 60) as i8,
            microsec: (micros % 1_000_000) as i32,
        }
    }

    pub fn sub_duration(&self, dur: &Duration) -> Time {
        self.add_duration(&dur.negated())
    }
}

impl DateTime {
    pub fn new(year: i16, month: i8, day: i8, hour: i8, minute: i8, sec: i8, microsec: i32) -> Self {
        DateTime {
            year,
            month,
            day,
            hour,
            minute,
            sec,
            microsec,
        }
    }

    pub fn from_parts(date: Date, time: Time) -> Self {
        DateTime {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: time.hour,
            minute: time.minute,
            sec: time.sec,
            microsec: time.microsec,
        }
    }

    pub fn date(&self) -> Date {
        Date::new(self.year, self.month, self.day)
    }

    pub fn time(&self) -> Time {
        Time::new(self.hour, self.minute, self.sec, self.microsec)
    }

    /// Seconds since the Unix epoch, ignoring leap seconds.
    pub fn epoch_seconds(&self) -> i64 {
        self.date().days_since_epoch() * 86400 + self.time().seconds_of_day()
    }

    pub fn add_duration(&self, dur: &Duration) -> Option<DateTime> {
        let month_part = Duration {
            months: dur.months,
            seconds: 0,
            microseconds: 0,
        };
        let date = self.date().add_duration(&month_part)?;
        let micros = self.time().seconds_of_day() * 1_000_000
            + self.microsec as i64
            + dur.seconds * 1_000_000
            + dur.microseconds as i64;
        let day_carry = micros.div_euclid(86400 * 1_000_000);
        let micros = micros.rem_euclid(86400 * 1_000_000);
        let date = Date::from_days_since_epoch(date.days_since_epoch() + day_carry)?;
        let secs = micros / 1_000_000;
        Some(DateTime {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: (secs / 3600) as i8,
            minute: (secs % 3600 / 60) as i8,
            sec: (secs % 60) as i8,
            microsec: (micros % 1_000_000) as i32,
        })
    }

    pub fn sub_duration(&self, dur: &Duration) -> Option<DateTime> {
        self.add_duration(&dur.negated())
    }
}

impl Duration {
    pub fn new(months: i32, seconds: i64, microseconds: i32) -> Duration {
        Duration {
            months,
            seconds,
            microseconds,
        }
    }

    pub fn negated(&self) -> Duration {
        Duration {
            months: -self.months,
            seconds: -self.seconds,
            microseconds: -self.microseconds,
        }
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:06}",
            self.hour, self.minute, self.sec, self.microsec
        )
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
            self.year, self.month, self.day, self.hour, self.minute, self.sec, self.microsec
        )
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P{}MT{}.{:06}S",
            self.months,
            self.seconds,
            self.microseconds.unsigned_abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2020));
        assert!(!is_leap_year(2021));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
    }

    #[test]
    fn civil_day_round_trip() {
        for days in [-719468, -1, 0, 1, 18262, 2932896] {
            let d = Date::from_days_since_epoch(days).unwrap();
            assert_eq!(d.days_since_epoch(), days, "days={days} date={d}");
        }
        assert_eq!(Date::new(1970, 1, 1).days_since_epoch(), 0);
        assert_eq!(Date::new(2020, 1, 1).days_since_epoch(), 18262);
    }

    #[test]
    fn date_plus_months_clamps_day() {
        let d = Date::new(2020, 1, 31);
        let plus_one_month = d.add_duration(&Duration::new(1, 0, 0)).unwrap();
        assert_eq!(plus_one_month, Date::new(2020, 2, 29));
        let plus_month_nonleap = Date::new(2021, 1, 31)
            .add_duration(&Duration::new(1, 0, 0))
            .unwrap();
        assert_eq!(plus_month_nonleap, Date::new(2021, 2, 28));
    }

    #[test]
    fn date_plus_seconds_carries_days() {
        let d = Date::new(2020, 12, 31);
        let next = d.add_duration(&Duration::new(0, 86400, 0)).unwrap();
        assert_eq!(next, Date::new(2021, 1, 1));
    }

    #[test]
    fn time_addition_wraps_at_midnight() {
        let t = Time::new(23, 30, 0, 0);
        let t2 = t.add_duration(&Duration::new(0, 3600, 0));
        assert_eq!(t2, Time::new(0, 30, 0, 0));
        let t3 = t.sub_duration(&Duration::new(0, 24 * 3600, 0));
        assert_eq!(t3, t);
    }

    #[test]
    fn datetime_addition() {
        let dt = DateTime::new(2020, 2, 28, 23, 0, 0, 0);
        let plus = dt.add_duration(&Duration::new(0, 3600, 0)).unwrap();
        assert_eq!(plus, DateTime::new(2020, 2, 29, 0, 0, 0, 0));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Date::new(2020, 2, 29).to_string(), "2020-02-29");
        assert_eq!(Time::new(13, 30, 0, 0).to_string(), "13:30:00.000000");
        assert_eq!(
            DateTime::new(2020, 1, 1, 13, 30, 0, 0).to_string(),
            "2020-01-01T13:30:00.000000"
        );
    }
}
