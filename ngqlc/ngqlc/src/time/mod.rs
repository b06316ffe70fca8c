//! Temporal construction and validation.
//!
//! Component ranges follow the storage format: year in the whole of i16,
//! Gregorian month/day rules with leap years, hour/minute/second clocks.
//! `chrono` supplies only the current UTC instant; range validation is done
//! here because chrono's representable years differ.

use chrono::{Datelike, Timelike, Utc};
use ngqlc_ast::error::{Error, ErrorKind, Result};
use ngqlc_ast::value::{Date, DateTime, Map, Time, Value};

/// Kernel timestamps cap out here (ns in an i64).
pub const MAX_TIMESTAMP: i64 = i64::MAX / 1_000_000_000;

fn bad_data(msg: String) -> Error {
    Error::new(ErrorKind::BadData, msg)
}

fn days_in_month(year: i16, month: i8) -> i8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

pub fn validate_date(d: &Date) -> Result<()> {
    if d.month <= 0 || d.month > 12 {
        return Err(bad_data(format!("Invalid month number `{}'.", d.month)));
    }
    if d.day <= 0 || d.day > days_in_month(d.year, d.month) {
        return Err(bad_data(format!("Invalid day number `{}'.", d.day)));
    }
    Ok(())
}

pub fn validate_time(t: &Time) -> Result<()> {
    if !(0..=23).contains(&t.hour) {
        return Err(bad_data(format!("Invalid hour number `{}'.", t.hour)));
    }
    if !(0..=59).contains(&t.minute) {
        return Err(bad_data(format!("Invalid minute number `{}'.", t.minute)));
    }
    if !(0..=59).contains(&t.sec) {
        return Err(bad_data(format!("Invalid second number `{}'.", t.sec)));
    }
    if !(0..=999_999).contains(&t.microsec) {
        return Err(bad_data(format!(
            "Invalid microsecond number `{}'.",
            t.microsec
        )));
    }
    Ok(())
}

pub fn validate_datetime(dt: &DateTime) -> Result<()> {
    validate_date(&dt.date())?;
    validate_time(&dt.time())
}

fn int_field(value: &Value) -> Result<i64> {
    value
        .as_int()
        .copied()
        .ok_or_else(|| bad_data("Invalid value type.".to_string()))
}

/// `date({year: .., month: .., day: ..})`; unknown keys are rejected.
pub fn date_from_map(m: &Map) -> Result<Date> {
    let mut d = Date::new(1970, 1, 1);
    for (k, v) in &m.kvs {
        let v = int_field(v)?;
        match k.as_str() {
            "year" => {
                d.year = i16::try_from(v)
                    .map_err(|_| bad_data(format!("Invalid year number `{v}'.")))?;
            }
            "month" => {
                if !(1..=12).contains(&v) {
                    return Err(bad_data(format!("Invalid month number `{v}'.")));
                }
                d.month = v as i8;
            }
            "day" => {
                if !(1..=31).contains(&v) {
                    return Err(bad_data(format!("Invalid day number `{v}'.")));
                }
                d.day = v as i8;
            }
            other => return Err(bad_data(format!("Invalid parameter `{other}'."))),
        }
    }
    validate_date(&d)?;
    Ok(d)
}

pub fn time_from_map(m: &Map) -> Result<Time> {
    let mut t = Time::new(0, 0, 0, 0);
    for (k, v) in &m.kvs {
        let v = int_field(v)?;
        match k.as_str() {
            "hour" => {
                if !(0..=23).contains(&v) {
                    return Err(bad_data(format!("Invalid hour number `{v}'.")));
                }
                t.hour = v as i8;
            }
            "minute" => {
                if !(0..=59).contains(&v) {
                    return Err(bad_data(format!("Invalid minute number `{v}'.")));
                }
                t.minute = v as i8;
            }
            "second" => {
                if !(0..=59).contains(&v) {
                    return Err(bad_data(format!("Invalid second number `{v}'.")));
                }
                t.sec = v as i8;
            }
            "millisecond" => {
                if !(0..=999).contains(&v) {
                    return Err(bad_data(format!("Invalid millisecond number `{v}'.")));
                }
                t.microsec += (v * 1000) as i32;
            }
            "microsecond" => {
                if !(0..=999).contains(&v) {
                    return Err(bad_data(format!("Invalid microsecond number `{v}'.")));
                }
                t.microsec += v as i32;
            }
            other => return Err(bad_data(format!("Invalid parameter `{other}'."))),
        }
    }
    validate_time(&t)?;
    Ok(t)
}

pub fn datetime_from_map(m: &Map) -> Result<DateTime> {
    let mut dt = DateTime::new(1970, 1, 1, 0, 0, 0, 0);
    for (k, v) in &m.kvs {
        let v = int_field(v)?;
        match k.as_str() {
            "year" => {
                dt.year = i16::try_from(v)
                    .map_err(|_| bad_data(format!("Invalid year number `{v}'.")))?;
            }
            "month" => {
                if !(1..=12).contains(&v) {
                    return Err(bad_data(format!("Invalid month number `{v}'.")));
                }
                dt.month = v as i8;
            }
            "day" => {
                if !(1..=31).contains(&v) {
                    return Err(bad_data(format!("Invalid day number `{v}'.")));
                }
                dt.day = v as i8;
            }
            "hour" => {
                if !(0..=23).contains(&v) {
                    return Err(bad_data(format!("Invalid hour number `{v}'.")));
                }
                dt.hour = v as i8;
            }
            "minute" => {
                if !(0..=59).contains(&v) {
                    return Err(bad_data(format!("Invalid minute number `{v}'.")));
                }
                dt.minute = v as i8;
            }
            "second" => {
                if !(0..=59).contains(&v) {
                    return Err(bad_data(format!("Invalid second number `{v}'.")));
                }
                dt.sec = v as i8;
            }
            "millisecond" => {
                if !(0..=999).contains(&v) {
                    return Err(bad_data(format!("Invalid millisecond number `{v}'.")));
                }
                dt.microsec += (v * 1000) as i32;
            }
            "microsecond" => {
                if !(0..=999).contains(&v) {
                    return Err(bad_data(format!("Invalid microsecond number `{v}'.")));
                }
                dt.microsec += v as i32;
            }
            other => return Err(bad_data(format!("Invalid parameter `{other}'."))),
        }
    }
    validate_datetime(&dt)?;
    Ok(dt)
}

/// `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<Date> {
    let err = || bad_data(format!("Invalid date string `{s}'."));
    let (year_str, rest) = s.split_once('-').ok_or_else(err)?;
    // a leading '-' belongs to a negative year
    let (year_str, rest) = if year_str.is_empty() {
        let (y, r) = rest.split_once('-').ok_or_else(err)?;
        (format!("-{y}"), r)
    } else {
        (year_str.to_string(), rest)
    };
    let (month_str, day_str) = rest.split_once('-').ok_or_else(err)?;
    let d = Date::new(
        year_str.parse().map_err(|_| err())?,
        month_str.parse().map_err(|_| err())?,
        day_str.parse().map_err(|_| err())?,
    );
    validate_date(&d)?;
    Ok(d)
}

/// `HH:MM:SS[.ffffff]`.
pub fn parse_time(s: &str) -> Result<Time> {
    let err = || bad_data(format!("Invalid time string `{s}'."));
    let (clock, micros) = match s.split_once('.') {
        Some((clock, frac)) => {
            if frac.is_empty() || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let scale = 10i32.pow(6 - frac.len() as u32);
            (clock, frac.parse::<i32>().map_err(|_| err())? * scale)
        }
        None => (s, 0),
    };
    let mut parts = clock.split(':');
    let hour = parts.next().ok_or_else(err)?;
    let minute = parts.next().ok_or_else(err)?;
    let sec = parts.next().ok_or_else(err)?;
    if parts.next().is_some() {
        return Err(err());
    }
    let t = Time::new(
        hour.parse().map_err(|_| err())?,
        minute.parse().map_err(|_| err())?,
        sec.parse().map_err(|_| err())?,
        micros,
    );
    validate_time(&t)?;
    Ok(t)
}

/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` or a bare date.
pub fn parse_datetime(s: &str) -> Result<DateTime> {
    match s.split_once(['T', ' ']) {
        Some((date, time)) => Ok(DateTime::from_parts(parse_date(date)?, parse_time(time)?)),
        None => Ok(DateTime::from_parts(parse_date(s)?, Time::default())),
    }
}

pub fn timestamp_from_datetime(dt: &DateTime) -> Result<i64> {
    let ts = dt.epoch_seconds();
    if !(0..=MAX_TIMESTAMP).contains(&ts) {
        return Err(bad_data(format!("Invalid timestamp `{ts}'.")));
    }
    Ok(ts)
}

pub fn current_date() -> Date {
    let now = Utc::now();
    Date::new(now.year() as i16, now.month() as i8, now.day() as i8)
}

pub fn current_time() -> Time {
    let now = Utc::now();
    Time::new(
        now.hour() as i8,
        now.minute() as i8,
        now.second() as i8,
        (now.nanosecond() / 1000) as i32,
    )
}

pub fn current_datetime() -> DateTime {
    DateTime::from_parts(current_date(), current_time())
}

pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn map(kvs: indexmap::IndexMap<String, Value>) -> Map {
        Map { kvs }
    }

    #[test]
    fn leap_day_is_validated() {
        let bad = map(indexmap! {
            "year".to_string() => Value::Int(2021),
            "month".to_string() => Value::Int(2),
            "day".to_string() => Value::Int(29),
        });
        assert!(date_from_map(&bad).is_err());

        let good = map(indexmap! {
            "year".to_string() => Value::Int(2020),
            "month".to_string() => Value::Int(2),
            "day".to_string() => Value::Int(29),
        });
        assert_eq!(date_from_map(&good).unwrap(), Date::new(2020, 2, 29));
    }

    #[test]
    fn unknown_map_keys_are_rejected() {
        let bad = map(indexmap! {"decade".to_string() => Value::Int(202)});
        let err = date_from_map(&bad).unwrap_err();
        assert_eq!(err.message, "Invalid parameter `decade'.");
    }

    #[test]
    fn component_ranges() {
        assert!(time_from_map(&map(indexmap! {"hour".to_string() => Value::Int(24)})).is_err());
        assert!(time_from_map(&map(indexmap! {"minute".to_string() => Value::Int(60)})).is_err());
        assert!(
            time_from_map(&map(indexmap! {"hour".to_string() => Value::Int(23)})).is_ok()
        );
    }

    #[test]
    fn string_parsing_round_trips() {
        let d = parse_date("2020-02-29").unwrap();
        assert_eq!(parse_date(&d.to_string()).unwrap(), d);
        assert!(parse_date("2021-02-29").is_err());
        assert!(parse_date("garbage").is_err());

        let t = parse_time("13:30:05.250000").unwrap();
        assert_eq!(t, Time::new(13, 30, 5, 250_000));
        assert_eq!(parse_time(&t.to_string()).unwrap(), t);

        let dt = parse_datetime("2020-01-01T13:30:05").unwrap();
        assert_eq!(dt, DateTime::new(2020, 1, 1, 13, 30, 5, 0));
        assert_eq!(parse_datetime(&dt.to_string()).unwrap(), dt);
    }

    #[test]
    fn negative_years_parse() {
        let d = parse_date("-0100-01-01").unwrap();
        assert_eq!(d.year, -100);
    }

    #[test]
    fn timestamp_bounds() {
        let dt = DateTime::new(2020, 1, 1, 0, 0, 0, 0);
        let ts = timestamp_from_datetime(&dt).unwrap();
        assert_eq!(ts, 1577836800);
        let before_epoch = DateTime::new(1969, 12, 31, 23, 59, 59, 0);
        assert!(timestamp_from_datetime(&before_epoch).is_err());
    }
}
