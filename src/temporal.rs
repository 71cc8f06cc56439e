//! Text and scalar forms of the temporal wire payloads.
//!
//! The wire carries instants as epoch milliseconds, calendar dates as epoch
//! days, and everything else as ISO-8601 text. chrono backs the value types
//! but has no ISO-8601 duration/period grammar, so the `PnDTnHnMn.nS` and
//! `PnYnMnWnD` forms are produced and parsed here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::error::{BosonError, Result};

/// A date-based amount of time: years, months and days.
///
/// This is the payload of the PERIOD tag. The wire form is the ISO-8601
/// period string, such as `P6Y3M1D`; a zero period prints as `P0D`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Period {
    /// Number of years.
    pub years: i32,
    /// Number of months.
    pub months: i32,
    /// Number of days.
    pub days: i32,
}

impl Period {
    /// Creates a period from years, months and days.
    #[must_use]
    pub fn new(years: i32, months: i32, days: i32) -> Self {
        Self { years, months, days }
    }

    /// True if all three components are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "P0D");
        }
        write!(f, "P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

impl FromStr for Period {
    type Err = BosonError;

    /// Parses `[+-]PnYnMnWnD`; weeks fold into days. At least one component
    /// must be present.
    fn from_str(s: &str) -> Result<Self> {
        let bad = || BosonError::InvalidData(format!("{s:?} is not an ISO-8601 period"));
        let (negate, rest) = split_sign(s.trim());
        let rest = rest.strip_prefix(['P', 'p']).ok_or_else(bad)?;
        let mut period = Period::default();
        let mut cursor = rest;
        let mut seen = false;
        while !cursor.is_empty() {
            let (number, unit, tail) = take_component(cursor).ok_or_else(bad)?;
            let number = i32::try_from(number).map_err(|_| bad())?;
            match unit {
                'Y' | 'y' => period.years = period.years.checked_add(number).ok_or_else(bad)?,
                'M' | 'm' => period.months = period.months.checked_add(number).ok_or_else(bad)?,
                'W' | 'w' => {
                    let days = number.checked_mul(7).ok_or_else(bad)?;
                    period.days = period.days.checked_add(days).ok_or_else(bad)?;
                }
                'D' | 'd' => period.days = period.days.checked_add(number).ok_or_else(bad)?,
                _ => return Err(bad()),
            }
            seen = true;
            cursor = tail;
        }
        if !seen {
            return Err(bad());
        }
        if negate {
            period.years = -period.years;
            period.months = -period.months;
            period.days = -period.days;
        }
        Ok(period)
    }
}

/// Renders a duration in the ISO-8601 seconds-based form, e.g. `PT8H6M12.345S`.
///
/// Negative durations carry a single leading minus (`-PT6H3M`); a zero
/// duration prints as `PT0S`.
#[must_use]
pub fn format_duration(duration: TimeDelta) -> String {
    if duration.is_zero() {
        return "PT0S".to_owned();
    }
    let (sign, magnitude) = if duration < TimeDelta::zero() {
        ("-", -duration)
    } else {
        ("", duration)
    };
    let total_secs = magnitude.num_seconds();
    let nanos = magnitude.subsec_nanos();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut out = format!("{sign}PT");
    if hours != 0 {
        out.push_str(&format!("{hours}H"));
    }
    if minutes != 0 {
        out.push_str(&format!("{minutes}M"));
    }
    if secs != 0 || nanos != 0 || (hours == 0 && minutes == 0) {
        if nanos == 0 {
            out.push_str(&format!("{secs}S"));
        } else {
            let frac = format!("{nanos:09}");
            out.push_str(&format!("{secs}.{}S", frac.trim_end_matches('0')));
        }
    }
    out
}

/// Parses `[+-]PnDTnHnMn.nS` into a [`TimeDelta`].
pub fn parse_duration(s: &str) -> Result<TimeDelta> {
    let bad = || BosonError::InvalidData(format!("{s:?} is not an ISO-8601 duration"));
    let (negate, rest) = split_sign(s.trim());
    let rest = rest.strip_prefix(['P', 'p']).ok_or_else(bad)?;

    let (date_part, time_part) = match rest.split_once(['T', 't']) {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut secs: i64 = 0;
    let mut nanos: i64 = 0;
    let mut seen = false;

    let mut cursor = date_part;
    while !cursor.is_empty() {
        let (number, unit, tail) = take_component(cursor).ok_or_else(bad)?;
        match unit {
            'D' | 'd' => {
                let day_secs = number.checked_mul(86_400).ok_or_else(bad)?;
                secs = secs.checked_add(day_secs).ok_or_else(bad)?;
            }
            _ => return Err(bad()),
        }
        seen = true;
        cursor = tail;
    }

    let mut cursor = time_part;
    while !cursor.is_empty() {
        let (number, unit, tail) = take_fractional_component(cursor).ok_or_else(bad)?;
        let scale = match unit {
            'H' | 'h' => 3600,
            'M' | 'm' => 60,
            'S' | 's' => 1,
            _ => return Err(bad()),
        };
        let whole = number.whole.checked_mul(scale).ok_or_else(bad)?;
        secs = secs.checked_add(whole).ok_or_else(bad)?;
        if number.nanos != 0 {
            if !matches!(unit, 'S' | 's') {
                return Err(bad());
            }
            nanos = nanos
                .checked_add(i64::from(number.nanos) * i64::from(number.sign))
                .ok_or_else(bad)?;
        }
        seen = true;
        cursor = tail;
    }

    if !seen {
        return Err(bad());
    }
    let mut delta = TimeDelta::new(secs, 0).ok_or_else(bad)?;
    delta = delta
        .checked_add(&TimeDelta::nanoseconds(nanos))
        .ok_or_else(bad)?;
    if negate {
        delta = -delta;
    }
    Ok(delta)
}

/// Renders an instant pair as `start/end` in RFC 3339 with millisecond
/// precision, the interval text form.
#[must_use]
pub fn format_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    use chrono::SecondsFormat;
    format!(
        "{}/{}",
        start.to_rfc3339_opts(SecondsFormat::Millis, true),
        end.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Parses an interval text form back into its two instants.
pub fn parse_interval(s: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let bad = || BosonError::InvalidData(format!("{s:?} is not an ISO-8601 interval"));
    let (start, end) = s.split_once('/').ok_or_else(bad)?;
    let start = DateTime::parse_from_rfc3339(start).map_err(|_| bad())?;
    let end = DateTime::parse_from_rfc3339(end).map_err(|_| bad())?;
    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Converts epoch milliseconds to an instant, rejecting out-of-range values.
pub fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| BosonError::InvalidData(format!("{millis} is out of range for an instant")))
}

/// Converts an epoch day count to a calendar date.
pub fn date_from_epoch_day(days: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|delta| NaiveDate::default().checked_add_signed(delta))
        .ok_or_else(|| BosonError::InvalidData(format!("{days} is out of range for a date")))
}

/// Days since 1970-01-01 for a calendar date.
#[must_use]
pub fn epoch_day(date: NaiveDate) -> i64 {
    date.signed_duration_since(NaiveDate::default()).num_days()
}

/// Renders a local date-time in the `T`-separated ISO form, trailing zero
/// fraction omitted.
#[must_use]
pub fn format_local_date_time(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Parses an ISO local date-time, tolerating an omitted seconds field
/// (`2007-12-03T10:15`), which the original writer produces for whole minutes.
pub fn parse_local_date_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::from_str(s)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| BosonError::InvalidData(format!("{s:?} is not an ISO-8601 date-time")))
}

/// Renders a local time in ISO form, trailing zero fraction omitted.
#[must_use]
pub fn format_local_time(t: NaiveTime) -> String {
    t.format("%H:%M:%S%.f").to_string()
}

/// Parses an ISO local time, tolerating an omitted seconds field.
pub fn parse_local_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::from_str(s)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| BosonError::InvalidData(format!("{s:?} is not an ISO-8601 time")))
}

/// Parses an ISO calendar date.
pub fn parse_local_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::from_str(s)
        .map_err(|_| BosonError::InvalidData(format!("{s:?} is not an ISO-8601 date")))
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// Splits a leading `[+-]<digits><unit>` component off `s`.
fn take_component(s: &str) -> Option<(i64, char, &str)> {
    let (sign, rest) = match split_sign(s) {
        (true, r) => (-1i64, r),
        (false, r) => (1i64, r),
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let number: i64 = rest.get(..digits)?.parse().ok()?;
    let mut tail = rest.get(digits..)?.chars();
    let unit = tail.next()?;
    Some((number.checked_mul(sign)?, unit, tail.as_str()))
}

struct Fractional {
    whole: i64,
    /// Nanoseconds scaled from the fraction digits, always non-negative.
    nanos: u32,
    sign: i32,
}

/// Like [`take_component`] but the number may carry a decimal fraction,
/// as in `12.345S`.
fn take_fractional_component(s: &str) -> Option<(Fractional, char, &str)> {
    let (sign, rest) = match split_sign(s) {
        (true, r) => (-1i32, r),
        (false, r) => (1i32, r),
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let whole: i64 = rest.get(..digits)?.parse().ok()?;
    let whole = whole.checked_mul(i64::from(sign))?;
    let mut tail = rest.get(digits..)?;
    let mut nanos = 0u32;
    if let Some(frac_tail) = tail.strip_prefix(['.', ',']) {
        let frac_digits =
            frac_tail.len() - frac_tail.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if frac_digits == 0 || frac_digits > 9 {
            return None;
        }
        let frac: u32 = frac_tail.get(..frac_digits)?.parse().ok()?;
        nanos = frac * 10u32.pow(9 - u32::try_from(frac_digits).ok()?);
        tail = frac_tail.get(frac_digits..)?;
    }
    let mut chars = tail.chars();
    let unit = chars.next()?;
    Some((Fractional { whole, nanos, sign }, unit, chars.as_str()))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn period_text_round_trips() {
        for (period, text) in [
            (Period::new(6, 3, 1), "P6Y3M1D"),
            (Period::new(0, 0, 0), "P0D"),
            (Period::new(0, 2, 0), "P2M"),
            (Period::new(-1, 0, 20), "P-1Y20D"),
        ] {
            assert_eq!(period.to_string(), text);
            assert_eq!(text.parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn period_weeks_fold_into_days() {
        assert_eq!("P2W".parse::<Period>().unwrap(), Period::new(0, 0, 14));
        assert_eq!("P1W3D".parse::<Period>().unwrap(), Period::new(0, 0, 10));
        assert_eq!("-P1Y2M3D".parse::<Period>().unwrap(), Period::new(-1, -2, -3));
    }

    #[test]
    fn period_rejects_garbage() {
        for bad in ["", "P", "6Y", "P6X", "P1.5Y"] {
            assert!(bad.parse::<Period>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn duration_formats_like_the_original() {
        let d = TimeDelta::hours(8) + TimeDelta::minutes(6) + TimeDelta::milliseconds(12_345);
        assert_eq!(format_duration(d), "PT8H6M12.345S");
        assert_eq!(format_duration(TimeDelta::zero()), "PT0S");
        assert_eq!(format_duration(TimeDelta::seconds(-61)), "-PT1M1S");
    }

    #[test]
    fn duration_text_round_trips() {
        for d in [
            TimeDelta::zero(),
            TimeDelta::seconds(1),
            TimeDelta::seconds(-1),
            TimeDelta::days(2) + TimeDelta::hours(3),
            TimeDelta::milliseconds(12_345),
            TimeDelta::nanoseconds(1),
        ] {
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
    }

    #[test]
    fn duration_accepts_day_components() {
        assert_eq!(
            parse_duration("P2DT3H4M").unwrap(),
            TimeDelta::days(2) + TimeDelta::hours(3) + TimeDelta::minutes(4)
        );
        assert_eq!(parse_duration("-PT6H3M").unwrap(), -(TimeDelta::hours(6) + TimeDelta::minutes(3)));
    }

    #[test]
    fn duration_rejects_garbage() {
        for bad in ["", "P", "PT", "PT1X", "PT1.5M", "1H"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn interval_round_trips_at_millis() {
        let start = instant_from_millis(1_277_859_600_123).unwrap();
        let end = instant_from_millis(1_278_017_999_999).unwrap();
        let text = format_interval(start, end);
        assert_eq!(parse_interval(&text).unwrap(), (start, end));
    }

    #[test]
    fn epoch_day_round_trips() {
        for days in [0i64, 1, -1, 18_000, -100_000] {
            assert_eq!(epoch_day(date_from_epoch_day(days).unwrap()), days);
        }
    }

    #[test]
    fn local_date_time_tolerates_whole_minutes() {
        let dt = parse_local_date_time("2007-12-03T10:15").unwrap();
        assert_eq!(format_local_date_time(dt), "2007-12-03T10:15:00");
        let t = parse_local_time("10:15").unwrap();
        assert_eq!(format_local_time(t), "10:15:00");
    }
}
