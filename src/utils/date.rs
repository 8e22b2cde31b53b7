//! Datetime helpers without timezone dependencies.
//!
//! - `DateTimeUtc` - a plain calendar datetime parsed from frontmatter
//! - `ZonedDateTime` - a wall clock plus a fixed UTC offset
//! - `to_beijing_time()` - label a wall clock as `Asia/Shanghai` (+08:00)
//! - `relative_time()` - "3 days ago" / "in an hour"
//!
//! China has no daylight saving time, so `Asia/Shanghai` is a fixed offset.
//!
//! # Examples
//!
//! ```ignore
//! let dt = DateTimeUtc::parse("2024-06-15T14:30:45Z").unwrap();
//! assert_eq!(to_beijing_time(dt).to_rfc3339(), "2024-06-15T14:30:45+08:00");
//!
//! let dt = DateTimeUtc::parse("2024-06-15T22:30:45.123+08:00").unwrap();
//! assert_eq!(dt, DateTimeUtc::new(2024, 6, 15, 14, 30, 45));
//! ```

use anyhow::{Result, bail};
use std::time::{SystemTime, UNIX_EPOCH};

/// UTC offset of `Asia/Shanghai`, in minutes.
pub const BEIJING_OFFSET_MINUTES: i32 = 8 * 60;

const SECS_PER_DAY: i64 = 86_400;

/// Calendar datetime without a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.fff][Z|±HH:MM]`.
    ///
    /// A space may stand in for the `T` separator. Fractional seconds are
    /// dropped; a `±HH:MM` offset is applied, giving the UTC clock.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();
        if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
            return None;
        }

        let year = parse_u16(&bytes[0..4])?;
        let month = parse_u8(&bytes[5..7])?;
        let day = parse_u8(&bytes[8..10])?;

        let (hour, minute, second, offset) = match &bytes[10..] {
            [] => (0, 0, 0, 0),
            [b'T' | b' ', time @ ..] => {
                let (time, offset) = split_offset(time)?;
                let time = strip_fraction(time)?;
                if time.len() != 8 || time[2] != b':' || time[5] != b':' {
                    return None;
                }
                (
                    parse_u8(&time[0..2])?,
                    parse_u8(&time[3..5])?,
                    parse_u8(&time[6..8])?,
                    offset,
                )
            }
            _ => return None,
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        if offset == 0 {
            return Some(dt);
        }
        Self::from_unix(ZonedDateTime::keep_local(dt, offset).to_unix())
    }

    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }
        if day == 0 || day > Self::days_in_month(year, month) {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Seconds since the Unix epoch, reading this value as UTC.
    pub fn to_unix(self) -> i64 {
        let days = days_from_civil(i64::from(self.year), self.month, self.day);
        days * SECS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Inverse of [`to_unix`](Self::to_unix). `None` outside years 0..=9999.
    pub fn from_unix(secs: i64) -> Option<Self> {
        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        let year = u16::try_from(year).ok().filter(|y| *y <= 9999)?;

        // rem < 86400, so every component fits in u8
        Some(Self::new(
            year,
            month,
            day,
            (rem / 3600) as u8,
            (rem % 3600 / 60) as u8,
            (rem % 60) as u8,
        ))
    }

    /// Current UTC time.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self::from_unix(secs).unwrap_or(Self::from_ymd(1970, 1, 1))
    }

}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Split a trailing `Z` or `±HH:MM` off a time, returning the offset in minutes.
fn split_offset(time: &[u8]) -> Option<(&[u8], i32)> {
    if let Some(time) = time.strip_suffix(b"Z") {
        return Some((time, 0));
    }
    match time.len().checked_sub(6).map(|at| time.split_at(at)) {
        Some((time, [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2])) => {
            let hours = parse_u8(&[*h1, *h2])?;
            let minutes = parse_u8(&[*m1, *m2])?;
            if hours > 23 || minutes > 59 {
                return None;
            }
            let offset = i32::from(hours) * 60 + i32::from(minutes);
            Some((time, if *sign == b'-' { -offset } else { offset }))
        }
        _ => Some((time, 0)),
    }
}

/// Drop `.fff` fractional seconds.
fn strip_fraction(time: &[u8]) -> Option<&[u8]> {
    match time.iter().position(|&b| b == b'.') {
        Some(dot) => {
            let digits = &time[dot + 1..];
            (!digits.is_empty() && digits.iter().all(u8::is_ascii_digit)).then(|| &time[..dot])
        }
        None => Some(time),
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [a @ b'0'..=b'9', b @ b'0'..=b'9'] => Some((a - b'0') * 10 + (b - b'0')),
        _ => None,
    }
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0')),
    )
}

// =============================================================================
// Zoned time
// =============================================================================

/// A wall clock reading in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedDateTime {
    pub local: DateTimeUtc,
    pub offset_minutes: i32,
}

impl ZonedDateTime {
    /// Attach `offset_minutes` to `local` without shifting the clock.
    pub const fn keep_local(local: DateTimeUtc, offset_minutes: i32) -> Self {
        Self {
            local,
            offset_minutes,
        }
    }

    /// The instant, in seconds since the Unix epoch.
    pub fn to_unix(self) -> i64 {
        self.local.to_unix() - i64::from(self.offset_minutes) * 60
    }

    /// `YYYY-MM-DDTHH:MM:SS+HH:MM`
    pub fn to_rfc3339(self) -> String {
        let DateTimeUtc {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = self.local;
        let sign = if self.offset_minutes < 0 { '-' } else { '+' };
        let offset = self.offset_minutes.unsigned_abs();
        format!(
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}{sign}{:02}:{:02}",
            offset / 60,
            offset % 60
        )
    }
}

/// Read `dt` as a Beijing wall clock (`Asia/Shanghai`, +08:00).
///
/// The clock value is kept; only the zone label changes.
pub fn to_beijing_time(dt: DateTimeUtc) -> ZonedDateTime {
    ZonedDateTime::keep_local(dt, BEIJING_OFFSET_MINUTES)
}

// =============================================================================
// Relative time
// =============================================================================

/// Human phrase for the distance from `now` to `then` (unix seconds).
///
/// Thresholds follow the dayjs `relativeTime` plugin.
pub fn relative_time(then: i64, now: i64) -> String {
    let diff = then - now;
    let phrase = distance_phrase(diff.unsigned_abs());
    if diff > 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

fn distance_phrase(secs: u64) -> String {
    let secs = secs as f64;
    let round = |unit: f64| (secs / unit).round() as u64;

    let s = round(1.0);
    if s <= 44 {
        return "a few seconds".into();
    }
    if s <= 89 {
        return "a minute".into();
    }
    let m = round(60.0);
    if m <= 44 {
        return count(m, "minute");
    }
    if m <= 89 {
        return "an hour".into();
    }
    let h = round(3600.0);
    if h <= 21 {
        return count(h, "hour");
    }
    if h <= 35 {
        return "a day".into();
    }
    let d = round(86_400.0);
    if d <= 25 {
        return count(d, "day");
    }
    if d <= 45 {
        return "a month".into();
    }
    let months = round(86_400.0 * 30.436_875);
    if months <= 10 {
        return count(months, "month");
    }
    if months <= 17 {
        return "a year".into();
    }
    count(round(86_400.0 * 365.2425), "year")
}

fn count(n: u64, unit: &str) -> String {
    match n {
        1 if unit == "hour" => "an hour".into(),
        1 => format!("a {unit}"),
        n => format!("{n} {unit}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_only() {
        let dt = DateTimeUtc::parse("2024-06-15").unwrap();
        assert_eq!(dt, DateTimeUtc::from_ymd(2024, 6, 15));
    }

    #[test]
    fn test_parse_with_time() {
        let expected = DateTimeUtc::new(2024, 6, 15, 14, 30, 45);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45Z"), Some(expected));
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45"), Some(expected));
        assert_eq!(DateTimeUtc::parse("2024-06-15 14:30:45"), Some(expected));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(DateTimeUtc::parse("2024-6-15"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30"), None);
        assert_eq!(DateTimeUtc::parse("2024-13-01"), None);
        assert_eq!(DateTimeUtc::parse("2023-02-29"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15x"), None);
    }

    #[test]
    fn test_validate_leap_year() {
        assert!(DateTimeUtc::new(2024, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(2000, 2, 29, 12, 0, 0).validate().is_ok());
        assert!(DateTimeUtc::new(1900, 2, 29, 12, 0, 0).validate().is_err());
    }

    #[test]
    fn test_validate_time_bounds() {
        assert!(DateTimeUtc::new(2024, 6, 15, 24, 0, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 60, 0).validate().is_err());
        assert!(DateTimeUtc::new(2024, 6, 15, 12, 30, 60).validate().is_err());
        assert!(DateTimeUtc::new(2024, 12, 31, 23, 59, 59).validate().is_ok());
    }

    #[test]
    fn test_unix_round_trip_known_values() {
        assert_eq!(DateTimeUtc::from_ymd(1970, 1, 1).to_unix(), 0);
        assert_eq!(DateTimeUtc::from_ymd(2000, 3, 1).to_unix(), 951_868_800);
        assert_eq!(
            DateTimeUtc::new(2024, 6, 15, 14, 30, 45).to_unix(),
            1_718_461_845
        );
        assert_eq!(
            DateTimeUtc::from_unix(1_718_461_845),
            Some(DateTimeUtc::new(2024, 6, 15, 14, 30, 45))
        );
        assert_eq!(
            DateTimeUtc::from_unix(-1),
            Some(DateTimeUtc::new(1969, 12, 31, 23, 59, 59))
        );
    }

    #[test]
    fn test_beijing_keeps_wall_clock() {
        let dt = DateTimeUtc::new(2024, 6, 15, 14, 30, 45);
        let bj = to_beijing_time(dt);
        assert_eq!(bj.local, dt);
        assert_eq!(bj.to_rfc3339(), "2024-06-15T14:30:45+08:00");
        assert_eq!(bj.to_unix(), dt.to_unix() - 8 * 3600);
    }

    #[test]
    fn test_parse_offset_shifts_to_utc() {
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T10:00:00+08:00"),
            Some(DateTimeUtc::new(2024, 6, 15, 2, 0, 0))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-12-31T20:30:00-05:00"),
            Some(DateTimeUtc::new(2025, 1, 1, 1, 30, 0))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-01-01T03:00:00+08:00"),
            Some(DateTimeUtc::new(2023, 12, 31, 19, 0, 0))
        );
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T10:00:00+00:00"),
            Some(DateTimeUtc::new(2024, 6, 15, 10, 0, 0))
        );
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let expected = DateTimeUtc::new(2024, 6, 15, 14, 30, 45);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45.123Z"), Some(expected));
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45.5"), Some(expected));
        assert_eq!(
            DateTimeUtc::parse("2024-06-15T22:30:45.123456+08:00"),
            Some(expected)
        );
    }

    #[test]
    fn test_parse_rejects_bad_suffixes() {
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45."), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45.1x"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45+24:00"), None);
        assert_eq!(DateTimeUtc::parse("2024-06-15T14:30:45+0800"), None);
    }

    #[test]
    fn test_negative_offset_format() {
        let z = ZonedDateTime::keep_local(DateTimeUtc::from_ymd(2024, 1, 1), -(5 * 60 + 30));
        assert_eq!(z.to_rfc3339(), "2024-01-01T00:00:00-05:30");
    }

    #[test]
    fn test_relative_time_thresholds() {
        let now = 1_000_000_000;
        let ago = |secs: i64| relative_time(now - secs, now);

        assert_eq!(ago(10), "a few seconds ago");
        assert_eq!(ago(60), "a minute ago");
        assert_eq!(ago(5 * 60), "5 minutes ago");
        assert_eq!(ago(60 * 60), "an hour ago");
        assert_eq!(ago(3 * 3600), "3 hours ago");
        assert_eq!(ago(30 * 3600), "a day ago");
        assert_eq!(ago(3 * 86_400), "3 days ago");
        assert_eq!(ago(30 * 86_400), "a month ago");
        assert_eq!(ago(90 * 86_400), "3 months ago");
        assert_eq!(ago(400 * 86_400), "a year ago");
        assert_eq!(ago(3 * 365 * 86_400), "3 years ago");
    }

    #[test]
    fn test_relative_time_future() {
        assert_eq!(relative_time(3 * 86_400, 0), "in 3 days");
        assert_eq!(relative_time(60 * 60, 0), "in an hour");
    }
}
