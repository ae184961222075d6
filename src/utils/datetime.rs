//! Date/time normalization
//!
//! Metadata dates arrive in several lexical forms: XMP uses an ISO 8601
//! profile with optional components, EXIF uses `YYYY:MM:DD HH:MM:SS`, IPTC
//! uses `CCYYMMDD`. All of them are normalized to the XMP/ISO form so that a
//! date scalar has exactly one canonical text.

use crate::core::error::{MetaError, MetaResult};
use std::fmt;

/// Parsed date/time with optional components
///
/// A value may carry a date only, a date plus time, and optionally a
/// timezone. Partial dates (year, year-month) are allowed as in XMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetaDateTime {
    /// Year (0000-9999)
    pub year: u16,
    /// Month (1-12, 0 means not set)
    pub month: u8,
    /// Day (1-31, 0 means not set)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Nanoseconds (0-999999999)
    pub nanosecond: u32,
    /// Whether time components are present
    pub has_time: bool,
    /// Whether a timezone is present
    pub has_timezone: bool,
    /// Timezone sign: -1 (west), 0 (UTC), +1 (east)
    pub tz_sign: i8,
    /// Timezone hour offset (0-23)
    pub tz_hour: u8,
    /// Timezone minute offset (0-59)
    pub tz_minute: u8,
}

/// Byte cursor over an ASCII date string
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    source: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
            source,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: u8) -> MetaResult<()> {
        if self.eat(b) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", b as char)))
        }
    }

    /// Read exactly `n` ASCII digits
    fn digits(&mut self, n: usize, what: &str) -> MetaResult<u32> {
        let end = self.pos + n;
        if end > self.bytes.len() || !self.bytes[self.pos..end].iter().all(u8::is_ascii_digit) {
            return Err(self.error(&format!("expected {} digits for {}", n, what)));
        }
        let value = self.bytes[self.pos..end]
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
        self.pos = end;
        Ok(value)
    }

    /// Read a run of one or more digits (fractional seconds)
    fn digit_run(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        &self.bytes[start..self.pos]
    }

    fn error(&self, msg: &str) -> MetaError {
        MetaError::InvalidDate(format!("'{}': {}", self.source, msg))
    }
}

impl MetaDateTime {
    /// Parse a date in any supported form (XMP/ISO, EXIF, IPTC compact)
    pub fn parse(s: &str) -> MetaResult<Self> {
        let s = s.trim();
        let bytes = s.as_bytes();
        if bytes.len() >= 5 && bytes[4] == b':' {
            Self::parse_exif(s)
        } else if bytes.len() == 8 && bytes.iter().all(u8::is_ascii_digit) {
            Self::parse_iptc(s)
        } else {
            Self::parse_iso(s)
        }
    }

    /// Parse an XMP date/time string
    ///
    /// Accepted forms:
    /// - `YYYY`, `YYYY-MM`, `YYYY-MM-DD`
    /// - `YYYY-MM-DDThh:mm`, `YYYY-MM-DDThh:mm:ss`, `YYYY-MM-DDThh:mm:ss.sss`
    /// - any of the timed forms followed by `Z` or `+hh:mm` / `-hh:mm`
    pub fn parse_iso(s: &str) -> MetaResult<Self> {
        let mut cur = Cursor::new(s);
        let mut dt = Self {
            year: cur.digits(4, "year")? as u16,
            ..Self::default()
        };

        if cur.at_end() {
            return dt.checked(&cur);
        }
        cur.expect(b'-')?;
        dt.month = cur.digits(2, "month")? as u8;

        if cur.at_end() {
            return dt.checked(&cur);
        }
        cur.expect(b'-')?;
        dt.day = cur.digits(2, "day")? as u8;

        if cur.at_end() {
            return dt.checked(&cur);
        }
        cur.expect(b'T')?;
        dt.parse_time(&mut cur, true)?;
        dt.checked(&cur)
    }

    /// Parse an EXIF date/time string (`YYYY:MM:DD HH:MM:SS`)
    ///
    /// Sub-seconds (`.sss`) and a trailing offset are accepted; a bare
    /// `YYYY:MM:DD` (as in `GPSDateStamp`) is a date-only value.
    pub fn parse_exif(s: &str) -> MetaResult<Self> {
        let mut cur = Cursor::new(s);
        let mut dt = Self {
            year: cur.digits(4, "year")? as u16,
            ..Self::default()
        };
        cur.expect(b':')?;
        dt.month = cur.digits(2, "month")? as u8;
        cur.expect(b':')?;
        dt.day = cur.digits(2, "day")? as u8;

        if cur.at_end() {
            return dt.checked(&cur);
        }
        if !(cur.eat(b' ') || cur.eat(b'T')) {
            return Err(cur.error("expected ' ' between date and time"));
        }
        dt.parse_time(&mut cur, false)?;
        dt.checked(&cur)
    }

    /// Parse an IPTC compact date (`CCYYMMDD`)
    pub fn parse_iptc(s: &str) -> MetaResult<Self> {
        let mut cur = Cursor::new(s);
        let mut dt = Self {
            year: cur.digits(4, "year")? as u16,
            ..Self::default()
        };
        dt.month = cur.digits(2, "month")? as u8;
        dt.day = cur.digits(2, "day")? as u8;
        dt.checked(&cur)
    }

    fn parse_time(&mut self, cur: &mut Cursor<'_>, seconds_optional: bool) -> MetaResult<()> {
        self.has_time = true;
        self.hour = cur.digits(2, "hour")? as u8;
        cur.expect(b':')?;
        self.minute = cur.digits(2, "minute")? as u8;

        if cur.eat(b':') {
            self.second = cur.digits(2, "second")? as u8;
            if cur.eat(b'.') {
                let frac = cur.digit_run();
                if frac.is_empty() {
                    return Err(cur.error("expected digits after '.'"));
                }
                // Normalize to nanoseconds (keep at most 9 digits)
                self.nanosecond = frac
                    .iter()
                    .chain(std::iter::repeat(&b'0'))
                    .take(9)
                    .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));
            }
        } else if !seconds_optional {
            return Err(cur.error("expected ':' before seconds"));
        }

        if cur.at_end() {
            return Ok(());
        }

        self.has_timezone = true;
        if cur.eat(b'Z') {
            self.tz_sign = 0;
        } else if cur.eat(b'+') || cur.eat(b'-') {
            self.tz_sign = if cur.bytes[cur.pos - 1] == b'+' { 1 } else { -1 };
            self.tz_hour = cur.digits(2, "timezone hour")? as u8;
            cur.expect(b':')?;
            self.tz_minute = cur.digits(2, "timezone minute")? as u8;
        } else {
            return Err(cur.error("unexpected character in timezone"));
        }
        Ok(())
    }

    fn checked(self, cur: &Cursor<'_>) -> MetaResult<Self> {
        if !cur.at_end() {
            return Err(cur.error("extra characters at end"));
        }
        self.validate()
            .map_err(|e| cur.error(&e))
            .map(|()| self)
    }

    /// Check that all components are within range
    pub fn validate(&self) -> Result<(), String> {
        if self.month > 12 || (self.month == 0 && self.day != 0) {
            return Err("month is out of range".to_string());
        }
        if self.day != 0 && self.day > days_in_month(self.year, self.month) {
            return Err("day is out of range".to_string());
        }
        if self.has_time {
            if self.month == 0 || self.day == 0 {
                return Err("time requires a full date".to_string());
            }
            if self.hour > 23 || self.minute > 59 || self.second > 59 {
                return Err("time is out of range".to_string());
            }
        }
        if self.has_timezone && (self.tz_hour > 23 || self.tz_minute > 59) {
            return Err("timezone is out of range".to_string());
        }
        Ok(())
    }

    /// Format in the canonical XMP form
    ///
    /// - `YYYY`, `YYYY-MM`, `YYYY-MM-DD`
    /// - `YYYY-MM-DDThh:mm:ss[.fraction]` (trailing zeros trimmed)
    /// - followed by `Z` or `+hh:mm` when a timezone is present
    pub fn format(&self) -> String {
        let mut result = format!("{:04}", self.year);
        if self.month != 0 {
            result.push_str(&format!("-{:02}", self.month));
            if self.day != 0 {
                result.push_str(&format!("-{:02}", self.day));
            }
        }

        if self.has_time {
            result.push_str(&format!(
                "T{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second
            ));
            if self.nanosecond != 0 {
                let frac = format!("{:09}", self.nanosecond);
                result.push('.');
                result.push_str(frac.trim_end_matches('0'));
            }
        }

        if self.has_timezone {
            if self.tz_sign == 0 {
                result.push('Z');
            } else {
                let sign = if self.tz_sign < 0 { '-' } else { '+' };
                result.push_str(&format!("{}{:02}:{:02}", sign, self.tz_hour, self.tz_minute));
            }
        }

        result
    }
}

impl fmt::Display for MetaDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Normalize any supported date text to its canonical form
pub fn normalize_date(s: &str) -> MetaResult<String> {
    MetaDateTime::parse(s).map(|dt| dt.format())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_only() {
        let dt = MetaDateTime::parse_iso("2023").unwrap();
        assert_eq!(dt.year, 2023);
        assert_eq!(dt.month, 0);
        assert!(!dt.has_time);
        assert_eq!(dt.format(), "2023");
    }

    #[test]
    fn test_parse_year_month() {
        let dt = MetaDateTime::parse_iso("2023-12").unwrap();
        assert_eq!(dt.month, 12);
        assert_eq!(dt.day, 0);
        assert_eq!(dt.format(), "2023-12");
    }

    #[test]
    fn test_parse_iso_without_seconds() {
        let dt = MetaDateTime::parse_iso("2023-12-25T10:30+01:00").unwrap();
        assert_eq!(dt.format(), "2023-12-25T10:30:00+01:00");
    }

    #[test]
    fn test_parse_with_fractional_seconds() {
        let dt = MetaDateTime::parse_iso("2006-04-27T15:38:36.655+02:00").unwrap();
        assert_eq!(dt.nanosecond, 655_000_000);
        assert_eq!(dt.format(), "2006-04-27T15:38:36.655+02:00");
    }

    #[test]
    fn test_parse_exif() {
        let dt = MetaDateTime::parse_exif("2019:07:04 16:24:35").unwrap();
        assert_eq!(dt.format(), "2019-07-04T16:24:35");

        let dt = MetaDateTime::parse("2019:07:04").unwrap();
        assert_eq!(dt.format(), "2019-07-04");
    }

    #[test]
    fn test_parse_iptc() {
        assert_eq!(normalize_date("20190704").unwrap(), "2019-07-04");
    }

    #[test]
    fn test_utc() {
        let dt = MetaDateTime::parse("2023-12-25T10:30:00Z").unwrap();
        assert!(dt.has_timezone);
        assert_eq!(dt.tz_sign, 0);
        assert_eq!(dt.format(), "2023-12-25T10:30:00Z");
    }

    #[test]
    fn test_invalid_dates() {
        for bad in [
            "",
            "not-a-date",
            "2023-13-01",
            "2023-02-30",
            "0000:00:00 00:00:00",
            "2019:07:04 25:00:00",
            "2023-12-25T10:30:00+08",
            "2023-12-25 trailing",
        ] {
            let err = MetaDateTime::parse(bad).unwrap_err();
            assert!(matches!(err, MetaError::InvalidDate(_)), "{}", bad);
        }
    }

    #[test]
    fn test_leap_day() {
        assert!(MetaDateTime::parse("2024-02-29").is_ok());
        assert!(MetaDateTime::parse("2023-02-29").is_err());
    }

    #[test]
    fn test_round_trip() {
        for case in [
            "2023",
            "2023-12",
            "2023-12-25",
            "2023-12-25T10:30:00",
            "2023-12-25T10:30:00Z",
            "2023-12-25T10:30:00-05:30",
            "2023-12-25T10:30:00.123Z",
        ] {
            assert_eq!(normalize_date(case).unwrap(), case);
        }
    }
}
