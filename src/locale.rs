//! Locale-aware parsing of scalar field text
//!
//! A [`Locale`] decides how numbers, booleans, dates, times and durations
//! are read from decoded field text. [`Locale::invariant`] is culture-neutral
//! and is what the parser uses unless told otherwise.

use crate::error::ConvertError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::borrow::Cow;

const NANOS_PER_SECOND: u32 = 1_000_000_000;
const MAX_FRACTION_DIGITS: usize = 7;

/// Number and date conventions used when converting field text
///
/// # Examples
///
/// ```
/// use csvbind::Locale;
///
/// let german = Locale::invariant()
///     .with_decimal_separator(',')
///     .with_group_separator(Some('.'))
///     .with_date_formats(&["%d.%m.%Y"]);
///
/// assert_eq!(german.parse_float("1.234,5").unwrap(), 1234.5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locale {
    /// Decimal separator for floats and duration fractions
    pub decimal_separator: char,
    /// Thousands separator accepted in floats
    pub group_separator: Option<char>,
    /// `chrono` formats tried in order for dates
    pub date_formats: Vec<String>,
    /// `chrono` formats tried in order for times of day
    pub time_formats: Vec<String>,
    /// `chrono` formats tried in order for date-times, before falling back to dates
    pub datetime_formats: Vec<String>,
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

fn owned(formats: &[&str]) -> Vec<String> {
    formats.iter().map(|f| f.to_string()).collect()
}

impl Locale {
    /// Culture-neutral conventions
    ///
    /// - `.` decimal separator, `,` accepted as thousands separator in floats
    /// - dates: `yyyy-MM-dd`, `MM/dd/yyyy`, `yyyy/MM/dd`
    /// - date-times: any date followed by ` HH:mm[:ss[.f]]` or `THH:mm[:ss[.f]]`, or RFC 3339
    /// - times: `HH:mm:ss[.f]`, `HH:mm`
    pub fn invariant() -> Self {
        Locale {
            decimal_separator: '.',
            group_separator: Some(','),
            date_formats: owned(&["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"]),
            time_formats: owned(&["%H:%M:%S%.f", "%H:%M"]),
            datetime_formats: owned(&[
                "%Y-%m-%d %H:%M:%S%.f",
                "%Y-%m-%dT%H:%M:%S%.f",
                "%Y-%m-%d %H:%M",
                "%Y-%m-%dT%H:%M",
                "%m/%d/%Y %H:%M:%S%.f",
                "%m/%d/%Y %H:%M",
                "%Y/%m/%d %H:%M:%S%.f",
            ]),
        }
    }

    /// Set decimal separator (builder pattern)
    pub fn with_decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = separator;
        self
    }

    /// Set thousands separator (builder pattern)
    pub fn with_group_separator(mut self, separator: Option<char>) -> Self {
        self.group_separator = separator;
        self
    }

    /// Replace date formats (builder pattern)
    pub fn with_date_formats(mut self, formats: &[&str]) -> Self {
        self.date_formats = owned(formats);
        self
    }

    /// Replace time formats (builder pattern)
    pub fn with_time_formats(mut self, formats: &[&str]) -> Self {
        self.time_formats = owned(formats);
        self
    }

    /// Replace date-time formats (builder pattern)
    pub fn with_datetime_formats(mut self, formats: &[&str]) -> Self {
        self.datetime_formats = owned(formats);
        self
    }

    /// Parse `true` / `false`, ignoring case and surrounding whitespace
    pub fn parse_bool(&self, text: &str) -> Result<bool, ConvertError> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConvertError::invalid("bool", text))
        }
    }

    /// Parse a signed integer with optional leading sign
    pub fn parse_int(&self, text: &str) -> Result<i64, ConvertError> {
        text.trim()
            .parse()
            .map_err(|_| ConvertError::invalid("int", text))
    }

    /// Parse an unsigned integer
    pub fn parse_uint(&self, text: &str) -> Result<u64, ConvertError> {
        text.trim()
            .parse()
            .map_err(|_| ConvertError::invalid("uint", text))
    }

    /// Parse a float using this locale's separators
    pub fn parse_float(&self, text: &str) -> Result<f64, ConvertError> {
        let trimmed = text.trim();
        let normalized = self.normalize_number(trimmed);
        normalized
            .parse()
            .map_err(|_| ConvertError::invalid("float", text))
    }

    /// Rewrite locale separators into the form `str::parse` expects
    fn normalize_number<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let group = self
            .group_separator
            .filter(|&g| g != self.decimal_separator && text.contains(g));
        if self.decimal_separator == '.' && group.is_none() {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if Some(c) == group {
                continue;
            }
            if c == self.decimal_separator {
                out.push('.');
            } else if c == '.' {
                // a literal dot is not a decimal point here
                out.push('\u{0}');
            } else {
                out.push(c);
            }
        }
        Cow::Owned(out)
    }

    /// Parse a calendar date
    pub fn parse_date(&self, text: &str) -> Result<NaiveDate, ConvertError> {
        let trimmed = text.trim();
        self.date_formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
            .ok_or_else(|| ConvertError::invalid("date", text))
    }

    /// Parse a time of day
    pub fn parse_time(&self, text: &str) -> Result<NaiveTime, ConvertError> {
        let trimmed = text.trim();
        self.time_formats
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(trimmed, f).ok())
            .ok_or_else(|| ConvertError::invalid("time", text))
    }

    /// Parse a date-time; a bare date resolves to midnight
    ///
    /// RFC 3339 text with an offset is converted to UTC.
    pub fn parse_datetime(&self, text: &str) -> Result<NaiveDateTime, ConvertError> {
        let trimmed = text.trim();
        self.datetime_formats
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
            .or_else(|| {
                DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|dt| dt.naive_utc())
            })
            .or_else(|| {
                self.date_formats
                    .iter()
                    .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
            .ok_or_else(|| ConvertError::invalid("datetime", text))
    }

    /// Parse a time span
    ///
    /// Accepted forms: `[-]d` (whole days) and `[-][d.]hh:mm[:ss[.fffffff]]`.
    /// The fraction may use `.` or the locale's decimal separator.
    pub fn parse_duration(&self, text: &str) -> Result<TimeDelta, ConvertError> {
        let invalid = || ConvertError::invalid("duration", text);
        let trimmed = text.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (days, clock) = match body.find(':') {
            None => (digits(body).ok_or_else(invalid)?, None),
            Some(colon) => match body[..colon].find('.') {
                Some(dot) => (digits(&body[..dot]).ok_or_else(invalid)?, Some(&body[dot + 1..])),
                None => (0, Some(body)),
            },
        };

        let mut seconds = days.checked_mul(86_400).ok_or_else(invalid)?;
        let mut nanos = 0;
        if let Some(clock) = clock {
            let mut parts = clock.split(':');
            let hours = parts.next().and_then(digits).filter(|h| *h < 24);
            let minutes = parts.next().and_then(digits).filter(|m| *m < 60);
            let (hours, minutes) = hours.zip(minutes).ok_or_else(invalid)?;

            let secs = match parts.next() {
                Some(part) => {
                    let (whole, fraction) = self.split_fraction(part);
                    nanos = match fraction {
                        Some(f) => fraction_nanos(f).ok_or_else(invalid)?,
                        None => 0,
                    };
                    digits(whole).filter(|s| *s < 60).ok_or_else(invalid)?
                }
                None => 0,
            };
            if parts.next().is_some() {
                return Err(invalid());
            }
            seconds = seconds
                .checked_add(hours * 3_600 + minutes * 60 + secs)
                .ok_or_else(invalid)?;
        }

        let span = TimeDelta::try_seconds(seconds)
            .and_then(|s| s.checked_add(&TimeDelta::nanoseconds(i64::from(nanos))))
            .ok_or_else(invalid)?;
        Ok(if negative { -span } else { span })
    }

    fn split_fraction<'t>(&self, part: &'t str) -> (&'t str, Option<&'t str>) {
        match part.find(|c| c == '.' || c == self.decimal_separator) {
            Some(i) => {
                let sep_len = part[i..].chars().next().map_or(1, char::len_utf8);
                (&part[..i], Some(&part[i + sep_len..]))
            }
            None => (part, None),
        }
    }
}

fn digits(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Fractional seconds, up to seven digits (100ns ticks)
fn fraction_nanos(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > MAX_FRACTION_DIGITS || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = text.parse().ok()?;
    let scale = 10u32.pow(9 - text.len() as u32);
    let nanos = value * scale;
    (nanos < NANOS_PER_SECOND).then_some(nanos)
}
