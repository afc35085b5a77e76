//! Date-time grammar of the interchange format
//!
//! Wire form: `YYYYMMDD`, `YYYYMMDDHHMMSS`, or `YYYYMMDDHHMMSS.XXX`
//! (milliseconds), optionally followed by a bracketed GMT offset such as
//! `[-5:EST]` or `[+9.5:ACST]`. Offset-qualified values are normalized to
//! UTC; bare values are taken as-is, matching how producers that omit the
//! offset are handled in practice.

use crate::error::FieldError;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Parse a date-time in the format's grammar.
pub fn parse(raw: &str) -> Result<NaiveDateTime, FieldError> {
    let (base, offset_minutes) = split_offset(raw)?;

    let (digits, fraction) = match base.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (base, None),
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(raw, "expected numeric date"));
    }

    let millis = match fraction {
        None => 0,
        Some(f) => parse_fraction(raw, f)?,
    };

    let datetime = match digits.len() {
        8 => {
            if millis != 0 {
                return Err(invalid(raw, "fractional seconds without a time of day"));
            }
            parse_date(raw, digits)?
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| invalid(raw, "invalid time of day"))?
        }
        14 => {
            let date = parse_date(raw, &digits[..8])?;
            let hour = number(raw, &digits[8..10])?;
            let minute = number(raw, &digits[10..12])?;
            let second = number(raw, &digits[12..14])?;
            date.and_hms_milli_opt(hour, minute, second, millis)
                .ok_or_else(|| invalid(raw, "invalid time of day"))?
        }
        _ => return Err(invalid(raw, "unsupported length")),
    };

    // The wire value is local to its declared offset; subtracting the
    // offset yields UTC.
    datetime
        .checked_sub_signed(Duration::minutes(offset_minutes))
        .ok_or_else(|| invalid(raw, "offset out of range"))
}

fn invalid(value: &str, reason: &'static str) -> FieldError {
    FieldError::InvalidDateTime {
        value: value.to_string(),
        reason,
    }
}

/// Split a trailing `[{+|-}H[.F][:TZNAME]]` offset, returning the offset
/// in minutes (0 when absent).
fn split_offset(raw: &str) -> Result<(&str, i64), FieldError> {
    let Some(start) = raw.find('[') else {
        return Ok((raw, 0));
    };
    let Some(inner) = raw[start..].strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        return Err(invalid(raw, "malformed timezone offset"));
    };

    let hours_text = match inner.split_once(':') {
        Some((hours, _name)) => hours,
        None => inner,
    };
    let hours: f64 = hours_text
        .parse()
        .map_err(|_| invalid(raw, "malformed timezone offset"))?;
    if !(-12.0..=14.0).contains(&hours) {
        return Err(invalid(raw, "offset out of range"));
    }

    #[allow(clippy::cast_possible_truncation)]
    let minutes = (hours * 60.0).round() as i64;
    Ok((&raw[..start], minutes))
}

fn parse_fraction(raw: &str, fraction: &str) -> Result<u32, FieldError> {
    if fraction.is_empty()
        || fraction.len() > 3
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid(raw, "malformed fractional seconds"));
    }
    let value: u32 = fraction
        .parse()
        .map_err(|_| invalid(raw, "malformed fractional seconds"))?;
    // Scale to milliseconds: ".4" is 400ms, ".43" is 430ms.
    Ok(value * 10u32.pow(3 - fraction.len() as u32))
}

fn parse_date(raw: &str, digits: &str) -> Result<NaiveDate, FieldError> {
    let year: i32 = digits[..4]
        .parse()
        .map_err(|_| invalid(raw, "expected numeric date"))?;
    let month = number(raw, &digits[4..6])?;
    let day = number(raw, &digits[6..8])?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| invalid(raw, "invalid calendar date"))
}

fn number(raw: &str, digits: &str) -> Result<u32, FieldError> {
    digits
        .parse()
        .map_err(|_| invalid(raw, "expected numeric date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_date_only() {
        assert_eq!(parse("20230101").unwrap(), at(2023, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_date_and_time() {
        assert_eq!(parse("20230101120000").unwrap(), at(2023, 1, 1, 12, 0, 0));
    }

    #[test]
    fn test_milliseconds() {
        let parsed = parse("20051029101003.438").unwrap();
        assert_eq!(
            parsed,
            at(2005, 10, 29, 10, 10, 3) + Duration::milliseconds(438)
        );
    }

    #[test]
    fn test_offset_normalizes_to_utc() {
        let parsed = parse("20051029101003[-5:EST]").unwrap();
        assert_eq!(parsed, at(2005, 10, 29, 15, 10, 3));
    }

    #[test]
    fn test_fractional_offset() {
        let parsed = parse("19990405120000[+9.5:ACST]").unwrap();
        assert_eq!(parsed, at(1999, 4, 5, 2, 30, 0));
    }

    #[test]
    fn test_offset_without_name() {
        let parsed = parse("20230101000000[0]").unwrap();
        assert_eq!(parsed, at(2023, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in [
            "",
            "2023",
            "202301011200",
            "20231301",
            "20230230",
            "20230101256000",
            "20230101.5",
            "20230101120000.",
            "20230101120000.4444",
            "20230101120000[EST]",
            "20230101120000[-5:EST",
            "not-a-date",
        ] {
            assert!(parse(bad).is_err(), "accepted {bad:?}");
        }
    }
}
