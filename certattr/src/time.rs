// Licensed under the Apache-2.0 license

//! UTCTime and GeneralizedTime values. Times are seconds since the Unix
//! epoch and are always written in the `Z` (UTC) form with whole seconds.

use crate::error::AttributeError;

pub const UTC_TIME_SIZE: usize = 13;
pub const GENERALIZED_TIME_SIZE: usize = 15;

/// 1950-01-01T00:00:00Z, the first instant a UTCTime can carry
pub const UTC_TIME_MIN: i64 = -631_152_000;
/// 2049-12-31T23:59:59Z
pub const UTC_TIME_MAX: i64 = 2_524_607_999;

const SECONDS_PER_DAY: i64 = 86_400;

struct CivilTime {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
}

fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    (year, month, day)
}

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * 146_097 + doe - 719_468
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl CivilTime {
    fn from_timestamp(time: i64) -> CivilTime {
        let (year, month, day) = civil_from_days(time.div_euclid(SECONDS_PER_DAY));
        let seconds = time.rem_euclid(SECONDS_PER_DAY);

        CivilTime {
            year,
            month,
            day,
            hour: seconds / 3600,
            minute: (seconds / 60) % 60,
            second: seconds % 60,
        }
    }

    fn to_timestamp(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day) * SECONDS_PER_DAY
            + self.hour * 3600
            + self.minute * 60
            + self.second
    }
}

fn put_digits(out: &mut [u8], value: i64) {
    let mut value = value;
    for digit in out.iter_mut().rev() {
        *digit = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

fn get_digits(digits: &[u8]) -> Result<i64, AttributeError> {
    digits.iter().try_fold(0i64, |value, &c| {
        if c.is_ascii_digit() {
            Ok(value * 10 + (c - b'0') as i64)
        } else {
            Err(AttributeError::BadEncoding)
        }
    })
}

/// Parse "MMDDHHMMSSZ" following the year digits
fn parse_tail(year: i64, tail: &[u8]) -> Result<i64, AttributeError> {
    if tail.len() != 11 || tail[10] != b'Z' {
        return Err(AttributeError::BadEncoding);
    }
    let time = CivilTime {
        year,
        month: get_digits(&tail[0..2])?,
        day: get_digits(&tail[2..4])?,
        hour: get_digits(&tail[4..6])?,
        minute: get_digits(&tail[6..8])?,
        second: get_digits(&tail[8..10])?,
    };
    if !(1..=12).contains(&time.month)
        || time.day < 1
        || time.day > days_in_month(year, time.month)
        || time.hour > 23
        || time.minute > 59
        || time.second > 59
    {
        return Err(AttributeError::BadEncoding);
    }

    Ok(time.to_timestamp())
}

fn format_tail(time: &CivilTime, out: &mut [u8]) {
    put_digits(&mut out[0..2], time.month);
    put_digits(&mut out[2..4], time.day);
    put_digits(&mut out[4..6], time.hour);
    put_digits(&mut out[6..8], time.minute);
    put_digits(&mut out[8..10], time.second);
    out[10] = b'Z';
}

/// Format `time` as YYMMDDHHMMSSZ
pub fn encode_utc_time(time: i64) -> Result<[u8; UTC_TIME_SIZE], AttributeError> {
    if !(UTC_TIME_MIN..=UTC_TIME_MAX).contains(&time) {
        return Err(AttributeError::ValueTooLarge);
    }
    let civil = CivilTime::from_timestamp(time);
    let mut out = [0u8; UTC_TIME_SIZE];
    put_digits(&mut out[0..2], civil.year % 100);
    format_tail(&civil, &mut out[2..]);

    Ok(out)
}

/// Format `time` as YYYYMMDDHHMMSSZ
pub fn encode_generalized_time(time: i64) -> Result<[u8; GENERALIZED_TIME_SIZE], AttributeError> {
    let civil = CivilTime::from_timestamp(time);
    if !(0..=9999).contains(&civil.year) {
        return Err(AttributeError::ValueTooLarge);
    }
    let mut out = [0u8; GENERALIZED_TIME_SIZE];
    put_digits(&mut out[0..4], civil.year);
    format_tail(&civil, &mut out[4..]);

    Ok(out)
}

pub fn decode_utc_time(bytes: &[u8]) -> Result<i64, AttributeError> {
    if bytes.len() != UTC_TIME_SIZE {
        return Err(AttributeError::BadEncoding);
    }
    // RFC 5280 4.1.2.5.1: YY >= 50 is 19YY, otherwise 20YY
    let year = match get_digits(&bytes[0..2])? {
        year @ 50..=99 => 1900 + year,
        year => 2000 + year,
    };

    parse_tail(year, &bytes[2..])
}

pub fn decode_generalized_time(bytes: &[u8]) -> Result<i64, AttributeError> {
    if bytes.len() != GENERALIZED_TIME_SIZE {
        return Err(AttributeError::BadEncoding);
    }

    parse_tail(get_digits(&bytes[0..4])?, &bytes[4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generalized_time() {
        // 2023-09-14T12:34:56Z
        let time = 1_694_694_896;
        let encoded = encode_generalized_time(time).unwrap();
        assert_eq!(&encoded, b"20230914123456Z");
        assert_eq!(decode_generalized_time(&encoded).unwrap(), time);

        assert_eq!(&encode_generalized_time(0).unwrap(), b"19700101000000Z");
        assert_eq!(
            decode_generalized_time(b"20000229235959Z").unwrap(),
            951_868_799
        );
        assert!(decode_generalized_time(b"20010229000000Z").is_err());
        assert!(decode_generalized_time(b"20230914123456+").is_err());
    }

    #[test]
    fn test_utc_time() {
        assert_eq!(&encode_utc_time(UTC_TIME_MIN).unwrap(), b"500101000000Z");
        assert_eq!(&encode_utc_time(UTC_TIME_MAX).unwrap(), b"491231235959Z");
        assert!(encode_utc_time(UTC_TIME_MAX + 1).is_err());

        assert_eq!(decode_utc_time(b"500101000000Z").unwrap(), UTC_TIME_MIN);
        assert_eq!(decode_utc_time(b"491231235959Z").unwrap(), UTC_TIME_MAX);
        assert!(decode_utc_time(b"491331235959Z").is_err());
    }
}
