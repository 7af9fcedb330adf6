//! Spreadsheet date serial conversion

use chrono::{Duration, NaiveDate, NaiveDateTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Convert a date serial into a calendar date and time.
///
/// The 1900 system reproduces the 1900 leap-year bug: serial 60 is the
/// fictional 29 February 1900, which has no calendar counterpart and is
/// reported as 28 February. Fractions are rounded to the nearest second.
/// Returns `None` for negative or out-of-range serials.
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    let mut days = serial.trunc() as i64;
    let mut seconds = ((serial - serial.trunc()) * SECONDS_PER_DAY).round() as i64;
    if seconds >= SECONDS_PER_DAY as i64 {
        days += 1;
        seconds = 0;
    }

    let date = if date_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?.checked_add_signed(Duration::days(days))?
    } else {
        let adjusted = match days {
            0..=59 => days,
            60 => 59,
            _ => days - 1,
        };
        NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_signed(Duration::days(adjusted))?
    };

    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}
