//! Excel serial-date math (spec §6).
//!
//! Excel stores dates as an `f64` count of days since 1899-12-30 (the
//! epoch that makes 1900-01-01 serial `1`, preserving Lotus 1-2-3's
//! spurious 1900 leap day). An empirical `-0.00396991` day correction is
//! applied on conversion in both directions; this offset is carried over
//! unmodified from the reference implementation rather than re-derived,
//! since it compensates for a rounding behavior of Excel's own date
//! parser that is easier to match empirically than to re-derive.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Timelike};

/// Number of decimal places an Excel serial date is rendered with.
pub const SERIAL_PRECISION: usize = 8;

const EXCEL_EPOCH_CORRECTION_DAYS: f64 = -0.00396991;

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid calendar date")
}

/// Convert a timezone-aware instant into an Excel serial date number.
pub fn to_excel_serial(date: &DateTime<FixedOffset>) -> f64 {
    let naive = date.naive_local();
    let whole_days = (naive.date() - excel_epoch()).num_days() as f64;

    let seconds_in_day = naive.time().num_seconds_from_midnight() as f64
        + naive.time().nanosecond() as f64 / 1_000_000_000.0;
    let day_fraction = seconds_in_day / 86_400.0;

    let precision = 10f64.powi(SERIAL_PRECISION as i32);
    let raw = whole_days + day_fraction + EXCEL_EPOCH_CORRECTION_DAYS;
    (raw * precision).round() / precision
}

/// Convert an Excel serial date number back into a timezone-aware instant,
/// attaching `offset` since the serial number itself carries no timezone.
pub fn from_excel_serial(serial: f64, offset: FixedOffset) -> DateTime<FixedOffset> {
    let corrected = serial - EXCEL_EPOCH_CORRECTION_DAYS;
    let whole_days = corrected.floor() as i64;
    let day_fraction = corrected - corrected.floor();

    let date = excel_epoch() + Duration::days(whole_days);
    let total_seconds = (day_fraction * 86_400.0).round() as i64;

    let naive = date.and_hms_opt(0, 0, 0).expect("midnight is valid")
        + Duration::seconds(total_seconds);

    offset
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| offset.from_utc_datetime(&naive))
}
