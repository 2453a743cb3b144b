use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{GeneratorError, Result};

pub const DEFAULT_YEAR: i32 = 2020;
/// Orders cluster around lunch and the evening.
pub const PEAK_HOURS: [u32; 2] = [12, 20];
pub const JITTER_STD_DEV_MINUTES: f64 = 180.0;
pub const DATE_FORMAT: &str = "%m/%d/%y %H:%M";

pub fn days_in_month(month: u32, year: i32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| GeneratorError::InvalidArgument(format!("month {} of {}", month, year)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| GeneratorError::InvalidArgument(format!("month after {} of {}", month, year)))?;
    Ok((next - first).num_days() as u32)
}

/// Uniform day of the month, one of the peak hours, plus Gaussian jitter.
///
/// Jitter is not clamped: a late order on the last day may land in the next
/// month. The result is truncated to the minute.
pub fn sample_order_timestamp<R: Rng + ?Sized>(
    month: u32,
    year: i32,
    rng: &mut R,
) -> Result<NaiveDateTime> {
    let day = rng.gen_range(1..=days_in_month(month, year)?);
    let hour = if rng.gen::<f64>() < 0.5 { PEAK_HOURS[0] } else { PEAK_HOURS[1] };

    let base = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .ok_or_else(|| GeneratorError::InvalidArgument(format!("{}-{}-{} {}:00", year, month, day, hour)))?;

    let offset_minutes = rng.sample::<f64, _>(StandardNormal) * JITTER_STD_DEV_MINUTES;
    let jittered = base + Duration::microseconds((offset_minutes * 60_000_000.0) as i64);

    Ok(jittered
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(jittered))
}

pub fn format_order_date(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}

pub fn parse_order_date(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| GeneratorError::InvalidArgument(format!("order date {:?}: {}", text, e)))
}
