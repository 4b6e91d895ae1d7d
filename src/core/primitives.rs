use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

pub fn unix_seconds_to_datetime(seconds: f64) -> ChartResult<DateTime<Utc>> {
    if !seconds.is_finite() {
        return Err(ChartError::InvalidData(
            "timestamp must be finite".to_owned(),
        ));
    }
    DateTime::<Utc>::from_timestamp_millis((seconds * 1000.0).round() as i64)
        .ok_or_else(|| ChartError::InvalidData(format!("timestamp {seconds} is out of range")))
}

/// Unix seconds of January 1st of `year`, UTC.
pub fn year_to_unix_seconds(year: i32) -> ChartResult<f64> {
    year_month_to_unix_seconds(year, 1)
}

/// Unix seconds of the first day of `year`-`month`, UTC.
pub fn year_month_to_unix_seconds(year: i32, month: u32) -> ChartResult<f64> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ChartError::InvalidData(format!("invalid year/month: {year}-{month}")))?;
    let time = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ChartError::InvalidData("invalid midnight".to_owned()))?
        .and_utc();
    Ok(datetime_to_unix_seconds(time))
}

/// `true` when `value` is present and finite.
#[must_use]
pub fn is_present(value: Option<f64>) -> bool {
    value.is_some_and(f64::is_finite)
}

/// Reads an optional value for aggregation: missing or NaN counts as zero.
#[must_use]
pub fn value_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{unix_seconds_to_datetime, value_or_zero, year_month_to_unix_seconds};
    use chrono::Datelike;

    #[test]
    fn year_month_round_trips_through_datetime() {
        let seconds = year_month_to_unix_seconds(2021, 3).expect("valid date");
        let time = unix_seconds_to_datetime(seconds).expect("valid timestamp");
        assert_eq!(time.year(), 2021);
        assert_eq!(time.month(), 3);
        assert_eq!(time.day(), 1);
    }

    #[test]
    fn invalid_month_is_rejected() {
        assert!(year_month_to_unix_seconds(2021, 13).is_err());
    }

    #[test]
    fn nan_and_missing_read_as_zero() {
        assert_eq!(value_or_zero(None), 0.0);
        assert_eq!(value_or_zero(Some(f64::NAN)), 0.0);
        assert_eq!(value_or_zero(Some(2.5)), 2.5);
    }
}
