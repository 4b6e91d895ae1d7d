use std::sync::Arc;

use crate::core::AxisType;
use crate::core::primitives::unix_seconds_to_datetime;

/// Host-supplied value-to-label formatter.
pub type Formatter = Arc<dyn Fn(f64) -> String + Send + Sync + 'static>;

/// Placeholder shown for absent values.
pub const MISSING_VALUE_LABEL: &str = "N/A";

/// Compact numeric SVG attribute text: at most two decimals, no trailing zeros.
#[must_use]
pub fn format_svg_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_owned();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    trim_decimals(format!("{rounded:.2}"))
}

fn trim_decimals(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Default human-readable number: `1.2k`, `3.4M`, `5B`, or up to two decimals.
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return MISSING_VALUE_LABEL.to_owned();
    }

    let magnitude = value.abs();
    for (threshold, suffix) in [(1e9, "B"), (1e6, "M"), (1e3, "k")] {
        if magnitude >= threshold {
            let scaled = (value / threshold * 10.0).round() / 10.0;
            return format!("{}{suffix}", trim_decimals(format!("{scaled:.1}")));
        }
    }

    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    trim_decimals(format!("{rounded:.2}"))
}

/// Formats an optional value, using `N/A` when absent.
#[must_use]
pub fn format_optional(value: Option<f64>, formatter: Option<&Formatter>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => formatter.map_or_else(|| format_number(v), |f| f(v)),
        None => MISSING_VALUE_LABEL.to_owned(),
    }
}

/// Default axis label for `value` under `axis_type`.
#[must_use]
pub fn format_axis_value(value: f64, axis_type: AxisType) -> String {
    match axis_type {
        AxisType::Number => format_number(value),
        AxisType::DateAnnual => unix_seconds_to_datetime(value)
            .map(|time| time.format("%Y").to_string())
            .unwrap_or_else(|_| MISSING_VALUE_LABEL.to_owned()),
        AxisType::DateMonthly => unix_seconds_to_datetime(value)
            .map(|time| time.format("%b %Y").to_string())
            .unwrap_or_else(|_| MISSING_VALUE_LABEL.to_owned()),
    }
}

/// Applies `formatter` when present, otherwise the axis-type default.
#[must_use]
pub fn format_with(value: f64, formatter: Option<&Formatter>, axis_type: AxisType) -> String {
    match formatter {
        Some(formatter) => formatter(value),
        None => format_axis_value(value, axis_type),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_axis_value, format_number, format_svg_number};
    use crate::core::AxisType;
    use crate::core::primitives::year_month_to_unix_seconds;

    #[test]
    fn svg_numbers_are_compact() {
        assert_eq!(format_svg_number(10.0), "10");
        assert_eq!(format_svg_number(1.5), "1.5");
        assert_eq!(format_svg_number(1.234_5), "1.23");
        assert_eq!(format_svg_number(-0.001), "0");
    }

    #[test]
    fn large_numbers_use_suffixes() {
        assert_eq!(format_number(1_250.0), "1.3k");
        assert_eq!(format_number(2_000_000.0), "2M");
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(f64::NAN), "N/A");
    }

    #[test]
    fn dates_use_calendar_formats() {
        let time = year_month_to_unix_seconds(2022, 7).expect("date");
        assert_eq!(format_axis_value(time, AxisType::DateAnnual), "2022");
        assert_eq!(format_axis_value(time, AxisType::DateMonthly), "Jul 2022");
    }
}
