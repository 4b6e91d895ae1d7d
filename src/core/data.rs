use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{decimal_to_f64, value_or_zero};
use crate::error::{ChartError, ChartResult};

/// A record keyed by category (or date label) carrying one value per series key.
///
/// `x` is the numeric position for continuous axes (unix seconds for date
/// axes); band-based charts place records by `key` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRecord {
    pub key: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub values: IndexMap<String, Option<f64>>,
    #[serde(default)]
    pub color: Option<String>,
}

impl KeyedRecord {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            x: None,
            values: IndexMap::new(),
            color: None,
        }
    }

    #[must_use]
    pub fn at(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    #[must_use]
    pub fn with_value(mut self, series: impl Into<String>, value: f64) -> Self {
        self.values.insert(series.into(), Some(value));
        self
    }

    #[must_use]
    pub fn with_missing(mut self, series: impl Into<String>) -> Self {
        self.values.insert(series.into(), None);
        self
    }

    pub fn with_decimal_value(
        mut self,
        series: impl Into<String>,
        value: Decimal,
    ) -> ChartResult<Self> {
        let series = series.into();
        let value = decimal_to_f64(value, &series)?;
        self.values.insert(series, Some(value));
        Ok(self)
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Raw value for `series`, `None` when absent, null or NaN.
    #[must_use]
    pub fn value(&self, series: &str) -> Option<f64> {
        self.values
            .get(series)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }

    /// Sum of the values of `keys` accepted by `include`; missing values count as zero.
    pub fn total<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
        mut include: impl FnMut(&str) -> bool,
    ) -> f64 {
        keys.into_iter()
            .filter(|key| include(key))
            .map(|key| value_or_zero(self.values.get(key).copied().flatten()))
            .sum()
    }

    /// Sort value for a filter criteria: `"total"` sums the keys accepted by
    /// `include`, `"x"` reads the position, anything else names a series.
    pub fn criteria_value(&self, criteria: &str, include: impl FnMut(&str) -> bool) -> Option<f64> {
        match criteria {
            "total" => Some(self.total(self.values.keys().map(String::as_str), include)),
            "x" => self.x.filter(|v| v.is_finite()),
            series => self.value(series),
        }
    }
}

/// Parses a JSON dataset of any chart's input shape.
pub fn dataset_from_json<T: serde::de::DeserializeOwned>(input: &str) -> ChartResult<T> {
    serde_json::from_str(input)
        .map_err(|e| ChartError::Serialization(format!("failed to parse dataset: {e}")))
}

/// Collects series keys across records in first-seen order.
#[must_use]
pub fn record_keys(records: &[KeyedRecord]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for key in record.values.keys() {
            if !keys.iter().any(|existing| existing == key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub x: f64,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default = "default_certain")]
    pub certain: bool,
}

fn default_certain() -> bool {
    true
}

impl LinePoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y: Some(y),
            certain: true,
        }
    }

    #[must_use]
    pub fn missing(x: f64) -> Self {
        Self {
            x,
            y: None,
            certain: true,
        }
    }

    #[must_use]
    pub fn uncertain(mut self) -> Self {
        self.certain = false;
        self
    }

    #[must_use]
    pub fn defined_y(self) -> Option<f64> {
        self.y.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    pub points: Vec<LinePoint>,
}

impl LineSeries {
    #[must_use]
    pub fn new(label: impl Into<String>, points: Vec<LinePoint>) -> Self {
        Self {
            label: label.into(),
            color: None,
            points,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    pub x: f64,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub value: Option<f64>,
}

impl RangePoint {
    pub fn new(x: f64, min: f64, max: f64) -> ChartResult<Self> {
        if !x.is_finite() || !min.is_finite() || !max.is_finite() {
            return Err(ChartError::InvalidData(
                "range point fields must be finite".to_owned(),
            ));
        }
        if min > max {
            return Err(ChartError::InvalidData(
                "range point min must be <= max".to_owned(),
            ));
        }
        Ok(Self {
            x,
            min,
            max,
            value: None,
        })
    }

    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSeries {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    pub points: Vec<RangePoint>,
}

impl RangeSeries {
    #[must_use]
    pub fn new(label: impl Into<String>, points: Vec<RangePoint>) -> Self {
        Self {
            label: label.into(),
            color: None,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ScatterPoint {
    #[must_use]
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            label: label.into(),
            x,
            y,
            size: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSeries {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    pub values: IndexMap<String, Option<f64>>,
}

impl RadarSeries {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
            values: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_value(mut self, axis: impl Into<String>, value: f64) -> Self {
        self.values.insert(axis.into(), Some(value));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableBarItem {
    pub label: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub based_value: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ComparableBarItem {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
            based_value: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_based_value(mut self, based_value: f64) -> Self {
        self.based_value = Some(based_value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualBarItem {
    pub label: String,
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub right: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

impl DualBarItem {
    #[must_use]
    pub fn new(label: impl Into<String>, left: f64, right: f64) -> Self {
        Self {
            label: label.into(),
            left: Some(left),
            right: Some(right),
            color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyedRecord, record_keys};

    #[test]
    fn total_skips_excluded_and_missing_values() {
        let record = KeyedRecord::new("2020")
            .with_value("a", 2.0)
            .with_value("b", f64::NAN)
            .with_missing("c")
            .with_value("d", 3.0);

        let total = record.total(["a", "b", "c", "d"], |key| key != "d");
        assert_eq!(total, 2.0);
    }

    #[test]
    fn record_keys_keep_first_seen_order() {
        let records = vec![
            KeyedRecord::new("x").with_value("b", 1.0).with_value("a", 1.0),
            KeyedRecord::new("y").with_value("c", 1.0).with_value("a", 1.0),
        ];
        assert_eq!(record_keys(&records), vec!["b", "a", "c"]);
    }
}
