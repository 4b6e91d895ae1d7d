use serde::{Deserialize, Serialize};

use crate::core::data::KeyedRecord;
use crate::core::primitives::value_or_zero;

/// One series' span inside a stacked column, in value units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSegment {
    pub key: String,
    pub value: f64,
    pub y0: f64,
    pub y1: f64,
}

/// All segments stacked for one category slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedColumn {
    pub category: String,
    pub x: Option<f64>,
    pub segments: Vec<StackSegment>,
    pub total: f64,
}

impl StackedColumn {
    #[must_use]
    pub fn segment(&self, key: &str) -> Option<&StackSegment> {
        self.segments.iter().find(|segment| segment.key == key)
    }
}

/// Stacks one record's values in `keys` order from a zero baseline.
///
/// Keys rejected by `is_active` are skipped before accumulation, so they add
/// nothing to the baseline or the total.
pub fn stack_record<S: AsRef<str>>(
    record: &KeyedRecord,
    keys: &[S],
    mut is_active: impl FnMut(&str) -> bool,
) -> StackedColumn {
    let mut baseline = 0.0;
    let mut segments = Vec::with_capacity(keys.len());
    for key in keys.iter().map(AsRef::as_ref) {
        if !is_active(key) {
            continue;
        }
        let value = value_or_zero(record.values.get(key).copied().flatten());
        let y0 = baseline;
        let y1 = y0 + value;
        segments.push(StackSegment {
            key: key.to_owned(),
            value,
            y0,
            y1,
        });
        baseline = y1;
    }

    StackedColumn {
        category: record.key.clone(),
        x: record.x,
        segments,
        total: baseline,
    }
}

pub fn stack_records<S: AsRef<str>>(
    records: &[KeyedRecord],
    keys: &[S],
    mut is_active: impl FnMut(&str) -> bool,
) -> Vec<StackedColumn> {
    records
        .iter()
        .map(|record| stack_record(record, keys, &mut is_active))
        .collect()
}

/// Largest column total; `0.0` for no columns.
#[must_use]
pub fn max_stack_total(columns: &[StackedColumn]) -> f64 {
    columns
        .iter()
        .map(|column| column.total)
        .filter(|total| total.is_finite())
        .fold(0.0, f64::max)
}

/// Smallest segment edge across columns; negative values pull this under zero.
#[must_use]
pub fn min_stack_edge(columns: &[StackedColumn]) -> f64 {
    columns
        .iter()
        .flat_map(|column| column.segments.iter())
        .flat_map(|segment| [segment.y0, segment.y1])
        .filter(|edge| edge.is_finite())
        .fold(0.0, f64::min)
}

#[cfg(test)]
mod tests {
    use super::{max_stack_total, stack_record, stack_records};
    use crate::core::data::KeyedRecord;

    #[test]
    fn segments_accumulate_in_key_order() {
        let record = KeyedRecord::new("2020")
            .with_value("a", 1.0)
            .with_value("b", 2.0)
            .with_value("c", 3.0);
        let column = stack_record(&record, &["c", "a", "b"], |_| true);

        let spans: Vec<(f64, f64)> = column.segments.iter().map(|s| (s.y0, s.y1)).collect();
        assert_eq!(spans, vec![(0.0, 3.0), (3.0, 4.0), (4.0, 6.0)]);
        assert_eq!(column.total, 6.0);
    }

    #[test]
    fn inactive_keys_take_no_space() {
        let record = KeyedRecord::new("2020")
            .with_value("a", 1.0)
            .with_value("b", 2.0)
            .with_value("c", 3.0);
        let column = stack_record(&record, &["a", "b", "c"], |key| key != "b");

        assert!(column.segment("b").is_none());
        let c = column.segment("c").expect("c segment");
        assert_eq!((c.y0, c.y1), (1.0, 4.0));
        assert_eq!(column.total, 4.0);
    }

    #[test]
    fn max_total_spans_columns() {
        let records = vec![
            KeyedRecord::new("x").with_value("a", 1.0).with_value("b", 1.0),
            KeyedRecord::new("y").with_value("a", 4.0).with_missing("b"),
        ];
        let columns = stack_records(&records, &["a", "b"], |_| true);
        assert_eq!(max_stack_total(&columns), 4.0);
    }
}
