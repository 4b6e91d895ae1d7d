use chart_svg::core::{FilterSpec, KeyedRecord, SortingDir, apply_filter, stack_record};
use proptest::prelude::*;

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

fn record_from(values: &[f64]) -> KeyedRecord {
    values
        .iter()
        .zip(KEYS)
        .fold(KeyedRecord::new("row"), |record, (value, key)| {
            record.with_value(key, *value)
        })
}

proptest! {
    #[test]
    fn stack_total_sums_only_active_keys(
        values in prop::collection::vec(0.0f64..1_000.0, 4),
        disabled in prop::collection::vec(any::<bool>(), 4)
    ) {
        let record = record_from(&values);
        let is_active = |key: &str| {
            KEYS.iter()
                .position(|k| *k == key)
                .is_some_and(|index| !disabled[index])
        };
        let column = stack_record(&record, &KEYS, is_active);

        let expected: f64 = values
            .iter()
            .zip(&disabled)
            .filter(|(_, off)| !**off)
            .map(|(value, _)| *value)
            .sum();
        prop_assert!((column.total - expected).abs() <= 1e-9);
        prop_assert_eq!(
            column.segments.len(),
            disabled.iter().filter(|off| !**off).count()
        );

        let mut baseline = 0.0;
        for segment in &column.segments {
            prop_assert!((segment.y0 - baseline).abs() <= 1e-9);
            prop_assert!(segment.y1 >= segment.y0);
            baseline = segment.y1;
        }
    }

    #[test]
    fn filter_respects_limit_and_direction(
        values in prop::collection::vec(prop::option::of(-1_000.0f64..1_000.0), 0..40),
        limit in 1usize..50,
        ascending in any::<bool>()
    ) {
        let direction = if ascending { SortingDir::Asc } else { SortingDir::Desc };
        let spec = FilterSpec::top(limit, "value").with_sorting_dir(direction);
        let out = apply_filter(values.clone(), &spec, |value, _| *value);

        prop_assert!(out.len() <= limit);
        prop_assert_eq!(out.len(), values.len().min(limit));

        let present: Vec<f64> = out.iter().flatten().copied().collect();
        let first_missing = out.iter().position(Option::is_none).unwrap_or(out.len());
        prop_assert!(out[first_missing..].iter().all(Option::is_none));
        for pair in present.windows(2) {
            if ascending {
                prop_assert!(pair[0] <= pair[1]);
            } else {
                prop_assert!(pair[0] >= pair[1]);
            }
        }
    }
}
