use std::cmp::Ordering;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortingDir {
    Asc,
    #[default]
    Desc,
}

/// Host-supplied ranking/truncation of chart items.
///
/// `criteria` names the field to sort by; `limit` caps the number of items
/// kept after sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterSpec {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub criteria: Option<String>,
    #[serde(default, rename = "sortingDir", alias = "sorting_dir")]
    pub sorting_dir: SortingDir,
}

impl FilterSpec {
    #[must_use]
    pub fn top(limit: usize, criteria: impl Into<String>) -> Self {
        Self {
            limit: Some(limit),
            criteria: Some(criteria.into()),
            sorting_dir: SortingDir::Desc,
        }
    }

    #[must_use]
    pub fn with_sorting_dir(mut self, sorting_dir: SortingDir) -> Self {
        self.sorting_dir = sorting_dir;
        self
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.limit.is_none() && self.criteria.is_none()
    }
}

/// Sorts `items` by the criteria value and truncates to the limit.
///
/// The sort is stable. Items whose criteria value is missing or NaN are
/// placed after every valued item, whatever the direction.
#[must_use]
pub fn apply_filter<T>(
    mut items: Vec<T>,
    spec: &FilterSpec,
    value_of: impl Fn(&T, &str) -> Option<f64>,
) -> Vec<T> {
    if let Some(criteria) = spec.criteria.as_deref() {
        let mut keyed: Vec<(Option<OrderedFloat<f64>>, T)> = items
            .into_iter()
            .map(|item| {
                let key = value_of(&item, criteria)
                    .filter(|v| !v.is_nan())
                    .map(OrderedFloat);
                (key, item)
            })
            .collect();

        keyed.sort_by(|(left, _), (right, _)| match (left, right) {
            (Some(left), Some(right)) => match spec.sorting_dir {
                SortingDir::Asc => left.cmp(right),
                SortingDir::Desc => right.cmp(left),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        items = keyed.into_iter().map(|(_, item)| item).collect();
    }

    if let Some(limit) = spec.limit {
        items.truncate(limit);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::{FilterSpec, SortingDir, apply_filter};

    fn value(item: &(&str, Option<f64>), _criteria: &str) -> Option<f64> {
        item.1
    }

    #[test]
    fn missing_values_sort_last_in_both_directions() {
        let items = vec![("a", None), ("b", Some(2.0)), ("c", Some(f64::NAN)), ("d", Some(1.0))];

        let desc = apply_filter(items.clone(), &FilterSpec::top(10, "v"), value);
        let labels: Vec<&str> = desc.iter().map(|item| item.0).collect();
        assert_eq!(labels, vec!["b", "d", "a", "c"]);

        let asc = apply_filter(
            items,
            &FilterSpec::top(10, "v").with_sorting_dir(SortingDir::Asc),
            value,
        );
        let labels: Vec<&str> = asc.iter().map(|item| item.0).collect();
        assert_eq!(labels, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn limit_without_criteria_keeps_input_order() {
        let spec = FilterSpec {
            limit: Some(1),
            ..FilterSpec::default()
        };
        let out = apply_filter(vec![("a", Some(1.0)), ("b", Some(5.0))], &spec, value);
        assert_eq!(out, vec![("a", Some(1.0))]);
    }

    #[test]
    fn filter_spec_parses_camel_case_direction_key() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"limit":3,"criteria":"total","sortingDir":"asc"}"#)
                .expect("filter json");
        assert_eq!(spec.sorting_dir, SortingDir::Asc);
        assert_eq!(spec.limit, Some(3));
    }
}
