use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::ColorMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Area,
    BarBell,
    ComparableHorizontalBar,
    DualHorizontalBar,
    Line,
    Radar,
    Range,
    Ribbon,
    Scatter,
    VerticalStackBar,
}

/// Visible domain of one axis as reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisDomain {
    Numeric {
        min: f64,
        max: f64,
    },
    Categorical {
        values: Vec<String>,
    },
    #[default]
    None,
}

impl AxisDomain {
    #[must_use]
    pub fn numeric(domain: (f64, f64)) -> Self {
        Self::Numeric {
            min: domain.0,
            max: domain.1,
        }
    }

    #[must_use]
    pub fn categorical(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Categorical {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// One legend entry. Hover state is not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendItem {
    pub label: String,
    pub color: String,
    pub disabled: bool,
}

/// Summary of one committed render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub chart_type: ChartType,
    pub x_axis_domain: AxisDomain,
    pub y_axis_domain: AxisDomain,
    pub visible_items: Vec<String>,
    pub rendered_data: Value,
    #[serde(default)]
    pub legend_data: Option<Vec<LegendItem>>,
}

impl ChartMetadata {
    #[must_use]
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            x_axis_domain: AxisDomain::None,
            y_axis_domain: AxisDomain::None,
            visible_items: Vec::new(),
            rendered_data: Value::Null,
            legend_data: None,
        }
    }

    /// Serializes `data` into `rendered_data`; failures leave `Null` behind.
    #[must_use]
    pub fn with_rendered<T: Serialize>(mut self, data: &T) -> Self {
        self.rendered_data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "rendered data is not serializable");
                Value::Null
            }
        };
        self
    }

    /// Names of the top-level fields that differ from `previous`.
    #[must_use]
    pub fn changed_fields(&self, previous: &Self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.chart_type != previous.chart_type {
            changed.push("chart_type");
        }
        if json_differs(&self.x_axis_domain, &previous.x_axis_domain) {
            changed.push("x_axis_domain");
        }
        if json_differs(&self.y_axis_domain, &previous.y_axis_domain) {
            changed.push("y_axis_domain");
        }
        if self.visible_items != previous.visible_items {
            changed.push("visible_items");
        }
        if self.rendered_data != previous.rendered_data {
            changed.push("rendered_data");
        }
        if json_differs(&self.legend_data, &previous.legend_data) {
            changed.push("legend_data");
        }
        changed
    }
}

/// Compares through JSON so that e.g. `NaN` domains compare equal to themselves.
fn json_differs<T: Serialize>(left: &T, right: &T) -> bool {
    match (serde_json::to_value(left), serde_json::to_value(right)) {
        (Ok(left), Ok(right)) => left != right,
        _ => true,
    }
}

/// Remembers the last value seen and reports whether a new one differs.
///
/// The stored snapshot is replaced on every check, changed or not.
#[derive(Debug, Clone)]
pub struct ChangeGate<T> {
    last: Option<Value>,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Default for ChangeGate<T> {
    fn default() -> Self {
        Self {
            last: None,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: Serialize> ChangeGate<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` on the first call and whenever `next` serializes differently.
    pub fn check(&mut self, next: &T) -> bool {
        let next = match serde_json::to_value(next) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "change gate value is not serializable");
                self.last = None;
                return true;
            }
        };
        let changed = self.last.as_ref() != Some(&next);
        self.last = Some(next);
        changed
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.last.is_some()
    }
}

pub type MetadataCallback = Box<dyn FnMut(&ChartMetadata)>;
pub type ColorMappingCallback = Box<dyn FnMut(&ColorMapping)>;
pub type LegendCallback = Box<dyn FnMut(&[LegendItem])>;
pub type HighlightCallback = Box<dyn FnMut(&[String])>;

/// Fires `on_chart_data_processed` only when the metadata changed.
#[derive(Default)]
pub struct MetadataEmitter {
    gate: ChangeGate<ChartMetadata>,
    last: Option<ChartMetadata>,
    callback: Option<MetadataCallback>,
    emitted: u64,
}

impl std::fmt::Debug for MetadataEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataEmitter")
            .field("has_callback", &self.callback.is_some())
            .field("emitted", &self.emitted)
            .finish()
    }
}

impl MetadataEmitter {
    pub fn set_callback(&mut self, callback: Option<MetadataCallback>) {
        self.callback = callback;
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChartMetadata> {
        self.last.as_ref()
    }

    /// Number of times the callback has been invoked.
    #[must_use]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Records `metadata`; invokes the callback when it differs from the
    /// previous snapshot. Returns whether it differed.
    pub fn emit(&mut self, metadata: ChartMetadata) -> bool {
        let changed = self.gate.check(&metadata);
        if changed {
            if let Some(previous) = &self.last {
                debug!(
                    fields = ?metadata.changed_fields(previous),
                    chart_type = ?metadata.chart_type,
                    "chart metadata changed"
                );
            }
            if let Some(callback) = self.callback.as_mut() {
                callback(&metadata);
                self.emitted += 1;
            }
        }
        self.last = Some(metadata);
        changed
    }

    pub fn reset(&mut self) {
        self.gate.reset();
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisDomain, ChangeGate, ChartMetadata, ChartType};

    #[test]
    fn gate_reports_first_and_changed_values_only() {
        let mut gate = ChangeGate::<Vec<i32>>::new();
        assert!(gate.check(&vec![1]));
        assert!(!gate.check(&vec![1]));
        assert!(gate.check(&vec![1, 2]));
        assert!(!gate.check(&vec![1, 2]));
    }

    #[test]
    fn changed_fields_name_the_differences() {
        let base = ChartMetadata::new(ChartType::Line);
        let mut next = base.clone();
        next.y_axis_domain = AxisDomain::numeric((0.0, 10.0));
        next.visible_items = vec!["a".to_owned()];

        assert_eq!(next.changed_fields(&base), vec!["y_axis_domain", "visible_items"]);
    }
}
