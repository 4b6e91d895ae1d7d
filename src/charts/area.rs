use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, AxisOrientation, ChartMetadata, ChartType, LinearAxis};
use crate::core::{DomainOptions, KeyedRecord, area_path, line_path, stack_records};
use crate::error::ChartResult;
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, XScale, fit_y_scale, resolve_keys, tooltip_value};

const HOVER_CLASSES: &[&str] = &["area", "area-line"];

/// Filled areas over a continuous x axis, stacked by default.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaChart {
    records: Vec<KeyedRecord>,
    keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaPointLayout {
    pub category: String,
    pub x: f64,
    pub y0: f64,
    pub y1: f64,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSeriesLayout {
    pub label: String,
    pub color: String,
    pub points: Vec<AreaPointLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaLayout {
    pub stacked: bool,
    pub series: Vec<AreaSeriesLayout>,
}

impl AreaChart {
    #[must_use]
    pub fn new(records: Vec<KeyedRecord>) -> Self {
        Self {
            records,
            keys: Vec::new(),
        }
    }

    /// Fixes the series (and stacking) order; otherwise keys are taken from
    /// the records in first-seen order.
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        resolve_keys(&self.keys, &self.records)
    }

    /// Records that have an x position, ordered by it.
    fn positioned_records(&self) -> Vec<KeyedRecord> {
        let mut records: Vec<KeyedRecord> = self
            .records
            .iter()
            .filter(|record| record.x.is_some_and(f64::is_finite))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.x.unwrap_or_default()
                .total_cmp(&b.x.unwrap_or_default())
        });
        records
    }

    /// Value-space `(key, y0, y1)` of every drawn key for each record. A key
    /// without a finite value is left out, which breaks its area there.
    fn spans(&self, records: &[KeyedRecord], scope: &ChartScope<'_>) -> Vec<Vec<(String, f64, f64)>> {
        let keys = self.keys();
        let ctx = scope.context;
        if scope.config.stacked {
            stack_records(records, &keys, |key| ctx.is_active(key))
                .into_iter()
                .map(|column| {
                    column
                        .segments
                        .into_iter()
                        .map(|segment| (segment.key, segment.y0, segment.y1))
                        .collect()
                })
                .collect()
        } else {
            records
                .iter()
                .map(|record| {
                    keys.iter()
                        .filter(|key| ctx.is_active(key))
                        .filter_map(|key| {
                            let value = record.value(key).filter(|v| v.is_finite())?;
                            Some((key.clone(), 0.0, value))
                        })
                        .collect()
                })
                .collect()
        }
    }
}

impl Chart for AreaChart {
    type Dataset = Vec<KeyedRecord>;

    fn chart_type(&self) -> ChartType {
        ChartType::Area
    }

    fn dataset(&self) -> &Self::Dataset {
        &self.records
    }

    fn set_dataset(&mut self, dataset: Self::Dataset) {
        self.records = dataset;
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn labels(&self) -> Vec<String> {
        self.keys()
    }

    /// An area spans every record, so record colors never apply to it.
    fn embedded_color(&self, _label: &str) -> Option<&str> {
        None
    }

    fn hover_classes(&self) -> &'static [&'static str] {
        HOVER_CLASSES
    }

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild> {
        let records = self.positioned_records();
        let keys = self.keys();
        let active = scope.context.active_labels(&keys);
        let spans = self.spans(&records, scope);

        let x = XScale::fit(records.iter().filter_map(|r| r.x), scope)?;
        let y = fit_y_scale(
            spans
                .iter()
                .flat_map(|column| column.iter().flat_map(|(_, y0, y1)| [*y0, *y1])),
            DomainOptions {
                include_zero: true,
                ..scope.config.y_domain
            },
            scope.plot,
        )?;

        let mut layout = AreaLayout {
            stacked: scope.config.stacked,
            series: Vec::with_capacity(active.len()),
        };
        let mut areas = SvgElement::group().with_class("areas");
        for label in &active {
            let color = scope.color(label, None);
            let mut top = Vec::with_capacity(records.len());
            let mut bottom = Vec::with_capacity(records.len());
            let mut points = Vec::with_capacity(records.len());
            for (record, column) in records.iter().zip(spans.iter()) {
                let Some((_, y0, y1)) = column.iter().find(|(key, _, _)| key == label) else {
                    top.push(None);
                    bottom.push(None);
                    continue;
                };
                let px = x.scale(record.x.unwrap_or_default());
                top.push(Some((px, y.scale(*y1))));
                bottom.push(Some((px, y.scale(*y0))));
                points.push(AreaPointLayout {
                    category: record.key.clone(),
                    x: px,
                    y0: y.scale(*y0),
                    y1: y.scale(*y1),
                    value: record.value(label),
                });
            }

            let opacity = scope.opacity(label);
            areas.push(
                SvgElement::path(area_path(&top, &bottom, scope.config.curve))
                    .with_class(scope.shape_class("area", label))
                    .with_label(label)
                    .with_attr("fill", &color)
                    .with_num("fill-opacity", 0.6 * opacity),
            );
            areas.push(
                SvgElement::path(line_path(&top, scope.config.curve))
                    .with_class(scope.shape_class("area-line", label))
                    .with_label(label)
                    .with_attr("fill", "none")
                    .with_attr("stroke", &color)
                    .with_attr("stroke-width", 1.5)
                    .with_num("opacity", opacity),
            );
            layout.series.push(AreaSeriesLayout {
                label: label.clone(),
                color,
                points,
            });
        }

        let body = SvgElement::group()
            .with_class("chart area-chart")
            .with_child(
                LinearAxis::new(y, AxisOrientation::Left).render(
                    scope.plot,
                    &scope.config.axis,
                    scope.formatters.y.as_ref(),
                ),
            )
            .with_child(x.render_axis(scope)?)
            .with_child(areas);

        debug!(records = records.len(), series = active.len(), "built area chart");
        let mut metadata = ChartMetadata::new(ChartType::Area).with_rendered(&layout);
        metadata.x_axis_domain = AxisDomain::numeric(x.domain());
        metadata.y_axis_domain = AxisDomain::numeric(y.domain());
        metadata.visible_items = active;
        Ok(ChartBuild { body, metadata })
    }

    fn tooltip_lines(
        &self,
        label: &str,
        category: Option<&str>,
        scope: &ChartScope<'_>,
    ) -> Vec<String> {
        let mut lines = vec![scope.display_name(label).to_owned()];
        match category.and_then(|key| self.records.iter().find(|r| r.key == key)) {
            Some(record) => lines.push(format!(
                "{}: {}",
                record.key,
                tooltip_value(record.value(label), scope)
            )),
            None => {
                let total: f64 = self.records.iter().filter_map(|r| r.value(label)).sum();
                lines.push(format!("Total: {}", tooltip_value(Some(total), scope)));
            }
        }
        lines
    }
}
