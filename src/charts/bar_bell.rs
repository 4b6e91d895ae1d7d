use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, AxisOrientation, BandAxis, ChartMetadata, ChartType, LinearAxis};
use crate::core::stack::min_stack_edge;
use crate::core::{BandScale, DomainOptions, KeyedRecord, max_stack_total, stack_records};
use crate::error::ChartResult;
use crate::render::SvgElement;

use super::{
    Chart, ChartBuild, ChartScope, filter_records, fit_x_value_scale, resolve_keys, tooltip_value,
};

const HOVER_CLASSES: &[&str] = &["bar-bell-segment", "bar-bell-bell"];
const MAX_SEGMENT_THICKNESS: f64 = 4.0;
const MAX_BELL_RADIUS: f64 = 6.0;

/// Horizontal rows of stacked segments, each ending in a round "bell"
/// marking the running total at that key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarBellChart {
    records: Vec<KeyedRecord>,
    keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarBellSegmentLayout {
    pub key: String,
    pub value: f64,
    pub x0: f64,
    pub x1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarBellRowLayout {
    pub category: String,
    pub y: f64,
    pub total: f64,
    pub segments: Vec<BarBellSegmentLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarBellLayout {
    pub bandwidth: f64,
    pub rows: Vec<BarBellRowLayout>,
}

impl BarBellChart {
    #[must_use]
    pub fn new(records: Vec<KeyedRecord>) -> Self {
        Self {
            records,
            keys: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        resolve_keys(&self.keys, &self.records)
    }
}

impl Chart for BarBellChart {
    type Dataset = Vec<KeyedRecord>;

    fn chart_type(&self) -> ChartType {
        ChartType::BarBell
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

    /// Row colors come from each record in `build`.
    fn embedded_color(&self, _label: &str) -> Option<&str> {
        None
    }

    fn hover_classes(&self) -> &'static [&'static str] {
        HOVER_CLASSES
    }

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild> {
        let ctx = scope.context;
        let plot = scope.plot;
        let keys = self.keys();
        let active = ctx.active_labels(&keys);
        let records = filter_records(&self.records, scope);
        let columns = stack_records(&records, &keys, |key| ctx.is_active(key));

        let band = BandScale::new(
            records.iter().map(|r| r.key.as_str()),
            (plot.y, plot.bottom()),
            scope.config.band_padding,
        )?;
        let x = fit_x_value_scale(
            [min_stack_edge(&columns), max_stack_total(&columns)],
            DomainOptions {
                include_zero: true,
                ..scope.config.x_domain
            },
            plot,
        )?;

        let thickness = (band.bandwidth() * 0.2).min(MAX_SEGMENT_THICKNESS);
        let bell_radius = (band.bandwidth() * 0.5).min(MAX_BELL_RADIUS);
        let mut rows = SvgElement::group().with_class("bar-bell-rows");
        let mut layout = BarBellLayout {
            bandwidth: band.bandwidth(),
            rows: Vec::with_capacity(columns.len()),
        };
        for (record, column) in records.iter().zip(&columns) {
            let Some(center) = band.center(&column.category) else {
                continue;
            };
            let mut row = SvgElement::group()
                .with_class("bar-bell-row")
                .with_attr("data-category", &column.category);
            let mut segments = Vec::with_capacity(column.segments.len());
            for segment in &column.segments {
                let label = segment.key.as_str();
                let color = scope.color(label, record.color.as_deref());
                let opacity = scope.opacity(label);
                let (x0, x1) = (x.scale(segment.y0), x.scale(segment.y1));
                row.push(
                    SvgElement::rect(x0.min(x1), center - thickness * 0.5, (x1 - x0).abs(), thickness)
                        .with_class(scope.shape_class("bar-bell-segment", label))
                        .with_label(label)
                        .with_attr("data-category", &column.category)
                        .with_attr("fill", &color)
                        .with_num("opacity", opacity),
                );
                row.push(
                    SvgElement::circle(x1, center, bell_radius)
                        .with_class(scope.shape_class("bar-bell-bell", label))
                        .with_label(label)
                        .with_attr("data-category", &column.category)
                        .with_attr("fill", &color)
                        .with_num("opacity", opacity),
                );
                segments.push(BarBellSegmentLayout {
                    key: segment.key.clone(),
                    value: segment.value,
                    x0,
                    x1,
                });
            }
            rows.push(row);
            layout.rows.push(BarBellRowLayout {
                category: column.category.clone(),
                y: center,
                total: column.total,
                segments,
            });
        }

        let body = SvgElement::group()
            .with_class("chart bar-bell-chart")
            .with_child(LinearAxis::new(x, AxisOrientation::Bottom).render(
                plot,
                &scope.config.axis,
                scope.formatters.x.as_ref(),
            ))
            .with_child(
                BandAxis::new(&band, AxisOrientation::Left).render(
                    plot,
                    &scope.config.axis,
                    |label| ctx.display_name(label).to_owned(),
                ),
            )
            .with_child(rows);

        debug!(rows = columns.len(), keys = active.len(), "built bar-bell chart");
        let mut metadata = ChartMetadata::new(ChartType::BarBell).with_rendered(&layout);
        metadata.x_axis_domain = AxisDomain::numeric(x.domain());
        metadata.y_axis_domain = AxisDomain::categorical(band.domain().iter().cloned());
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
        if let Some(record) = category.and_then(|key| self.records.iter().find(|r| r.key == key)) {
            lines.push(format!(
                "{}: {}",
                scope.display_name(&record.key),
                tooltip_value(record.value(label), scope)
            ));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::BarBellChart;
    use crate::api::{AxisDomain, ChartContext, ChartFormatters};
    use crate::charts::Chart;
    use crate::charts::test_support::{config, scope};
    use crate::core::{FilterSpec, KeyedRecord};

    fn records() -> Vec<KeyedRecord> {
        vec![
            KeyedRecord::new("north").with_value("x", 10.0).with_value("y", 20.0),
            KeyedRecord::new("south").with_value("x", 40.0).with_value("y", 5.0),
            KeyedRecord::new("east").with_value("x", 1.0).with_value("y", 2.0),
        ]
    }

    #[test]
    fn bells_sit_at_running_totals() {
        let chart = BarBellChart::new(records());
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let layout = &build.metadata.rendered_data["rows"][0];
        assert_eq!(layout["total"], 30.0);
        assert_eq!(build.body.find_by_class("bar-bell-bell").len(), 6);
        assert_eq!(build.metadata.x_axis_domain, AxisDomain::numeric((0.0, 50.0)));
    }

    #[test]
    fn filter_spec_keeps_top_rows() {
        let chart = BarBellChart::new(records());
        let ctx = ChartContext::default();
        let config = config().with_filter(FilterSpec::top(2, "total"));
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(
            build.metadata.y_axis_domain,
            AxisDomain::categorical(["south", "north"])
        );
    }

    #[test]
    fn record_color_paints_segments_and_bells() {
        let mut records = records();
        records[1] = records[1].clone().with_color("#00aa00");
        let chart = BarBellChart::new(records);
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let south: Vec<&str> = build
            .body
            .find_all(|element| element.attr("data-category") == Some("south"))
            .iter()
            .filter_map(|element| element.attr("fill"))
            .collect();
        assert_eq!(south, vec!["#00aa00"; 4]);
        let north = build.body.find_by_class("bar-bell-bell")[0];
        assert_eq!(north.attr("fill"), Some("rgba(128, 128, 128, 0.4)"));
    }
}
