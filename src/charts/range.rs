use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::{AxisDomain, AxisOrientation, ChartMetadata, ChartType, LinearAxis};
use crate::core::format::format_with;
use crate::core::{RangeSeries, area_path, line_path};
use crate::error::ChartResult;
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, XScale, fit_y_scale, tooltip_value};

const HOVER_CLASSES: &[&str] = &["range-area", "range-line"];
const BAND_OPACITY: f64 = 0.3;

/// Min/max bands over a continuous x axis, with an optional central line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeChart {
    series: Vec<RangeSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePointLayout {
    pub x: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub y_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSeriesLayout {
    pub label: String,
    pub color: String,
    pub points: Vec<RangePointLayout>,
}

impl RangeChart {
    #[must_use]
    pub fn new(series: Vec<RangeSeries>) -> Self {
        Self { series }
    }
}

impl Chart for RangeChart {
    type Dataset = Vec<RangeSeries>;

    fn chart_type(&self) -> ChartType {
        ChartType::Range
    }

    fn dataset(&self) -> &Self::Dataset {
        &self.series
    }

    fn set_dataset(&mut self, dataset: Self::Dataset) {
        self.series = dataset;
    }

    fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.points.is_empty())
    }

    fn labels(&self) -> Vec<String> {
        super::unique_labels(self.series.iter().map(|series| series.label.as_str()))
    }

    fn embedded_color(&self, label: &str) -> Option<&str> {
        self.series
            .iter()
            .find(|series| series.label == label)
            .and_then(|series| series.color.as_deref())
    }

    fn hover_classes(&self) -> &'static [&'static str] {
        HOVER_CLASSES
    }

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild> {
        let active: Vec<&RangeSeries> = self
            .series
            .iter()
            .filter(|series| scope.context.is_active(&series.label))
            .collect();
        let valid_points = || {
            active
                .iter()
                .flat_map(|series| series.points.iter().filter(|p| p.is_valid()))
        };
        let skipped = active
            .iter()
            .flat_map(|series| series.points.iter())
            .filter(|p| !p.is_valid())
            .count();
        if skipped > 0 {
            warn!(skipped, "range points with min > max or non-finite fields skipped");
        }

        let x = XScale::fit(valid_points().map(|p| p.x), scope)?;
        let y = fit_y_scale(
            valid_points().flat_map(|p| {
                [Some(p.min), Some(p.max), p.value.filter(|v| v.is_finite())]
                    .into_iter()
                    .flatten()
            }),
            scope.config.y_domain,
            scope.plot,
        )?;

        let mut layouts = Vec::with_capacity(active.len());
        let mut shapes = SvgElement::group().with_class("ranges");
        for series in &active {
            let label = series.label.as_str();
            let color = scope.color(label, series.color.as_deref());
            let opacity = scope.opacity(label);
            let mut points: Vec<RangePointLayout> = series
                .points
                .iter()
                .filter(|p| p.is_valid())
                .map(|p| RangePointLayout {
                    x: x.scale(p.x),
                    y_min: y.scale(p.min),
                    y_max: y.scale(p.max),
                    y_value: p.value.filter(|v| v.is_finite()).map(|v| y.scale(v)),
                })
                .collect();
            points.sort_by(|a, b| a.x.total_cmp(&b.x));

            let top: Vec<Option<(f64, f64)>> = points.iter().map(|p| Some((p.x, p.y_max))).collect();
            let bottom: Vec<Option<(f64, f64)>> =
                points.iter().map(|p| Some((p.x, p.y_min))).collect();
            shapes.push(
                SvgElement::path(area_path(&top, &bottom, scope.config.curve))
                    .with_class(scope.shape_class("range-area", label))
                    .with_label(label)
                    .with_attr("fill", &color)
                    .with_num("fill-opacity", BAND_OPACITY * opacity),
            );

            let center: Vec<Option<(f64, f64)>> = points
                .iter()
                .map(|p| p.y_value.map(|value| (p.x, value)))
                .collect();
            if center.iter().any(Option::is_some) {
                shapes.push(
                    SvgElement::path(line_path(&center, scope.config.curve))
                        .with_class(scope.shape_class("range-line", label))
                        .with_label(label)
                        .with_attr("fill", "none")
                        .with_attr("stroke", &color)
                        .with_attr("stroke-width", 2)
                        .with_num("opacity", opacity),
                );
            }

            layouts.push(RangeSeriesLayout {
                label: label.to_owned(),
                color,
                points,
            });
        }

        let body = SvgElement::group()
            .with_class("chart range-chart")
            .with_child(LinearAxis::new(y, AxisOrientation::Left).render(
                scope.plot,
                &scope.config.axis,
                scope.formatters.y.as_ref(),
            ))
            .with_child(x.render_axis(scope)?)
            .with_child(shapes);

        debug!(series = active.len(), "built range chart");
        let mut metadata = ChartMetadata::new(ChartType::Range).with_rendered(&layouts);
        metadata.x_axis_domain = AxisDomain::numeric(x.domain());
        metadata.y_axis_domain = AxisDomain::numeric(y.domain());
        metadata.visible_items = active.iter().map(|s| s.label.clone()).collect();
        Ok(ChartBuild { body, metadata })
    }

    /// `category` is the formatted x value of the hovered point; without it
    /// the overall span of the series is reported.
    fn tooltip_lines(
        &self,
        label: &str,
        category: Option<&str>,
        scope: &ChartScope<'_>,
    ) -> Vec<String> {
        let mut lines = vec![scope.display_name(label).to_owned()];
        let Some(series) = self.series.iter().find(|s| s.label == label) else {
            return lines;
        };
        let axis_type = scope.config.axis_type;
        let x_formatter = scope.formatters.x.as_ref();
        match category {
            Some(category) => {
                if let Some(point) = series
                    .points
                    .iter()
                    .find(|p| format_with(p.x, x_formatter, axis_type) == category)
                {
                    lines.push(format!(
                        "{category}: {} - {}",
                        tooltip_value(Some(point.min), scope),
                        tooltip_value(Some(point.max), scope)
                    ));
                    if let Some(value) = point.value {
                        lines.push(format!("Value: {}", tooltip_value(Some(value), scope)));
                    }
                }
            }
            None => {
                let valid = series.points.iter().filter(|p| p.is_valid());
                let min = valid.clone().map(|p| p.min).reduce(f64::min);
                let max = valid.map(|p| p.max).reduce(f64::max);
                lines.push(format!(
                    "Range: {} - {}",
                    tooltip_value(min, scope),
                    tooltip_value(max, scope)
                ));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::RangeChart;
    use crate::api::{AxisDomain, ChartContext, ChartFormatters};
    use crate::charts::Chart;
    use crate::charts::test_support::{config, scope};
    use crate::core::{RangePoint, RangeSeries};

    fn series() -> Vec<RangeSeries> {
        vec![RangeSeries::new(
            "temp",
            vec![
                RangePoint::new(0.0, 2.0, 8.0).expect("point").with_value(5.0),
                RangePoint::new(1.0, 3.0, 10.0).expect("point").with_value(6.0),
                RangePoint {
                    x: 2.0,
                    min: 9.0,
                    max: 1.0,
                    value: None,
                },
            ],
        )]
    }

    #[test]
    fn invalid_points_are_skipped() {
        let chart = RangeChart::new(series());
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(build.metadata.x_axis_domain, AxisDomain::numeric((0.0, 1.0)));
        assert_eq!(build.metadata.y_axis_domain, AxisDomain::numeric((2.0, 10.0)));
        assert_eq!(build.metadata.rendered_data[0]["points"].as_array().map(Vec::len), Some(2));
        assert_eq!(build.body.find_by_class("range-area").len(), 1);
        assert_eq!(build.body.find_by_class("range-line").len(), 1);
    }

    #[test]
    fn tooltip_reports_band_at_point() {
        let chart = RangeChart::new(series());
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let lines = chart.tooltip_lines("temp", Some("1"), &scope(&ctx, &config, &formatters));
        assert_eq!(lines, vec!["temp", "1: 3 - 10", "Value: 6"]);

        let summary = chart.tooltip_lines("temp", None, &scope(&ctx, &config, &formatters));
        assert_eq!(summary, vec!["temp", "Range: 2 - 10"]);
    }
}
