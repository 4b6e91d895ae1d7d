use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, AxisOrientation, ChartMetadata, ChartType, LinearAxis};
use crate::core::format::{format_svg_number, format_with};
use crate::core::shape::curve_length;
use crate::core::{Curve, DashPattern, LineSeries, line_path, stroke_dash_array};
use crate::error::ChartResult;
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, XScale, fit_y_scale, tooltip_value};

const HOVER_CLASSES: &[&str] = &["line", "line-overlay", "line-point"];
const OVERLAY_STROKE_WIDTH: f64 = 12.0;
const POINT_RADIUS: f64 = 3.0;

/// One polyline per series; uncertain stretches are dashed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineChart {
    series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePointLayout {
    pub x: f64,
    pub y: f64,
    pub value: f64,
    pub certain: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeriesLayout {
    pub label: String,
    pub color: String,
    pub points: Vec<LinePointLayout>,
    pub dash_array: Option<String>,
}

impl LineChart {
    #[must_use]
    pub fn new(series: Vec<LineSeries>) -> Self {
        Self { series }
    }

    fn active_series<'a>(&'a self, scope: &ChartScope<'_>) -> Vec<&'a LineSeries> {
        self.series
            .iter()
            .filter(|series| scope.context.is_active(&series.label))
            .collect()
    }
}

/// Dash array for a line broken into runs of defined points.
///
/// Solid runs contribute one `length,0` pair so later dashed runs start at
/// the right offset along the stroke.
fn runs_dash_array(
    runs: &[Vec<((f64, f64), bool)>],
    curve: Curve,
    pattern: DashPattern,
) -> Option<String> {
    let mut any_dashed = false;
    let mut parts = Vec::with_capacity(runs.len());
    for run in runs {
        let points: Vec<(f64, f64)> = run.iter().map(|(p, _)| *p).collect();
        let certain: Vec<bool> = run.iter().map(|(_, c)| *c).collect();
        match stroke_dash_array(&points, &certain, curve, pattern) {
            Some(dash) => {
                any_dashed = true;
                parts.push(dash);
            }
            None => {
                let length = curve_length(&points, curve);
                parts.push(format!("{},0", format_svg_number(length)));
            }
        }
    }
    any_dashed.then(|| parts.join(", "))
}

impl Chart for LineChart {
    type Dataset = Vec<LineSeries>;

    fn chart_type(&self) -> ChartType {
        ChartType::Line
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
        let active = self.active_series(scope);
        let x = XScale::fit(
            active
                .iter()
                .flat_map(|series| series.points.iter().map(|p| p.x)),
            scope,
        )?;
        let y = fit_y_scale(
            active
                .iter()
                .flat_map(|series| series.points.iter().filter_map(|p| p.defined_y())),
            scope.config.y_domain,
            scope.plot,
        )?;

        let mut layouts = Vec::with_capacity(active.len());
        let mut lines = SvgElement::group().with_class("lines");
        for series in &active {
            let label = series.label.as_str();
            let color = scope.color(label, series.color.as_deref());
            let opacity = scope.opacity(label);

            let projected: Vec<Option<((f64, f64), bool)>> = series
                .points
                .iter()
                .map(|point| {
                    point.defined_y().filter(|_| point.x.is_finite()).map(|value| {
                        ((x.scale(point.x), y.scale(value)), point.certain)
                    })
                })
                .collect();
            let path_points: Vec<Option<(f64, f64)>> =
                projected.iter().map(|p| p.map(|(xy, _)| xy)).collect();

            let mut runs: Vec<Vec<((f64, f64), bool)>> = Vec::new();
            let mut current = Vec::new();
            for point in &projected {
                match point {
                    Some(point) => current.push(*point),
                    None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                    None => {}
                }
            }
            if !current.is_empty() {
                runs.push(current);
            }
            let dash_array =
                runs_dash_array(&runs, scope.config.curve, scope.config.dash_pattern);

            let d = line_path(&path_points, scope.config.curve);
            let mut line = SvgElement::path(d.clone())
                .with_class(scope.shape_class("line", label))
                .with_label(label)
                .with_attr("fill", "none")
                .with_attr("stroke", &color)
                .with_attr("stroke-width", 2)
                .with_num("opacity", opacity);
            if let Some(dash) = &dash_array {
                line = line.with_attr("stroke-dasharray", dash);
            }
            lines.push(line);
            lines.push(
                SvgElement::path(d)
                    .with_class("line-overlay")
                    .with_label(label)
                    .with_attr("fill", "none")
                    .with_attr("stroke", "transparent")
                    .with_attr("stroke-width", OVERLAY_STROKE_WIDTH),
            );

            let mut points = Vec::new();
            for (point, projected) in series.points.iter().zip(projected.iter()) {
                let Some(((px, py), certain)) = projected else {
                    continue;
                };
                if scope.config.show_points {
                    lines.push(
                        SvgElement::circle(*px, *py, POINT_RADIUS)
                            .with_class(scope.shape_class("line-point", label))
                            .with_label(label)
                            .with_attr("fill", &color)
                            .with_num("opacity", opacity),
                    );
                }
                points.push(LinePointLayout {
                    x: *px,
                    y: *py,
                    value: point.defined_y().unwrap_or_default(),
                    certain: *certain,
                });
            }

            layouts.push(LineSeriesLayout {
                label: label.to_owned(),
                color,
                points,
                dash_array,
            });
        }

        let body = SvgElement::group()
            .with_class("chart line-chart")
            .with_child(LinearAxis::new(y, AxisOrientation::Left).render(
                scope.plot,
                &scope.config.axis,
                scope.formatters.y.as_ref(),
            ))
            .with_child(x.render_axis(scope)?)
            .with_child(lines);

        debug!(series = active.len(), "built line chart");
        let mut metadata = ChartMetadata::new(ChartType::Line).with_rendered(&layouts);
        metadata.x_axis_domain = AxisDomain::numeric(x.domain());
        metadata.y_axis_domain = AxisDomain::numeric(y.domain());
        metadata.visible_items = active.iter().map(|s| s.label.clone()).collect();
        Ok(ChartBuild { body, metadata })
    }

    /// `category` is the formatted x value of the hovered point.
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
        let point = match category {
            Some(category) => series
                .points
                .iter()
                .find(|p| format_with(p.x, x_formatter, axis_type) == category),
            None => series.points.iter().rev().find(|p| p.defined_y().is_some()),
        };
        if let Some(point) = point {
            let mut line = format!(
                "{}: {}",
                format_with(point.x, x_formatter, axis_type),
                tooltip_value(point.defined_y(), scope)
            );
            if !point.certain {
                line.push_str(" (estimate)");
            }
            lines.push(line);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::{LineChart, runs_dash_array};
    use crate::api::{AxisDomain, ChartContext, ChartFormatters};
    use crate::charts::Chart;
    use crate::charts::test_support::{config, scope};
    use crate::core::dash::dash_array_length;
    use crate::core::shape::path_length;
    use crate::core::{Curve, DashPattern, LinePoint, LineSeries};

    fn series() -> Vec<LineSeries> {
        vec![
            LineSeries::new(
                "a",
                vec![
                    LinePoint::new(0.0, 1.0),
                    LinePoint::new(1.0, 4.0),
                    LinePoint::new(2.0, 6.0).uncertain(),
                ],
            ),
            LineSeries::new("b", vec![LinePoint::new(0.0, 40.0), LinePoint::new(2.0, 50.0)]),
        ]
    }

    #[test]
    fn disabled_series_leaves_y_domain() {
        let chart = LineChart::new(series());
        let mut ctx = ChartContext::default();
        ctx.set_disabled_items(["b"]);
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(build.metadata.visible_items, vec!["a"]);
        assert_eq!(build.metadata.y_axis_domain, AxisDomain::numeric((1.0, 6.0)));
        assert_eq!(build.body.find_by_class("line").len(), 1);
    }

    #[test]
    fn uncertain_tail_sets_dash_array() {
        let chart = LineChart::new(series());
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let lines = build.body.find_by_class("line");
        assert!(lines[0].attr("stroke-dasharray").is_some());
        assert!(lines[1].attr("stroke-dasharray").is_none());
        assert_eq!(build.body.find_by_class("line-overlay").len(), 2);
    }

    #[test]
    fn solid_runs_pad_the_dash_array() {
        let runs = vec![
            vec![((0.0, 0.0), true), ((10.0, 0.0), true)],
            vec![((20.0, 0.0), true), ((28.0, 0.0), false)],
        ];
        assert_eq!(
            runs_dash_array(&runs, Curve::Linear, DashPattern::default()).as_deref(),
            Some("10,0, 4,4")
        );
    }

    #[test]
    fn dash_array_spans_the_stroke_for_every_curve() {
        let series = vec![LineSeries::new(
            "a",
            vec![
                LinePoint::new(0.0, 0.0),
                LinePoint::new(1.0, 10.0),
                LinePoint::new(2.0, 0.0).uncertain(),
            ],
        )];
        let chart = LineChart::new(series);
        let ctx = ChartContext::default();
        let formatters = ChartFormatters::default();
        for curve in [Curve::Linear, Curve::StepAfter, Curve::MonotoneX] {
            let mut config = config();
            config.curve = curve;
            let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

            let line = build.body.find_by_class("line")[0];
            let dash = line.attr("stroke-dasharray").expect("dashed tail");
            let layout: Vec<super::LineSeriesLayout> =
                serde_json::from_value(build.metadata.rendered_data.clone()).expect("layout");
            let points: Vec<Option<(f64, f64)>> =
                layout[0].points.iter().map(|p| Some((p.x, p.y))).collect();
            let expected = path_length(&points, curve);
            let covered = dash_array_length(dash).expect("parse");
            assert!(
                (covered - expected).abs() < 0.05,
                "{curve:?}: dash array covers {covered}, path is {expected}"
            );
        }
    }

    #[test]
    fn tooltip_marks_estimates() {
        let chart = LineChart::new(series());
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let lines = chart.tooltip_lines("a", Some("2"), &scope(&ctx, &config, &formatters));
        assert_eq!(lines, vec!["a", "2: 6 (estimate)"]);
    }
}
