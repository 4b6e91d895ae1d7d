use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::api::{AxisDomain, AxisOrientation, ChartMetadata, ChartType, LinearAxis};
use crate::core::format::format_with;
use crate::core::{LinearScale, ScatterPoint, numeric_extent};
use crate::error::{ChartError, ChartResult};
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, XScale, fit_y_scale, tooltip_value};

const HOVER_CLASSES: &[&str] = &["scatter-point"];

/// Bubbles positioned by `(x, y)`; optional sizes map to area, not radius.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPlotChart {
    points: Vec<ScatterPoint>,
    min_radius: f64,
    max_radius: f64,
    default_radius: f64,
}

impl Default for ScatterPlotChart {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPointLayout {
    pub label: String,
    pub color: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

/// Sqrt radius scale over the finite, non-negative sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RadiusScale {
    scale: Option<LinearScale>,
    default_radius: f64,
}

impl RadiusScale {
    fn fit(
        sizes: impl IntoIterator<Item = f64>,
        min_radius: f64,
        max_radius: f64,
        default_radius: f64,
    ) -> ChartResult<Self> {
        let scale = match numeric_extent(sizes.into_iter().filter(|size| *size >= 0.0)) {
            Some((lo, hi)) => Some(
                LinearScale::new((lo.sqrt(), hi.sqrt()), (min_radius, max_radius))?
                    .with_clamp(true),
            ),
            None => None,
        };
        Ok(Self {
            scale,
            default_radius,
        })
    }

    fn radius(self, size: Option<f64>) -> f64 {
        match (self.scale, size.filter(|s| s.is_finite() && *s >= 0.0)) {
            (Some(scale), Some(size)) => scale.scale(size.sqrt()),
            _ => self.default_radius,
        }
    }
}

/// Projects points paired with their resolved fill into circle geometry.
/// Points with a non-finite coordinate are dropped.
fn project_points(
    points: &[(&ScatterPoint, String)],
    x: XScale,
    y: LinearScale,
    radius: RadiusScale,
) -> Vec<ScatterPointLayout> {
    let project = |(point, color): &(&ScatterPoint, String)| {
        (point.x.is_finite() && point.y.is_finite()).then(|| ScatterPointLayout {
            label: point.label.clone(),
            color: color.clone(),
            cx: x.scale(point.x),
            cy: y.scale(point.y),
            r: radius.radius(point.size),
        })
    };

    #[cfg(feature = "parallel-projection")]
    {
        points.par_iter().filter_map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        points.iter().filter_map(project).collect()
    }
}

impl ScatterPlotChart {
    #[must_use]
    pub fn new(points: Vec<ScatterPoint>) -> Self {
        Self {
            points,
            min_radius: 3.0,
            max_radius: 20.0,
            default_radius: 5.0,
        }
    }

    pub fn with_radius_range(mut self, min_radius: f64, max_radius: f64) -> ChartResult<Self> {
        if !min_radius.is_finite() || !max_radius.is_finite() || min_radius < 0.0 {
            return Err(ChartError::InvalidConfig(
                "scatter radius range must be finite and non-negative".to_owned(),
            ));
        }
        if min_radius > max_radius {
            return Err(ChartError::InvalidConfig(
                "scatter min radius must be <= max radius".to_owned(),
            ));
        }
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        Ok(self)
    }

    pub fn with_default_radius(mut self, radius: f64) -> ChartResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(ChartError::InvalidConfig(
                "scatter default radius must be finite and non-negative".to_owned(),
            ));
        }
        self.default_radius = radius;
        Ok(self)
    }
}

impl Chart for ScatterPlotChart {
    type Dataset = Vec<ScatterPoint>;

    fn chart_type(&self) -> ChartType {
        ChartType::Scatter
    }

    fn dataset(&self) -> &Self::Dataset {
        &self.points
    }

    fn set_dataset(&mut self, dataset: Self::Dataset) {
        self.points = dataset;
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn labels(&self) -> Vec<String> {
        super::unique_labels(self.points.iter().map(|point| point.label.as_str()))
    }

    fn embedded_color(&self, label: &str) -> Option<&str> {
        self.points
            .iter()
            .find(|point| point.label == label)
            .and_then(|point| point.color.as_deref())
    }

    fn hover_classes(&self) -> &'static [&'static str] {
        HOVER_CLASSES
    }

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild> {
        let active: Vec<&ScatterPoint> = self
            .points
            .iter()
            .filter(|point| scope.context.is_active(&point.label))
            .collect();

        let x = XScale::fit(active.iter().map(|p| p.x), scope)?;
        let y = fit_y_scale(active.iter().map(|p| p.y), scope.config.y_domain, scope.plot)?;
        let radius = RadiusScale::fit(
            active.iter().filter_map(|p| p.size),
            self.min_radius,
            self.max_radius,
            self.default_radius,
        )?;

        let colored: Vec<(&ScatterPoint, String)> = active
            .iter()
            .map(|point| (*point, scope.color(&point.label, point.color.as_deref())))
            .collect();
        let mut layouts = project_points(&colored, x, y, radius);
        // Larger bubbles first so smaller ones stay on top.
        layouts.sort_by(|a, b| b.r.total_cmp(&a.r));

        let mut circles = SvgElement::group().with_class("scatter-points");
        for layout in &layouts {
            let label = layout.label.as_str();
            circles.push(
                SvgElement::circle(layout.cx, layout.cy, layout.r)
                    .with_class(scope.shape_class("scatter-point", label))
                    .with_label(label)
                    .with_attr("fill", &layout.color)
                    .with_num("opacity", 0.8 * scope.opacity(label)),
            );
        }

        let body = SvgElement::group()
            .with_class("chart scatter-chart")
            .with_child(LinearAxis::new(y, AxisOrientation::Left).render(
                scope.plot,
                &scope.config.axis,
                scope.formatters.y.as_ref(),
            ))
            .with_child(x.render_axis(scope)?)
            .with_child(circles);

        debug!(points = layouts.len(), "built scatter chart");
        let mut metadata = ChartMetadata::new(ChartType::Scatter).with_rendered(&layouts);
        metadata.x_axis_domain = AxisDomain::numeric(x.domain());
        metadata.y_axis_domain = AxisDomain::numeric(y.domain());
        metadata.visible_items =
            super::unique_labels(active.iter().map(|point| point.label.as_str()));
        Ok(ChartBuild { body, metadata })
    }

    fn tooltip_lines(
        &self,
        label: &str,
        _category: Option<&str>,
        scope: &ChartScope<'_>,
    ) -> Vec<String> {
        let mut lines = vec![scope.display_name(label).to_owned()];
        for point in self.points.iter().filter(|point| point.label == label) {
            let mut line = format!(
                "{}, {}",
                format_with(point.x, scope.formatters.x.as_ref(), scope.config.axis_type),
                tooltip_value(Some(point.y), scope)
            );
            if let Some(size) = point.size {
                line.push_str(&format!(" ({})", tooltip_value(Some(size), scope)));
            }
            lines.push(line);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{RadiusScale, ScatterPlotChart};
    use crate::api::{ChartContext, ChartFormatters};
    use crate::charts::Chart;
    use crate::charts::test_support::{config, scope};
    use crate::core::ScatterPoint;

    #[test]
    fn radius_follows_square_root_of_size() {
        let radius = RadiusScale::fit([0.0, 100.0], 0.0, 10.0, 5.0).expect("radius scale");
        assert_relative_eq!(radius.radius(Some(25.0)), 5.0);
        assert_relative_eq!(radius.radius(Some(100.0)), 10.0);
        assert_relative_eq!(radius.radius(None), 5.0);
        assert_relative_eq!(radius.radius(Some(-1.0)), 5.0);
    }

    #[test]
    fn disabled_labels_and_bad_points_are_not_drawn() {
        let chart = ScatterPlotChart::new(vec![
            ScatterPoint::new("a", 1.0, 2.0).with_size(4.0),
            ScatterPoint::new("a", f64::NAN, 2.0),
            ScatterPoint::new("b", 3.0, 4.0).with_size(16.0),
        ]);
        let mut ctx = ChartContext::default();
        ctx.set_disabled_items(["b"]);
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(build.body.find_by_class("scatter-point").len(), 1);
        assert_eq!(build.metadata.visible_items, vec!["a"]);
    }

    #[test]
    fn bigger_bubbles_are_drawn_first() {
        let chart = ScatterPlotChart::new(vec![
            ScatterPoint::new("small", 1.0, 1.0).with_size(1.0),
            ScatterPoint::new("big", 2.0, 2.0).with_size(100.0),
        ]);
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let circles = build.body.find_by_class("scatter-point");
        assert_eq!(circles[0].attr("data-label"), Some("big"));
    }

    #[test]
    fn radius_range_is_validated() {
        assert!(ScatterPlotChart::default().with_radius_range(10.0, 2.0).is_err());
        assert!(ScatterPlotChart::default().with_default_radius(f64::NAN).is_err());
    }

    #[test]
    fn each_point_keeps_its_own_color() {
        let chart = ScatterPlotChart::new(vec![
            ScatterPoint::new("a", 1.0, 1.0).with_size(9.0).with_color("#111111"),
            ScatterPoint::new("a", 2.0, 2.0).with_size(4.0).with_color("#222222"),
            ScatterPoint::new("a", 3.0, 3.0).with_size(1.0),
        ]);
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let fills: Vec<Option<&str>> = build
            .body
            .find_by_class("scatter-point")
            .iter()
            .map(|circle| circle.attr("fill"))
            .collect();
        assert_eq!(
            fills,
            vec![Some("#111111"), Some("#222222"), Some("rgba(128, 128, 128, 0.4)")]
        );
    }
}
