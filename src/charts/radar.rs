use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, ChartMetadata, ChartType};
use crate::core::{DomainOptions, LinearScale, RadarSeries, polygon_path, resolve_domain};
use crate::error::{ChartError, ChartResult};
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, tooltip_value, unique_labels};

const HOVER_CLASSES: &[&str] = &["radar-area", "radar-point"];
const LABEL_OFFSET_PX: f64 = 12.0;
const POINT_RADIUS: f64 = 3.0;

/// Polygons over one spoke per axis key, all sharing a radial value scale.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    series: Vec<RadarSeries>,
    levels: usize,
}

impl Default for RadarChart {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxisLayout {
    pub key: String,
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSeriesLayout {
    pub label: String,
    pub color: String,
    pub vertices: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarLayout {
    pub center: (f64, f64),
    pub radius: f64,
    pub axes: Vec<RadarAxisLayout>,
    pub series: Vec<RadarSeriesLayout>,
}

/// Angle of spoke `index` out of `count`, starting at twelve o'clock.
#[must_use]
fn spoke_angle(index: usize, count: usize) -> f64 {
    TAU * index as f64 / count.max(1) as f64 - FRAC_PI_2
}

fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
}

impl RadarChart {
    #[must_use]
    pub fn new(series: Vec<RadarSeries>) -> Self {
        Self { series, levels: 5 }
    }

    /// Number of concentric grid rings.
    pub fn with_levels(mut self, levels: usize) -> ChartResult<Self> {
        if levels == 0 {
            return Err(ChartError::InvalidConfig(
                "radar levels must be > 0".to_owned(),
            ));
        }
        self.levels = levels;
        Ok(self)
    }

    /// Axis keys across all series in first-seen order.
    #[must_use]
    pub fn axes(&self) -> Vec<String> {
        unique_labels(
            self.series
                .iter()
                .flat_map(|series| series.values.keys().map(String::as_str)),
        )
    }
}

impl Chart for RadarChart {
    type Dataset = Vec<RadarSeries>;

    fn chart_type(&self) -> ChartType {
        ChartType::Radar
    }

    fn dataset(&self) -> &Self::Dataset {
        &self.series
    }

    fn set_dataset(&mut self, dataset: Self::Dataset) {
        self.series = dataset;
    }

    fn is_empty(&self) -> bool {
        self.series.iter().all(|series| series.values.is_empty())
    }

    fn labels(&self) -> Vec<String> {
        unique_labels(self.series.iter().map(|series| series.label.as_str()))
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
        let plot = scope.plot;
        let axes = self.axes();
        let active: Vec<&RadarSeries> = self
            .series
            .iter()
            .filter(|series| scope.context.is_active(&series.label))
            .collect();

        let center = plot.center();
        let radius = (plot.width.min(plot.height) * 0.5 - LABEL_OFFSET_PX).max(0.0);
        let domain = resolve_domain(
            active
                .iter()
                .flat_map(|series| series.values.values().filter_map(|v| *v)),
            DomainOptions {
                include_zero: true,
                ..scope.config.y_domain
            },
        );
        let radial = LinearScale::new(domain, (0.0, radius))?.with_clamp(true);

        let mut grid = SvgElement::group().with_class("radar-grid-group");
        for level in 1..=self.levels {
            let ring_radius = radius * level as f64 / self.levels as f64;
            let ring: Vec<(f64, f64)> = (0..axes.len())
                .map(|i| polar(center, ring_radius, spoke_angle(i, axes.len())))
                .collect();
            grid.push(
                SvgElement::path(polygon_path(&ring))
                    .with_class("radar-grid")
                    .with_attr("fill", "none")
                    .with_attr("stroke", &scope.config.axis.grid_color),
            );
        }

        let mut axis_layouts = Vec::with_capacity(axes.len());
        for (i, key) in axes.iter().enumerate() {
            let angle = spoke_angle(i, axes.len());
            let (x, y) = polar(center, radius, angle);
            grid.push(
                SvgElement::line(center.0, center.1, x, y)
                    .with_class("radar-spoke")
                    .with_attr("stroke", &scope.config.axis.grid_color),
            );
            let (lx, ly) = polar(center, radius + LABEL_OFFSET_PX, angle);
            let anchor = if angle.cos().abs() < 1e-6 {
                "middle"
            } else if angle.cos() > 0.0 {
                "start"
            } else {
                "end"
            };
            let name = scope.display_name(key);
            if !name.is_empty() {
                grid.push(
                    SvgElement::text_at(lx, ly, name)
                        .with_class("radar-axis-label")
                        .with_attr("text-anchor", anchor)
                        .with_attr("dominant-baseline", "middle")
                        .with_num("font-size", scope.config.axis.font_size_px)
                        .with_attr("fill", &scope.config.axis.color),
                );
            }
            axis_layouts.push(RadarAxisLayout {
                key: key.clone(),
                angle,
                x,
                y,
            });
        }

        let mut shapes = SvgElement::group().with_class("radar-series");
        let mut series_layouts = Vec::with_capacity(active.len());
        for series in &active {
            let label = series.label.as_str();
            let color = scope.color(label, series.color.as_deref());
            let opacity = scope.opacity(label);
            // Missing axes collapse to the center.
            let vertices: Vec<(f64, f64)> = axes
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let value = series
                        .values
                        .get(key)
                        .copied()
                        .flatten()
                        .filter(|v| v.is_finite());
                    let r = value.map_or(0.0, |v| radial.scale(v));
                    polar(center, r, spoke_angle(i, axes.len()))
                })
                .collect();
            shapes.push(
                SvgElement::path(polygon_path(&vertices))
                    .with_class(scope.shape_class("radar-area", label))
                    .with_label(label)
                    .with_attr("fill", &color)
                    .with_num("fill-opacity", 0.3 * opacity)
                    .with_attr("stroke", &color)
                    .with_attr("stroke-width", 2)
                    .with_num("stroke-opacity", opacity),
            );
            if scope.config.show_points {
                for (key, (x, y)) in axes.iter().zip(vertices.iter()) {
                    shapes.push(
                        SvgElement::circle(*x, *y, POINT_RADIUS)
                            .with_class(scope.shape_class("radar-point", label))
                            .with_label(label)
                            .with_attr("data-category", key)
                            .with_attr("fill", &color)
                            .with_num("opacity", opacity),
                    );
                }
            }
            series_layouts.push(RadarSeriesLayout {
                label: label.to_owned(),
                color,
                vertices,
            });
        }

        let body = SvgElement::group()
            .with_class("chart radar-chart")
            .with_child(grid)
            .with_child(shapes);

        debug!(axes = axes.len(), series = active.len(), "built radar chart");
        let layout = RadarLayout {
            center,
            radius,
            axes: axis_layouts,
            series: series_layouts,
        };
        let mut metadata = ChartMetadata::new(ChartType::Radar).with_rendered(&layout);
        metadata.x_axis_domain = AxisDomain::categorical(axes);
        metadata.y_axis_domain = AxisDomain::numeric(radial.domain());
        metadata.visible_items = active.iter().map(|s| s.label.clone()).collect();
        Ok(ChartBuild { body, metadata })
    }

    /// One line per axis, or just the hovered axis when `category` names one.
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
        for (axis, value) in &series.values {
            if category.is_some_and(|category| category != axis) {
                continue;
            }
            lines.push(format!(
                "{}: {}",
                scope.display_name(axis),
                tooltip_value(*value, scope)
            ));
        }
        lines
    }
}
