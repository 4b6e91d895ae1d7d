use serde::{Deserialize, Serialize};

use crate::core::format::format_with;
use crate::core::{AxisType, BandScale, Formatter, LinearScale, PlotArea, TimeScale};
use crate::error::{ChartError, ChartResult};
use crate::render::SvgElement;

use super::axis_ticks::{axis_tick_target_count, estimate_label_width, select_ticks_with_min_spacing};

const MIN_TICKS: usize = 2;
const MAX_TICKS: usize = 12;

/// Side of the plot area an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrientation {
    Top,
    Right,
    Bottom,
    Left,
}

impl AxisOrientation {
    #[must_use]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    fn class_name(self) -> &'static str {
        match self {
            Self::Top => "axis axis-top",
            Self::Right => "axis axis-right",
            Self::Bottom => "axis axis-bottom",
            Self::Left => "axis axis-left",
        }
    }
}

/// Axis appearance shared by every axis renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub show_grid: bool,
    pub tick_size: f64,
    /// Preferred distance between ticks; drives the tick count.
    pub target_spacing_px: f64,
    /// Labels closer than this are thinned out.
    pub min_spacing_px: f64,
    pub show_domain_line: bool,
    pub font_size_px: f64,
    pub label_padding_px: f64,
    pub color: String,
    pub grid_color: String,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            tick_size: 6.0,
            target_spacing_px: 80.0,
            min_spacing_px: 24.0,
            show_domain_line: true,
            font_size_px: 11.0,
            label_padding_px: 3.0,
            color: "#666666".to_owned(),
            grid_color: "#e5e5e5".to_owned(),
        }
    }
}

impl AxisConfig {
    pub fn validate(&self) -> ChartResult<()> {
        for (name, value) in [
            ("tick_size", self.tick_size),
            ("min_spacing_px", self.min_spacing_px),
            ("font_size_px", self.font_size_px),
            ("label_padding_px", self.label_padding_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "axis {name} must be finite and >= 0"
                )));
            }
        }
        if !self.target_spacing_px.is_finite() || self.target_spacing_px <= 0.0 {
            return Err(ChartError::InvalidConfig(
                "axis target_spacing_px must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn tick_count(&self, orientation: AxisOrientation, plot: PlotArea) -> usize {
        let span = if orientation.is_horizontal() {
            plot.width
        } else {
            plot.height
        };
        axis_tick_target_count(span, self.target_spacing_px, MIN_TICKS, MAX_TICKS)
    }
}

/// Axis over a continuous numeric scale.
#[derive(Debug, Clone, Copy)]
pub struct LinearAxis {
    pub scale: LinearScale,
    pub orientation: AxisOrientation,
}

impl LinearAxis {
    #[must_use]
    pub fn new(scale: LinearScale, orientation: AxisOrientation) -> Self {
        Self { scale, orientation }
    }

    #[must_use]
    pub fn render(
        &self,
        plot: PlotArea,
        config: &AxisConfig,
        formatter: Option<&Formatter>,
    ) -> SvgElement {
        let ticks = self
            .scale
            .ticks(config.tick_count(self.orientation, plot))
            .into_iter()
            .map(|value| {
                (
                    format_with(value, formatter, AxisType::Number),
                    self.scale.scale(value),
                )
            })
            .collect();
        render_axis(ticks, self.orientation, plot, config)
    }
}

/// Axis over calendar or numeric time positions.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxis {
    pub scale: TimeScale,
    pub orientation: AxisOrientation,
}

impl TimeAxis {
    #[must_use]
    pub fn new(scale: TimeScale, orientation: AxisOrientation) -> Self {
        Self { scale, orientation }
    }

    pub fn render(
        &self,
        plot: PlotArea,
        config: &AxisConfig,
        formatter: Option<&Formatter>,
    ) -> ChartResult<SvgElement> {
        let axis_type = self.scale.axis_type();
        let ticks = self
            .scale
            .ticks(config.tick_count(self.orientation, plot))?
            .into_iter()
            .map(|time| (format_with(time, formatter, axis_type), self.scale.scale(time)))
            .collect();
        Ok(render_axis(ticks, self.orientation, plot, config))
    }
}

/// Axis with one tick per band, centered in the band.
#[derive(Debug, Clone, Copy)]
pub struct BandAxis<'a> {
    pub scale: &'a BandScale,
    pub orientation: AxisOrientation,
}

impl<'a> BandAxis<'a> {
    #[must_use]
    pub fn new(scale: &'a BandScale, orientation: AxisOrientation) -> Self {
        Self { scale, orientation }
    }

    /// `display` maps a band label to its tick text.
    #[must_use]
    pub fn render(
        &self,
        plot: PlotArea,
        config: &AxisConfig,
        display: impl Fn(&str) -> String,
    ) -> SvgElement {
        let ticks = self
            .scale
            .domain()
            .iter()
            .filter_map(|label| {
                self.scale
                    .center(label)
                    .map(|position| (display(label), position))
            })
            .collect();
        render_axis(ticks, self.orientation, plot, config)
    }
}

fn render_axis(
    ticks: Vec<(String, f64)>,
    orientation: AxisOrientation,
    plot: PlotArea,
    config: &AxisConfig,
) -> SvgElement {
    let mut group = SvgElement::group().with_class(orientation.class_name());

    let min_spacing = if orientation.is_horizontal() {
        let widest = ticks
            .iter()
            .map(|(label, _)| estimate_label_width(label, config.font_size_px))
            .fold(0.0, f64::max);
        config.min_spacing_px.max(widest + config.label_padding_px * 2.0)
    } else {
        config.min_spacing_px.max(config.font_size_px)
    };
    let ticks = select_ticks_with_min_spacing(ticks, min_spacing);

    if config.show_grid {
        for (_, position) in &ticks {
            let grid = if orientation.is_horizontal() {
                SvgElement::line(*position, plot.y, *position, plot.bottom())
            } else {
                SvgElement::line(plot.x, *position, plot.right(), *position)
            };
            group.push(
                grid.with_class("grid-line")
                    .with_attr("stroke", &config.grid_color),
            );
        }
    }

    if config.show_domain_line {
        let domain = match orientation {
            AxisOrientation::Top => SvgElement::line(plot.x, plot.y, plot.right(), plot.y),
            AxisOrientation::Bottom => {
                SvgElement::line(plot.x, plot.bottom(), plot.right(), plot.bottom())
            }
            AxisOrientation::Left => SvgElement::line(plot.x, plot.y, plot.x, plot.bottom()),
            AxisOrientation::Right => {
                SvgElement::line(plot.right(), plot.y, plot.right(), plot.bottom())
            }
        };
        group.push(
            domain
                .with_class("axis-domain")
                .with_attr("stroke", &config.color),
        );
    }

    let tick_size = config.tick_size;
    let label_gap = tick_size + config.label_padding_px;
    for (label, position) in ticks {
        let (tick, text) = match orientation {
            AxisOrientation::Bottom => {
                let y = plot.bottom();
                (
                    SvgElement::line(position, y, position, y + tick_size),
                    SvgElement::text_at(position, y + label_gap + config.font_size_px, label)
                        .with_attr("text-anchor", "middle"),
                )
            }
            AxisOrientation::Top => {
                let y = plot.y;
                (
                    SvgElement::line(position, y, position, y - tick_size),
                    SvgElement::text_at(position, y - label_gap, label)
                        .with_attr("text-anchor", "middle"),
                )
            }
            AxisOrientation::Left => {
                let x = plot.x;
                (
                    SvgElement::line(x, position, x - tick_size, position),
                    SvgElement::text_at(x - label_gap, position, label)
                        .with_attr("text-anchor", "end")
                        .with_attr("dominant-baseline", "middle"),
                )
            }
            AxisOrientation::Right => {
                let x = plot.right();
                (
                    SvgElement::line(x, position, x + tick_size, position),
                    SvgElement::text_at(x + label_gap, position, label)
                        .with_attr("text-anchor", "start")
                        .with_attr("dominant-baseline", "middle"),
                )
            }
        };

        group.push(tick.with_class("axis-tick").with_attr("stroke", &config.color));
        if text.text.as_deref().is_some_and(|t| !t.is_empty()) {
            group.push(
                text.with_class("axis-label")
                    .with_attr("font-size", config.font_size_px)
                    .with_attr("fill", &config.color),
            );
        }
    }

    group
}

#[cfg(test)]
mod tests {
    use super::{AxisConfig, AxisOrientation, BandAxis, LinearAxis};
    use crate::core::{BandPadding, BandScale, LinearScale, PlotArea};

    fn plot() -> PlotArea {
        PlotArea {
            x: 40.0,
            y: 20.0,
            width: 400.0,
            height: 200.0,
        }
    }

    #[test]
    fn left_axis_places_labels_on_ticks() {
        let scale = LinearScale::new((0.0, 100.0), (220.0, 20.0)).expect("scale");
        let axis = LinearAxis::new(scale, AxisOrientation::Left).render(
            plot(),
            &AxisConfig::default(),
            None,
        );

        let labels: Vec<&str> = axis
            .find_by_class("axis-label")
            .iter()
            .filter_map(|e| e.text.as_deref())
            .collect();
        // Ticks come out in pixel order, top to bottom.
        assert_eq!(labels, vec!["100", "50", "0"]);
        assert_eq!(
            axis.find_by_class("grid-line").len(),
            axis.find_by_class("axis-tick").len()
        );
    }

    #[test]
    fn band_axis_centers_ticks_in_bands() {
        let scale = BandScale::new(
            ["a", "b"],
            (40.0, 440.0),
            BandPadding {
                inner: 0.0,
                outer: 0.0,
            },
        )
        .expect("band");
        let config = AxisConfig {
            show_grid: false,
            ..AxisConfig::default()
        };
        let axis =
            BandAxis::new(&scale, AxisOrientation::Bottom).render(plot(), &config, str::to_owned);
        let ticks = axis.find_by_class("axis-tick");
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].num_attr("x1"), Some(140.0));
        assert_eq!(ticks[1].num_attr("x1"), Some(340.0));
    }
}
