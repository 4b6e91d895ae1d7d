use serde::{Deserialize, Serialize};

use crate::core::{
    AxisType, BandPadding, Curve, DashPattern, DomainOptions, FilterSpec, Formatter, Margin,
    PlotArea, Viewport,
};
use crate::error::{ChartError, ChartResult};

use super::AxisConfig;

/// Tooltip box layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub enabled: bool,
    /// Distance between the pointer and the tooltip box.
    pub offset_px: f64,
    pub font_size_px: f64,
    pub padding_px: f64,
    pub line_height_px: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            offset_px: 12.0,
            font_size_px: 12.0,
            padding_px: 6.0,
            line_height_px: 16.0,
        }
    }
}

/// Serializable chart setup shared by every chart component.
///
/// Hosts can persist/load it as JSON; formatters are runtime-only and live in
/// [`ChartFormatters`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub margin: Margin,
    #[serde(default)]
    pub axis_type: AxisType,
    #[serde(default)]
    pub x_domain: DomainOptions,
    #[serde(default)]
    pub y_domain: DomainOptions,
    #[serde(default)]
    pub filter: FilterSpec,
    #[serde(default)]
    pub axis: AxisConfig,
    #[serde(default)]
    pub curve: Curve,
    #[serde(default)]
    pub dash_pattern: DashPattern,
    #[serde(default)]
    pub show_points: bool,
    #[serde(default = "default_true")]
    pub stacked: bool,
    /// Generates palette colors for labels that have none.
    #[serde(default = "default_true")]
    pub auto_colors: bool,
    #[serde(default)]
    pub tooltip: TooltipConfig,
    #[serde(default)]
    pub band_padding: BandPadding,
}

fn default_true() -> bool {
    true
}

impl ChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margin: Margin::default(),
            axis_type: AxisType::default(),
            x_domain: DomainOptions::default(),
            y_domain: DomainOptions::default(),
            filter: FilterSpec::default(),
            axis: AxisConfig::default(),
            curve: Curve::default(),
            dash_pattern: DashPattern::default(),
            show_points: false,
            stacked: true,
            auto_colors: true,
            tooltip: TooltipConfig::default(),
            band_padding: BandPadding::default(),
        }
    }

    #[must_use]
    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_axis_type(mut self, axis_type: AxisType) -> Self {
        self.axis_type = axis_type;
        self
    }

    #[must_use]
    pub fn with_x_domain(mut self, options: DomainOptions) -> Self {
        self.x_domain = options;
        self
    }

    #[must_use]
    pub fn with_y_domain(mut self, options: DomainOptions) -> Self {
        self.y_domain = options;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: AxisConfig) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = curve;
        self
    }

    #[must_use]
    pub fn with_dash_pattern(mut self, pattern: DashPattern) -> Self {
        self.dash_pattern = pattern;
        self
    }

    #[must_use]
    pub fn with_show_points(mut self, show_points: bool) -> Self {
        self.show_points = show_points;
        self
    }

    #[must_use]
    pub fn with_stacked(mut self, stacked: bool) -> Self {
        self.stacked = stacked;
        self
    }

    #[must_use]
    pub fn with_auto_colors(mut self, auto_colors: bool) -> Self {
        self.auto_colors = auto_colors;
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, tooltip: TooltipConfig) -> Self {
        self.tooltip = tooltip;
        self
    }

    #[must_use]
    pub fn with_band_padding(mut self, padding: BandPadding) -> Self {
        self.band_padding = padding;
        self
    }

    /// Drawing rectangle inside the margins.
    pub fn plot_area(&self) -> ChartResult<PlotArea> {
        PlotArea::from_viewport(self.viewport, self.margin)
    }

    pub fn validate(&self) -> ChartResult<()> {
        self.plot_area()?;
        for (name, value) in [
            ("margin.top", self.margin.top),
            ("margin.right", self.margin.right),
            ("margin.bottom", self.margin.bottom),
            ("margin.left", self.margin.left),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        self.x_domain.validate()?;
        self.y_domain.validate()?;
        self.dash_pattern.validate()?;
        self.axis.validate()?;
        if self.filter.limit == Some(0) {
            return Err(ChartError::InvalidConfig(
                "filter limit must be > 0 when set".to_owned(),
            ));
        }
        if !(0.0..1.0).contains(&self.band_padding.inner)
            || !self.band_padding.outer.is_finite()
            || self.band_padding.outer < 0.0
        {
            return Err(ChartError::InvalidConfig(
                "band padding must be inner in [0, 1) and outer >= 0".to_owned(),
            ));
        }
        let tooltip = self.tooltip;
        if [
            tooltip.offset_px,
            tooltip.font_size_px,
            tooltip.padding_px,
            tooltip.line_height_px,
        ]
        .iter()
        .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(ChartError::InvalidConfig(
                "tooltip sizes must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::Serialization(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::Serialization(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Host-supplied label formatters. Absent formatters fall back to the
/// axis-type defaults.
#[derive(Clone, Default)]
pub struct ChartFormatters {
    pub x: Option<Formatter>,
    pub y: Option<Formatter>,
    pub tooltip: Option<Formatter>,
}

impl std::fmt::Debug for ChartFormatters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartFormatters")
            .field("x", &self.x.is_some())
            .field("y", &self.y.is_some())
            .field("tooltip", &self.tooltip.is_some())
            .finish()
    }
}

impl ChartFormatters {
    #[must_use]
    pub fn with_x(mut self, formatter: Formatter) -> Self {
        self.x = Some(formatter);
        self
    }

    #[must_use]
    pub fn with_y(mut self, formatter: Formatter) -> Self {
        self.y = Some(formatter);
        self
    }

    #[must_use]
    pub fn with_tooltip(mut self, formatter: Formatter) -> Self {
        self.tooltip = Some(formatter);
        self
    }

    /// Tooltip formatter, else the y formatter.
    #[must_use]
    pub fn value(&self) -> Option<&Formatter> {
        self.tooltip.as_ref().or(self.y.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::ChartConfig;
    use crate::core::{FilterSpec, Viewport};

    #[test]
    fn minimal_json_fills_defaults() {
        let config = ChartConfig::from_json_str(r#"{"viewport":{"width":640,"height":360}}"#)
            .expect("config json");
        assert!(config.stacked);
        assert!(config.auto_colors);
        assert_eq!(config, ChartConfig::new(Viewport::new(640, 360)));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let config = ChartConfig::new(Viewport::new(640, 360)).with_filter(FilterSpec {
            limit: Some(0),
            ..FilterSpec::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn margins_larger_than_viewport_are_rejected() {
        let config = ChartConfig::new(Viewport::new(50, 40));
        assert!(config.plot_area().is_err());
    }
}
