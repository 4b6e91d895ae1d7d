//! Chart components.
//!
//! Every chart derives its scales and geometry from its dataset plus the
//! shared [`ChartContext`] on each build, and tags drawable shapes with a
//! `class` and `data-label` so hosts can turn pointer hits into
//! [`HitTarget`](crate::interaction::HitTarget)s.

mod area;
mod bar_bell;
mod comparable_bar;
mod dual_bar;
mod line;
mod radar;
mod range;
mod ribbon;
mod scatter;
mod stack_bar;

pub use area::{AreaChart, AreaLayout, AreaPointLayout, AreaSeriesLayout};
pub use bar_bell::{BarBellChart, BarBellLayout, BarBellRowLayout, BarBellSegmentLayout};
pub use comparable_bar::{ComparableBarLayout, ComparableHorizontalBarChart};
pub use dual_bar::{DualBarLayout, DualHorizontalBarChart};
pub use line::{LineChart, LinePointLayout, LineSeriesLayout};
pub use radar::{RadarAxisLayout, RadarChart, RadarLayout, RadarSeriesLayout};
pub use range::{RangeChart, RangePointLayout, RangeSeriesLayout};
pub use ribbon::{RibbonBarLayout, RibbonChart, RibbonLayout, RibbonLinkLayout};
pub use scatter::{ScatterPlotChart, ScatterPointLayout};
pub use stack_bar::{StackBarColumnLayout, StackBarSegmentLayout, VerticalStackBarChart};

use crate::api::{
    AxisOrientation, ChartConfig, ChartContext, ChartFormatters, ChartMetadata, ChartType,
    LinearAxis, TimeAxis,
};
use crate::core::{
    DomainOptions, KeyedRecord, LinearScale, PlotArea, TimeScale, resolve_color, resolve_domain,
};
use crate::error::ChartResult;
use crate::render::SvgElement;

/// Opacity applied to shapes whose label is not highlighted while another is.
pub const DIMMED_OPACITY: f64 = 0.3;

/// Everything a chart reads during one build.
#[derive(Debug, Clone, Copy)]
pub struct ChartScope<'a> {
    pub context: &'a ChartContext,
    pub config: &'a ChartConfig,
    pub formatters: &'a ChartFormatters,
    pub plot: PlotArea,
}

impl ChartScope<'_> {
    /// Mapped color, then `embedded`, then the translucent fallback.
    #[must_use]
    pub fn color(&self, label: &str, embedded: Option<&str>) -> String {
        resolve_color(label, self.context.colors_mapping(), embedded)
    }

    #[must_use]
    pub fn opacity(&self, label: &str) -> f64 {
        if self.context.is_dimmed(label) {
            DIMMED_OPACITY
        } else {
            1.0
        }
    }

    /// Shape class with a highlight-state suffix.
    #[must_use]
    pub fn shape_class(&self, base: &str, label: &str) -> String {
        if self.context.is_highlighted(label) {
            format!("{base} highlighted")
        } else if self.context.is_dimmed(label) {
            format!("{base} dimmed")
        } else {
            base.to_owned()
        }
    }

    #[must_use]
    pub fn display_name<'s>(&'s self, label: &'s str) -> &'s str {
        self.context.display_name(label)
    }
}

/// Output of one chart build: markup plus the metadata summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBuild {
    pub body: SvgElement,
    pub metadata: ChartMetadata,
}

/// Contract shared by every chart component.
pub trait Chart {
    type Dataset;

    fn chart_type(&self) -> ChartType;

    fn dataset(&self) -> &Self::Dataset;

    fn set_dataset(&mut self, dataset: Self::Dataset);

    fn is_empty(&self) -> bool;

    /// Labels eligible for colors and legend entries, in display order.
    fn labels(&self) -> Vec<String>;

    /// Color carried by the dataset itself for `label`.
    fn embedded_color(&self, label: &str) -> Option<&str>;

    /// Classes of the shapes forming one hover group.
    fn hover_classes(&self) -> &'static [&'static str];

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild>;

    /// Tooltip text for the hovered `label` (and `category`, when the hit
    /// target names one). The first line is the title.
    fn tooltip_lines(
        &self,
        label: &str,
        category: Option<&str>,
        scope: &ChartScope<'_>,
    ) -> Vec<String>;
}

/// Continuous x scale: calendar-aware for date axes, linear otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XScale {
    Linear(LinearScale),
    Time(TimeScale),
}

impl XScale {
    /// Fits `values` into the plot width honoring the x domain options.
    /// Date domains are not nice-rounded so data spans the full width.
    pub fn fit(
        values: impl IntoIterator<Item = f64>,
        scope: &ChartScope<'_>,
    ) -> ChartResult<Self> {
        let config = scope.config;
        let range = (scope.plot.x, scope.plot.right());
        if config.axis_type.is_date() {
            let options = DomainOptions {
                nice: false,
                include_zero: false,
                ..config.x_domain
            };
            let domain = resolve_domain(values, options);
            Ok(Self::Time(TimeScale::new(domain, range, config.axis_type)?))
        } else {
            let domain = resolve_domain(values, config.x_domain);
            Ok(Self::Linear(LinearScale::new(domain, range)?))
        }
    }

    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        match self {
            Self::Linear(scale) => scale.scale(value),
            Self::Time(scale) => scale.scale(value),
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        match self {
            Self::Linear(scale) => scale.domain(),
            Self::Time(scale) => scale.domain(),
        }
    }

    pub fn render_axis(self, scope: &ChartScope<'_>) -> ChartResult<SvgElement> {
        let formatter = scope.formatters.x.as_ref();
        match self {
            Self::Linear(scale) => Ok(LinearAxis::new(scale, AxisOrientation::Bottom).render(
                scope.plot,
                &scope.config.axis,
                formatter,
            )),
            Self::Time(scale) => TimeAxis::new(scale, AxisOrientation::Bottom).render(
                scope.plot,
                &scope.config.axis,
                formatter,
            ),
        }
    }
}

/// Vertical value scale over `values`, bottom-up inside the plot.
pub(crate) fn fit_y_scale(
    values: impl IntoIterator<Item = f64>,
    options: DomainOptions,
    plot: PlotArea,
) -> ChartResult<LinearScale> {
    LinearScale::new(resolve_domain(values, options), (plot.bottom(), plot.y))
}

/// Horizontal value scale over `values`, left to right inside the plot.
pub(crate) fn fit_x_value_scale(
    values: impl IntoIterator<Item = f64>,
    options: DomainOptions,
    plot: PlotArea,
) -> ChartResult<LinearScale> {
    LinearScale::new(resolve_domain(values, options), (plot.x, plot.right()))
}

/// Records kept for band charts: category not disabled, then the host
/// [`FilterSpec`](crate::core::FilterSpec) (sort + limit) using `criteria` values over active keys.
pub(crate) fn filter_records(records: &[KeyedRecord], scope: &ChartScope<'_>) -> Vec<KeyedRecord> {
    let ctx = scope.context;
    let kept: Vec<KeyedRecord> = records
        .iter()
        .filter(|record| !ctx.is_disabled(&record.key))
        .cloned()
        .collect();
    crate::core::apply_filter(kept, &scope.config.filter, |record, criteria| {
        record.criteria_value(criteria, |key| ctx.is_active(key))
    })
}

/// Keys of `records` in first-seen order unless explicit keys are given.
pub(crate) fn resolve_keys(explicit: &[String], records: &[KeyedRecord]) -> Vec<String> {
    if explicit.is_empty() {
        crate::core::record_keys(records)
    } else {
        explicit.to_vec()
    }
}

/// Formats a value for tooltips with the tooltip/y formatter.
pub(crate) fn tooltip_value(value: Option<f64>, scope: &ChartScope<'_>) -> String {
    crate::core::format::format_optional(value, scope.formatters.value())
}

/// Unique labels in first-seen order.
pub(crate) fn unique_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        if !out.iter().any(|existing| existing == label) {
            out.push(label.to_owned());
        }
    }
    out
}
