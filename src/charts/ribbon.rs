use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, AxisOrientation, BandAxis, ChartMetadata, ChartType, LinearAxis};
use crate::core::stack::min_stack_edge;
use crate::core::{
    BandScale, DomainOptions, KeyedRecord, max_stack_total, ribbon_path, stack_records,
};
use crate::error::{ChartError, ChartResult};
use crate::render::SvgElement;

use super::{
    Chart, ChartBuild, ChartScope, filter_records, fit_y_scale, resolve_keys, tooltip_value,
};

const HOVER_CLASSES: &[&str] = &["ribbon-bar", "ribbon"];
const RIBBON_OPACITY: f64 = 0.4;

/// Stacked columns whose same-key segments are linked by curved ribbons.
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonChart {
    records: Vec<KeyedRecord>,
    keys: Vec<String>,
    bar_ratio: f64,
}

impl Default for RibbonChart {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonBarLayout {
    pub key: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonLinkLayout {
    pub key: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonLayout {
    pub columns: Vec<(String, Vec<RibbonBarLayout>)>,
    pub links: Vec<RibbonLinkLayout>,
}

impl RibbonChart {
    #[must_use]
    pub fn new(records: Vec<KeyedRecord>) -> Self {
        Self {
            records,
            keys: Vec::new(),
            bar_ratio: 0.5,
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// Share of each band covered by the bar; the rest carries ribbons.
    pub fn with_bar_ratio(mut self, bar_ratio: f64) -> ChartResult<Self> {
        if !bar_ratio.is_finite() || bar_ratio <= 0.0 || bar_ratio > 1.0 {
            return Err(ChartError::InvalidConfig(
                "ribbon bar ratio must be in (0, 1]".to_owned(),
            ));
        }
        self.bar_ratio = bar_ratio;
        Ok(self)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        resolve_keys(&self.keys, &self.records)
    }
}

impl Chart for RibbonChart {
    type Dataset = Vec<KeyedRecord>;

    fn chart_type(&self) -> ChartType {
        ChartType::Ribbon
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

    /// Record colors belong to categories, not keys; see `build`.
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
            (plot.x, plot.right()),
            scope.config.band_padding,
        )?;
        let y = fit_y_scale(
            [min_stack_edge(&columns), max_stack_total(&columns)],
            DomainOptions {
                include_zero: true,
                ..scope.config.y_domain
            },
            plot,
        )?;

        let bar_width = band.bandwidth() * self.bar_ratio;
        let mut layout = RibbonLayout {
            columns: Vec::with_capacity(columns.len()),
            links: Vec::new(),
        };
        let mut ribbons = SvgElement::group().with_class("ribbons");
        let mut bars = SvgElement::group().with_class("ribbon-bars");
        // Right edge of the previous column's bar plus its segments.
        let mut previous: Option<(f64, &crate::core::StackedColumn)> = None;
        for (record, column) in records.iter().zip(&columns) {
            let Some(center) = band.center(&column.category) else {
                continue;
            };
            let left = center - bar_width * 0.5;
            let mut column_layout = Vec::with_capacity(column.segments.len());
            for segment in &column.segments {
                let label = segment.key.as_str();
                let color = scope.color(label, record.color.as_deref());
                let (top, bottom) = (y.scale(segment.y1), y.scale(segment.y0));
                let rect_y = top.min(bottom);
                let height = (bottom - top).abs();
                bars.push(
                    SvgElement::rect(left, rect_y, bar_width, height)
                        .with_class(scope.shape_class("ribbon-bar", label))
                        .with_label(label)
                        .with_attr("data-category", &column.category)
                        .with_attr("fill", &color)
                        .with_num("opacity", scope.opacity(label)),
                );
                column_layout.push(RibbonBarLayout {
                    key: segment.key.clone(),
                    value: segment.value,
                    x: left,
                    y: rect_y,
                    width: bar_width,
                    height,
                });

                if let Some((prev_right, prev_column)) = previous {
                    if let Some(prev) = prev_column.segment(label) {
                        let from = (prev_right, y.scale(prev.y1), y.scale(prev.y0));
                        let to = (left, top, bottom);
                        ribbons.push(
                            SvgElement::path(ribbon_path(from, to))
                                .with_class(scope.shape_class("ribbon", label))
                                .with_label(label)
                                .with_attr("data-category", &column.category)
                                .with_attr("fill", &color)
                                .with_num("fill-opacity", RIBBON_OPACITY * scope.opacity(label)),
                        );
                        layout.links.push(RibbonLinkLayout {
                            key: segment.key.clone(),
                            from: prev_column.category.clone(),
                            to: column.category.clone(),
                        });
                    }
                }
            }
            layout.columns.push((column.category.clone(), column_layout));
            previous = Some((left + bar_width, column));
        }

        let body = SvgElement::group()
            .with_class("chart ribbon-chart")
            .with_child(LinearAxis::new(y, AxisOrientation::Left).render(
                plot,
                &scope.config.axis,
                scope.formatters.y.as_ref(),
            ))
            .with_child(
                BandAxis::new(&band, AxisOrientation::Bottom).render(
                    plot,
                    &scope.config.axis,
                    |label| ctx.display_name(label).to_owned(),
                ),
            )
            .with_child(ribbons)
            .with_child(bars);

        debug!(
            columns = columns.len(),
            links = layout.links.len(),
            "built ribbon chart"
        );
        let mut metadata = ChartMetadata::new(ChartType::Ribbon).with_rendered(&layout);
        metadata.x_axis_domain = AxisDomain::categorical(band.domain().iter().cloned());
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
