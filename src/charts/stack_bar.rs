use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, AxisOrientation, BandAxis, ChartMetadata, ChartType, LinearAxis};
use crate::core::format::format_optional;
use crate::core::stack::min_stack_edge;
use crate::core::{BandScale, DomainOptions, KeyedRecord, max_stack_total, stack_records};
use crate::error::ChartResult;
use crate::render::SvgElement;

use super::{
    Chart, ChartBuild, ChartScope, filter_records, fit_y_scale, resolve_keys, tooltip_value,
};

const HOVER_CLASSES: &[&str] = &["stack-bar-segment"];
const TOTAL_LABEL_GAP_PX: f64 = 4.0;

/// One column per record, segments stacked bottom-up in key order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VerticalStackBarChart {
    records: Vec<KeyedRecord>,
    keys: Vec<String>,
    show_totals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackBarSegmentLayout {
    pub key: String,
    pub value: f64,
    pub y: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackBarColumnLayout {
    pub category: String,
    pub x: f64,
    pub width: f64,
    pub total: f64,
    pub segments: Vec<StackBarSegmentLayout>,
}

impl VerticalStackBarChart {
    #[must_use]
    pub fn new(records: Vec<KeyedRecord>) -> Self {
        Self {
            records,
            keys: Vec::new(),
            show_totals: false,
        }
    }

    #[must_use]
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    /// Draws the column total above each column.
    #[must_use]
    pub fn with_show_totals(mut self, show_totals: bool) -> Self {
        self.show_totals = show_totals;
        self
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        resolve_keys(&self.keys, &self.records)
    }
}

impl Chart for VerticalStackBarChart {
    type Dataset = Vec<KeyedRecord>;

    fn chart_type(&self) -> ChartType {
        ChartType::VerticalStackBar
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

    /// Record colors belong to categories, so no key carries one.
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

        let width = band.bandwidth();
        let mut bars = SvgElement::group().with_class("stack-bars");
        let mut layouts = Vec::with_capacity(columns.len());
        for (record, column) in records.iter().zip(&columns) {
            let Some(left) = band.position(&column.category) else {
                continue;
            };
            let mut segments = Vec::with_capacity(column.segments.len());
            for segment in &column.segments {
                let label = segment.key.as_str();
                let (top, bottom) = (y.scale(segment.y1), y.scale(segment.y0));
                let rect_y = top.min(bottom);
                let height = (bottom - top).abs();
                bars.push(
                    SvgElement::rect(left, rect_y, width, height)
                        .with_class(scope.shape_class("stack-bar-segment", label))
                        .with_label(label)
                        .with_attr("data-category", &column.category)
                        .with_attr("fill", scope.color(label, record.color.as_deref()))
                        .with_num("opacity", scope.opacity(label)),
                );
                segments.push(StackBarSegmentLayout {
                    key: segment.key.clone(),
                    value: segment.value,
                    y: rect_y,
                    height,
                });
            }
            if self.show_totals {
                bars.push(
                    SvgElement::text_at(
                        left + width * 0.5,
                        y.scale(column.total) - TOTAL_LABEL_GAP_PX,
                        format_optional(Some(column.total), scope.formatters.value()),
                    )
                    .with_class("stack-bar-total")
                    .with_attr("text-anchor", "middle")
                    .with_num("font-size", scope.config.axis.font_size_px)
                    .with_attr("fill", &scope.config.axis.color),
                );
            }
            layouts.push(StackBarColumnLayout {
                category: column.category.clone(),
                x: left,
                width,
                total: column.total,
                segments,
            });
        }

        let body = SvgElement::group()
            .with_class("chart stack-bar-chart")
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
            .with_child(bars);

        debug!(columns = layouts.len(), keys = active.len(), "built stack bar chart");
        let mut metadata = ChartMetadata::new(ChartType::VerticalStackBar).with_rendered(&layouts);
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
            let total = record.total(record.values.keys().map(String::as_str), |key| {
                scope.context.is_active(key)
            });
            lines.push(format!("Total: {}", tooltip_value(Some(total), scope)));
        }
        lines
    }
}
