use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, ChartMetadata, ChartType};
use crate::core::{
    BandScale, DomainOptions, DualBarItem, LinearScale, apply_filter, resolve_domain,
};
use crate::error::ChartResult;
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, tooltip_value};

const HOVER_CLASSES: &[&str] = &["dual-bar-left", "dual-bar-right"];
const ROW_LABEL_GAP_PX: f64 = 3.0;

/// Back-to-back horizontal bars: one side per series, one row per item,
/// growing outward from a shared center line.
#[derive(Debug, Clone, PartialEq)]
pub struct DualHorizontalBarChart {
    items: Vec<DualBarItem>,
    left_label: String,
    right_label: String,
}

impl Default for DualHorizontalBarChart {
    fn default() -> Self {
        Self::new(Vec::new(), "left", "right")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualBarLayout {
    pub label: String,
    pub y: f64,
    pub bandwidth: f64,
    pub left_width: f64,
    pub right_width: f64,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl DualHorizontalBarChart {
    #[must_use]
    pub fn new(
        items: Vec<DualBarItem>,
        left_label: impl Into<String>,
        right_label: impl Into<String>,
    ) -> Self {
        Self {
            items,
            left_label: left_label.into(),
            right_label: right_label.into(),
        }
    }

    #[must_use]
    pub fn left_label(&self) -> &str {
        &self.left_label
    }

    #[must_use]
    pub fn right_label(&self) -> &str {
        &self.right_label
    }

    fn side_value(&self, item: &DualBarItem, side: &str) -> Option<f64> {
        let value = if side == self.left_label {
            item.left
        } else if side == self.right_label {
            item.right
        } else {
            None
        };
        value.filter(|v| v.is_finite())
    }
}

impl Chart for DualHorizontalBarChart {
    type Dataset = Vec<DualBarItem>;

    fn chart_type(&self) -> ChartType {
        ChartType::DualHorizontalBar
    }

    fn dataset(&self) -> &Self::Dataset {
        &self.items
    }

    fn set_dataset(&mut self, dataset: Self::Dataset) {
        self.items = dataset;
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn labels(&self) -> Vec<String> {
        vec![self.left_label.clone(), self.right_label.clone()]
    }

    fn embedded_color(&self, _label: &str) -> Option<&str> {
        None
    }

    fn hover_classes(&self) -> &'static [&'static str] {
        HOVER_CLASSES
    }

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild> {
        let ctx = scope.context;
        let plot = scope.plot;
        let left_on = ctx.is_active(&self.left_label);
        let right_on = ctx.is_active(&self.right_label);

        let kept: Vec<DualBarItem> = self
            .items
            .iter()
            .filter(|item| !ctx.is_disabled(&item.label))
            .cloned()
            .collect();
        let items = apply_filter(kept, &scope.config.filter, |item, criteria| {
            let left = item.left.filter(|_| left_on);
            let right = item.right.filter(|_| right_on);
            match criteria {
                "left" => left,
                "right" => right,
                "total" => Some(left.unwrap_or(0.0) + right.unwrap_or(0.0)),
                _ => None,
            }
        });

        let band = BandScale::new(
            items.iter().map(|item| item.label.as_str()),
            (plot.y, plot.bottom()),
            scope.config.band_padding,
        )?;
        let half = plot.width * 0.5;
        let center = plot.x + half;
        let magnitudes = items.iter().flat_map(|item| {
            [item.left.filter(|_| left_on), item.right.filter(|_| right_on)]
                .into_iter()
                .flatten()
                .map(f64::abs)
        });
        let domain = resolve_domain(
            magnitudes,
            DomainOptions {
                include_zero: true,
                ..scope.config.x_domain
            },
        );
        let magnitude = LinearScale::new(domain, (0.0, half))?.with_clamp(true);

        let bandwidth = band.bandwidth();
        let mut rows = SvgElement::group().with_class("dual-bars");
        let mut layouts = Vec::with_capacity(items.len());
        for item in &items {
            let Some(top) = band.position(&item.label) else {
                continue;
            };
            let mut widths = [0.0, 0.0];
            for (index, (side, on, class)) in [
                (&self.left_label, left_on, "dual-bar-left"),
                (&self.right_label, right_on, "dual-bar-right"),
            ]
            .into_iter()
            .enumerate()
            {
                let Some(value) = self.side_value(item, side).filter(|_| on) else {
                    continue;
                };
                let width = magnitude.scale(value.abs()) - magnitude.scale(0.0);
                let width = width.max(0.0);
                widths[index] = width;
                let x = if index == 0 { center - width } else { center };
                rows.push(
                    SvgElement::rect(x, top, width, bandwidth)
                        .with_class(scope.shape_class(class, side))
                        .with_label(side)
                        .with_attr("data-category", &item.label)
                        .with_attr("fill", scope.color(side, item.color.as_deref()))
                        .with_num("opacity", scope.opacity(side)),
                );
            }
            let name = ctx.display_name(&item.label);
            if !name.is_empty() {
                rows.push(
                    SvgElement::text_at(center, top - ROW_LABEL_GAP_PX, name)
                        .with_class("dual-bar-label")
                        .with_attr("text-anchor", "middle")
                        .with_num("font-size", scope.config.axis.font_size_px)
                        .with_attr("fill", &scope.config.axis.color),
                );
            }
            layouts.push(DualBarLayout {
                label: item.label.clone(),
                y: top,
                bandwidth,
                left_width: widths[0],
                right_width: widths[1],
                left: item.left,
                right: item.right,
            });
        }

        let body = SvgElement::group()
            .with_class("chart dual-bar-chart")
            .with_child(rows)
            .with_child(
                SvgElement::line(center, plot.y, center, plot.bottom())
                    .with_class("dual-center")
                    .with_attr("stroke", &scope.config.axis.color),
            );

        debug!(items = items.len(), "built dual bar chart");
        let mut metadata =
            ChartMetadata::new(ChartType::DualHorizontalBar).with_rendered(&layouts);
        metadata.x_axis_domain = AxisDomain::numeric(magnitude.domain());
        metadata.y_axis_domain = AxisDomain::categorical(band.domain().iter().cloned());
        metadata.visible_items = ctx.active_labels(&self.labels());
        Ok(ChartBuild { body, metadata })
    }

    /// `label` is the hovered side; `category` the hovered item.
    fn tooltip_lines(
        &self,
        label: &str,
        category: Option<&str>,
        scope: &ChartScope<'_>,
    ) -> Vec<String> {
        let mut lines = vec![scope.display_name(label).to_owned()];
        match category.and_then(|key| self.items.iter().find(|item| item.label == key)) {
            Some(item) => lines.push(format!(
                "{}: {}",
                scope.display_name(&item.label),
                tooltip_value(self.side_value(item, label), scope)
            )),
            None => {
                let total: f64 = self
                    .items
                    .iter()
                    .filter_map(|item| self.side_value(item, label))
                    .sum();
                lines.push(format!("Total: {}", tooltip_value(Some(total), scope)));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::DualHorizontalBarChart;
    use crate::api::{AxisDomain, ChartContext, ChartFormatters};
    use crate::charts::Chart;
    use crate::charts::test_support::{config, scope};
    use crate::core::{DualBarItem, FilterSpec};

    fn chart() -> DualHorizontalBarChart {
        DualHorizontalBarChart::new(
            vec![
                DualBarItem::new("0-9", 10.0, 8.0),
                DualBarItem::new("10-19", 12.0, 20.0),
                DualBarItem::new("20-29", 5.0, 4.0),
            ],
            "male",
            "female",
        )
    }

    #[test]
    fn bars_grow_outward_from_center() {
        let chart = chart();
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let scope = scope(&ctx, &config, &formatters);
        let build = chart.build(&scope).expect("build");

        let center = scope.plot.x + scope.plot.width * 0.5;
        let left = build.body.find_by_class("dual-bar-left");
        let right = build.body.find_by_class("dual-bar-right");
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 3);
        let left_end = left[0].num_attr("x").unwrap_or_default()
            + left[0].num_attr("width").unwrap_or_default();
        assert_relative_eq!(left_end, center, epsilon = 0.01);
        assert_relative_eq!(right[0].num_attr("x").unwrap_or_default(), center, epsilon = 0.01);
        assert_eq!(build.metadata.x_axis_domain, AxisDomain::numeric((0.0, 20.0)));
        assert_eq!(right[1].attr("data-category"), Some("10-19"));
    }

    #[test]
    fn disabled_side_is_dropped_from_domain() {
        let chart = chart();
        let mut ctx = ChartContext::default();
        ctx.set_disabled_items(["female"]);
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert!(build.body.find_by_class("dual-bar-right").is_empty());
        assert_eq!(build.metadata.x_axis_domain, AxisDomain::numeric((0.0, 12.0)));
        assert_eq!(build.metadata.visible_items, vec!["male"]);
    }

    #[test]
    fn filter_ranks_rows_by_total() {
        let chart = chart();
        let ctx = ChartContext::default();
        let config = config().with_filter(FilterSpec::top(2, "total"));
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(
            build.metadata.y_axis_domain,
            AxisDomain::categorical(["10-19", "0-9"])
        );
        assert_eq!(build.body.find_by_class("dual-bar-label").len(), 2);
    }

    #[test]
    fn tooltip_reads_side_value() {
        let chart = chart();
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let scope = scope(&ctx, &config, &formatters);

        assert_eq!(
            chart.tooltip_lines("female", Some("10-19"), &scope),
            vec!["female", "10-19: 20"]
        );
        assert_eq!(chart.tooltip_lines("male", None, &scope), vec!["male", "Total: 27"]);
    }
}
