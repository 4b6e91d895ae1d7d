use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{AxisDomain, AxisOrientation, BandAxis, ChartMetadata, ChartType, LinearAxis};
use crate::core::format::format_optional;
use crate::core::{
    BandScale, ComparableBarItem, DomainOptions, FALLBACK_COLOR, apply_filter, resolve_color,
};
use crate::error::{ChartError, ChartResult};
use crate::render::SvgElement;

use super::{Chart, ChartBuild, ChartScope, fit_x_value_scale, tooltip_value, unique_labels};

const HOVER_CLASSES: &[&str] = &["comparable-bar", "comparable-based"];
const VALUE_LABEL_GAP_PX: f64 = 4.0;

/// Horizontal bars drawn over a wider "based" bar carrying a reference value.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableHorizontalBarChart {
    items: Vec<ComparableBarItem>,
    bar_ratio: f64,
    show_values: bool,
}

impl Default for ComparableHorizontalBarChart {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableBarLayout {
    pub label: String,
    pub y: f64,
    pub bandwidth: f64,
    pub value_width: f64,
    pub based_width: Option<f64>,
    pub value: Option<f64>,
    pub based_value: Option<f64>,
}

fn criteria_value(item: &ComparableBarItem, criteria: &str) -> Option<f64> {
    match criteria {
        "value" => item.value,
        "based_value" | "basedValue" => item.based_value,
        _ => None,
    }
}

impl ComparableHorizontalBarChart {
    #[must_use]
    pub fn new(items: Vec<ComparableBarItem>) -> Self {
        Self {
            items,
            bar_ratio: 0.5,
            show_values: false,
        }
    }

    /// Thickness of the value bar relative to the based bar.
    pub fn with_bar_ratio(mut self, bar_ratio: f64) -> ChartResult<Self> {
        if !bar_ratio.is_finite() || bar_ratio <= 0.0 || bar_ratio > 1.0 {
            return Err(ChartError::InvalidConfig(
                "comparable bar ratio must be in (0, 1]".to_owned(),
            ));
        }
        self.bar_ratio = bar_ratio;
        Ok(self)
    }

    #[must_use]
    pub fn with_show_values(mut self, show_values: bool) -> Self {
        self.show_values = show_values;
        self
    }

    fn visible_items(&self, scope: &ChartScope<'_>) -> Vec<ComparableBarItem> {
        let active: Vec<ComparableBarItem> = self
            .items
            .iter()
            .filter(|item| scope.context.is_active(&item.label))
            .cloned()
            .collect();
        apply_filter(active, &scope.config.filter, criteria_value)
    }
}

impl Chart for ComparableHorizontalBarChart {
    type Dataset = Vec<ComparableBarItem>;

    fn chart_type(&self) -> ChartType {
        ChartType::ComparableHorizontalBar
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
        unique_labels(self.items.iter().map(|item| item.label.as_str()))
    }

    fn embedded_color(&self, label: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.label == label)
            .and_then(|item| item.color.as_deref())
    }

    fn hover_classes(&self) -> &'static [&'static str] {
        HOVER_CLASSES
    }

    fn build(&self, scope: &ChartScope<'_>) -> ChartResult<ChartBuild> {
        let ctx = scope.context;
        let plot = scope.plot;
        let items = self.visible_items(scope);

        let band = BandScale::new(
            items.iter().map(|item| item.label.as_str()),
            (plot.y, plot.bottom()),
            scope.config.band_padding,
        )?;
        let x = fit_x_value_scale(
            items
                .iter()
                .flat_map(|item| [item.value, item.based_value].into_iter().flatten()),
            DomainOptions {
                include_zero: true,
                ..scope.config.x_domain
            },
            plot,
        )?;

        let zero = x.scale(0.0);
        let span_of = |value: Option<f64>| {
            value.filter(|v| v.is_finite()).map(|v| {
                let end = x.scale(v);
                (zero.min(end), (end - zero).abs())
            })
        };
        let bandwidth = band.bandwidth();
        let bar_height = bandwidth * self.bar_ratio;
        let mut bars = SvgElement::group().with_class("comparable-bars");
        let mut layouts = Vec::with_capacity(items.len());
        for item in &items {
            let Some(top) = band.position(&item.label) else {
                continue;
            };
            let label = item.label.as_str();
            let opacity = scope.opacity(label);

            let based = span_of(item.based_value);
            if let Some((left, width)) = based {
                let based_color = ctx
                    .colors_based_mapping()
                    .get(label)
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_COLOR.to_owned());
                bars.push(
                    SvgElement::rect(left, top, width, bandwidth)
                        .with_class(scope.shape_class("comparable-based", label))
                        .with_label(label)
                        .with_attr("fill", based_color)
                        .with_num("opacity", opacity),
                );
            }

            let value = span_of(item.value);
            let (left, width) = value.unwrap_or((zero, 0.0));
            bars.push(
                SvgElement::rect(left, top + (bandwidth - bar_height) * 0.5, width, bar_height)
                    .with_class(scope.shape_class("comparable-bar", label))
                    .with_label(label)
                    .with_attr(
                        "fill",
                        resolve_color(label, ctx.colors_mapping(), item.color.as_deref()),
                    )
                    .with_num("opacity", opacity),
            );

            if self.show_values {
                let text = format_optional(item.value, scope.formatters.value());
                let end = value.map_or(zero, |(left, width)| left + width);
                let end = based.map_or(end, |(left, width)| end.max(left + width));
                bars.push(
                    SvgElement::text_at(end + VALUE_LABEL_GAP_PX, top + bandwidth * 0.5, text)
                        .with_class("comparable-value")
                        .with_attr("dominant-baseline", "middle")
                        .with_num("font-size", scope.config.axis.font_size_px)
                        .with_attr("fill", &scope.config.axis.color),
                );
            }

            layouts.push(ComparableBarLayout {
                label: item.label.clone(),
                y: top,
                bandwidth,
                value_width: width,
                based_width: based.map(|(_, width)| width),
                value: item.value,
                based_value: item.based_value,
            });
        }

        let body = SvgElement::group()
            .with_class("chart comparable-bar-chart")
            .with_child(LinearAxis::new(x, AxisOrientation::Bottom).render(
                plot,
                &scope.config.axis,
                scope.formatters.x.as_ref(),
            ))
            .with_child(
                BandAxis::new(&band, AxisOrientation::Left).render(
                    plot,
                    &scope.config.axis,
                    |label| ctx.display_name(label).to_owned(),
                ),
            )
            .with_child(bars);

        debug!(items = items.len(), "built comparable bar chart");
        let mut metadata =
            ChartMetadata::new(ChartType::ComparableHorizontalBar).with_rendered(&layouts);
        metadata.x_axis_domain = AxisDomain::numeric(x.domain());
        metadata.y_axis_domain = AxisDomain::categorical(band.domain().iter().cloned());
        metadata.visible_items = items.into_iter().map(|item| item.label).collect();
        Ok(ChartBuild { body, metadata })
    }

    fn tooltip_lines(
        &self,
        label: &str,
        _category: Option<&str>,
        scope: &ChartScope<'_>,
    ) -> Vec<String> {
        let mut lines = vec![scope.display_name(label).to_owned()];
        if let Some(item) = self.items.iter().find(|item| item.label == label) {
            lines.push(format!("Value: {}", tooltip_value(item.value, scope)));
            if item.based_value.is_some() {
                lines.push(format!("Based: {}", tooltip_value(item.based_value, scope)));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::ComparableHorizontalBarChart;
    use crate::api::{AxisDomain, ChartContext, ChartFormatters, ContextProps};
    use crate::charts::Chart;
    use crate::charts::test_support::{config, scope};
    use crate::core::{ComparableBarItem, FALLBACK_COLOR, FilterSpec, SortingDir};

    fn items() -> Vec<ComparableBarItem> {
        vec![
            ComparableBarItem::new("a", 30.0).with_based_value(50.0),
            ComparableBarItem::new("b", 70.0),
            ComparableBarItem::new("c", 10.0).with_based_value(20.0),
        ]
    }

    #[test]
    fn domain_covers_values_and_based_values() {
        let chart = ComparableHorizontalBarChart::new(items());
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(build.metadata.x_axis_domain, AxisDomain::numeric((0.0, 70.0)));
        assert_eq!(build.body.find_by_class("comparable-bar").len(), 3);
        assert_eq!(build.body.find_by_class("comparable-based").len(), 2);
    }

    #[test]
    fn based_bar_uses_based_mapping_or_fallback() {
        let chart = ComparableHorizontalBarChart::new(items());
        let mut props = ContextProps::default();
        props
            .colors_based_mapping
            .insert("a".to_owned(), "#112233".to_owned());
        let ctx = ChartContext::new(props).expect("context");
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let based = build.body.find_by_class("comparable-based");
        assert_eq!(based[0].attr("fill"), Some("#112233"));
        assert_eq!(based[1].attr("fill"), Some(FALLBACK_COLOR));
    }

    #[test]
    fn filter_sorts_by_based_value() {
        let chart = ComparableHorizontalBarChart::new(items());
        let ctx = ChartContext::default();
        let config = config().with_filter(
            FilterSpec::top(3, "basedValue").with_sorting_dir(SortingDir::Asc),
        );
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        assert_eq!(
            build.metadata.y_axis_domain,
            AxisDomain::categorical(["c", "a", "b"])
        );
    }

    #[test]
    fn value_labels_are_optional() {
        let chart = ComparableHorizontalBarChart::new(items()).with_show_values(true);
        let ctx = ChartContext::default();
        let config = config();
        let formatters = ChartFormatters::default();
        let build = chart.build(&scope(&ctx, &config, &formatters)).expect("build");

        let labels: Vec<&str> = build
            .body
            .find_by_class("comparable-value")
            .iter()
            .filter_map(|text| text.text.as_deref())
            .collect();
        assert_eq!(labels, vec!["30", "70", "10"]);
    }
}
