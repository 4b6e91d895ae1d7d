use crate::core::Viewport;
use crate::interaction::{TooltipState, place_tooltip};
use crate::render::SvgElement;

use super::TooltipConfig;
use super::axis_ticks::estimate_label_width;

/// Draws the tooltip box for `state`; `None` when hidden or empty.
pub(super) fn render_tooltip(
    state: &TooltipState,
    lines: &[String],
    config: &TooltipConfig,
    viewport: Viewport,
) -> Option<SvgElement> {
    let lines: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|line| !line.is_empty())
        .collect();
    if !config.enabled || !state.visible || lines.is_empty() {
        return None;
    }

    let text_width = lines
        .iter()
        .map(|line| estimate_label_width(line, config.font_size_px))
        .fold(0.0, f64::max);
    let width = text_width + config.padding_px * 2.0;
    let height = lines.len() as f64 * config.line_height_px + config.padding_px * 2.0;
    let (x, y) = place_tooltip(
        (state.x, state.y),
        (width, height),
        (f64::from(viewport.width), f64::from(viewport.height)),
        config.offset_px,
    );

    let mut group = SvgElement::group()
        .with_class("chart-tooltip")
        .with_attr("pointer-events", "none")
        .with_child(
            SvgElement::rect(x, y, width, height)
                .with_class("chart-tooltip-box")
                .with_attr("fill", "#ffffff")
                .with_attr("stroke", "#cccccc")
                .with_attr("rx", 3),
        );
    for (index, line) in lines.iter().enumerate() {
        let baseline = y + config.padding_px + config.line_height_px * (index as f64 + 0.75);
        group.push(
            SvgElement::text_at(x + config.padding_px, baseline, *line)
                .with_class(if index == 0 {
                    "chart-tooltip-title"
                } else {
                    "chart-tooltip-line"
                })
                .with_attr("font-size", config.font_size_px),
        );
    }
    Some(group)
}
