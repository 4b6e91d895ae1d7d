use tracing::{debug, trace, warn};

use crate::charts::{Chart, ChartBuild, ChartScope};
use crate::core::{ColorMapping, DEFAULT_PALETTE, PlotArea, generate_color_mapping, resolve_color};
use crate::error::ChartResult;
use crate::interaction::{HoverController, HoverOutcome, PointerEvent};
use crate::render::{RenderFrame, Renderer, SvgElement};

use super::tooltip::render_tooltip;
use super::{
    ChangeGate, ChartConfig, ChartContext, ChartFormatters, ChartMetadata, ChartStatus,
    ColorMappingCallback, HighlightCallback, LegendCallback, LegendItem, MetadataCallback,
    MetadataEmitter, StatusSlots, resolve_status,
};

/// Optional host callbacks. Absent callbacks are simply not invoked.
#[derive(Default)]
pub struct ChartCallbacks {
    pub on_highlight_item: Option<HighlightCallback>,
    pub on_chart_data_processed: Option<MetadataCallback>,
    pub on_color_mapping_generated: Option<ColorMappingCallback>,
    pub on_legend_data_change: Option<LegendCallback>,
}

impl std::fmt::Debug for ChartCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartCallbacks")
            .field("on_highlight_item", &self.on_highlight_item.is_some())
            .field("on_chart_data_processed", &self.on_chart_data_processed.is_some())
            .field(
                "on_color_mapping_generated",
                &self.on_color_mapping_generated.is_some(),
            )
            .field("on_legend_data_change", &self.on_legend_data_change.is_some())
            .finish()
    }
}

impl ChartCallbacks {
    #[must_use]
    pub fn on_highlight_item(mut self, callback: impl FnMut(&[String]) + 'static) -> Self {
        self.on_highlight_item = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_chart_data_processed(mut self, callback: impl FnMut(&ChartMetadata) + 'static) -> Self {
        self.on_chart_data_processed = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_color_mapping_generated(
        mut self,
        callback: impl FnMut(&ColorMapping) + 'static,
    ) -> Self {
        self.on_color_mapping_generated = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_legend_data_change(mut self, callback: impl FnMut(&[LegendItem]) + 'static) -> Self {
        self.on_legend_data_change = Some(Box::new(callback));
        self
    }
}

/// What one render pass produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    pub status: ChartStatus,
    /// The metadata differed from the previous pass (and the callback, if
    /// any, was invoked).
    pub metadata_changed: bool,
    pub element_count: usize,
}

/// Drives one chart: render passes, metadata emission and hover handling.
///
/// The [`ChartContext`] is owned by the host and lent to each call, so
/// several runtimes can share it the way charts share one provider.
pub struct ChartRuntime<C: Chart, R: Renderer> {
    chart: C,
    renderer: R,
    config: ChartConfig,
    plot: PlotArea,
    formatters: ChartFormatters,
    status: StatusSlots<C::Dataset>,
    hover: HoverController,
    metadata: MetadataEmitter,
    legend_gate: ChangeGate<Vec<LegendItem>>,
    color_gate: ChangeGate<ColorMapping>,
    on_highlight_item: Option<HighlightCallback>,
    on_color_mapping_generated: Option<ColorMappingCallback>,
    on_legend_data_change: Option<LegendCallback>,
}

impl<C: Chart, R: Renderer> ChartRuntime<C, R> {
    pub fn new(chart: C, renderer: R, config: ChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let plot = config.plot_area()?;
        Ok(Self {
            chart,
            renderer,
            config,
            plot,
            formatters: ChartFormatters::default(),
            status: StatusSlots::default(),
            hover: HoverController::default(),
            metadata: MetadataEmitter::default(),
            legend_gate: ChangeGate::new(),
            color_gate: ChangeGate::new(),
            on_highlight_item: None,
            on_color_mapping_generated: None,
            on_legend_data_change: None,
        })
    }

    #[must_use]
    pub fn with_callbacks(mut self, callbacks: ChartCallbacks) -> Self {
        self.metadata.set_callback(callbacks.on_chart_data_processed);
        self.on_highlight_item = callbacks.on_highlight_item;
        self.on_color_mapping_generated = callbacks.on_color_mapping_generated;
        self.on_legend_data_change = callbacks.on_legend_data_change;
        self
    }

    pub fn set_formatters(&mut self, formatters: ChartFormatters) {
        self.formatters = formatters;
    }

    pub fn set_status(&mut self, status: StatusSlots<C::Dataset>) {
        self.status = status;
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.status.is_loading = is_loading;
    }

    pub fn set_dataset(&mut self, dataset: C::Dataset) {
        self.chart.set_dataset(dataset);
    }

    /// Replaces the chart; any hover in progress is dropped.
    pub fn set_chart(&mut self, chart: C) {
        self.chart = chart;
        self.hover.clear();
    }

    #[must_use]
    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut C {
        &mut self.chart
    }

    #[must_use]
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ChartConfig) -> ChartResult<()> {
        config.validate()?;
        self.plot = config.plot_area()?;
        self.config = config;
        Ok(())
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn hover(&self) -> &HoverController {
        &self.hover
    }

    /// Metadata recorded by the last ready render pass.
    #[must_use]
    pub fn last_metadata(&self) -> Option<&ChartMetadata> {
        self.metadata.last()
    }

    /// Runs one render pass against `ctx`.
    ///
    /// Loading and no-data passes draw their placeholder and leave the
    /// metadata snapshot untouched.
    pub fn render(&mut self, ctx: &mut ChartContext) -> ChartResult<RenderOutcome> {
        if self.config.auto_colors {
            self.assign_missing_colors(ctx)?;
        }

        let viewport = self.config.viewport;
        let status = resolve_status(&self.status, self.chart.dataset(), self.chart.is_empty());
        if let Some(placeholder) = self.status.placeholder(status, viewport) {
            let frame = RenderFrame::new(viewport, placeholder);
            self.renderer.render(&frame)?;
            debug!(?status, "rendered chart placeholder");
            return Ok(RenderOutcome {
                status,
                metadata_changed: false,
                element_count: frame.element_count(),
            });
        }

        let scope = ChartScope {
            context: ctx,
            config: &self.config,
            formatters: &self.formatters,
            plot: self.plot,
        };
        let built = match self.chart.build(&scope) {
            Ok(built) => Some(built),
            Err(err) => {
                warn!(error = %err, chart_type = ?self.chart.chart_type(), "chart build failed");
                None
            }
        };
        let Some(ChartBuild { mut body, mut metadata }) = built else {
            let frame = RenderFrame::new(viewport, SvgElement::group().with_class("chart"));
            self.renderer.render(&frame)?;
            return Ok(RenderOutcome {
                status,
                metadata_changed: false,
                element_count: frame.element_count(),
            });
        };

        if let Some((label, category)) = self.hover.hovered_target() {
            let lines = self.chart.tooltip_lines(label, category, &scope);
            if let Some(tooltip) =
                render_tooltip(self.hover.tooltip(), &lines, &self.config.tooltip, viewport)
            {
                body.push(tooltip);
            }
        }

        let legend: Vec<LegendItem> = self
            .chart
            .labels()
            .into_iter()
            .map(|label| LegendItem {
                color: resolve_color(&label, ctx.colors_mapping(), self.chart.embedded_color(&label)),
                disabled: !ctx.is_active(&label),
                label,
            })
            .collect();

        let frame = RenderFrame::new(viewport, body);
        self.renderer.render(&frame)?;
        let element_count = frame.element_count();

        if self.legend_gate.check(&legend) {
            if let Some(callback) = self.on_legend_data_change.as_mut() {
                callback(&legend);
            }
        }
        metadata.legend_data = Some(legend);
        let metadata_changed = self.metadata.emit(metadata);
        debug!(
            chart_type = ?self.chart.chart_type(),
            element_count,
            metadata_changed,
            "rendered chart"
        );
        Ok(RenderOutcome {
            status,
            metadata_changed,
            element_count,
        })
    }

    /// Feeds a pointer event through the hover state machine and mirrors
    /// highlight changes into `ctx`.
    pub fn pointer(&mut self, event: &PointerEvent, ctx: &mut ChartContext) -> HoverOutcome {
        let outcome = self.hover.handle(event, self.chart.hover_classes());
        if outcome.highlight_changed {
            let highlighted = self.hover.highlighted().to_vec();
            trace!(?highlighted, "hover highlight changed");
            ctx.set_highlight_items(highlighted.iter().cloned());
            if let Some(callback) = self.on_highlight_item.as_mut() {
                callback(&highlighted);
            }
        }
        outcome
    }

    /// Generates palette colors for labels that have neither a mapped nor an
    /// embedded color, merging them into `ctx`.
    fn assign_missing_colors(&mut self, ctx: &mut ChartContext) -> ChartResult<()> {
        let labels = self.chart.labels();
        let missing = labels
            .iter()
            .map(String::as_str)
            .filter(|label| self.chart.embedded_color(label).is_none());
        let generated = generate_color_mapping(missing, ctx.colors_mapping(), &DEFAULT_PALETTE);
        if generated.is_empty() {
            return Ok(());
        }
        ctx.merge_colors_mapping(&generated)?;
        if self.color_gate.check(&generated) {
            debug!(count = generated.len(), "generated color mapping");
            if let Some(callback) = self.on_color_mapping_generated.as_mut() {
                callback(&generated);
            }
        }
        Ok(())
    }
}

impl<C: Chart + std::fmt::Debug, R: Renderer + std::fmt::Debug> std::fmt::Debug
    for ChartRuntime<C, R>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartRuntime")
            .field("chart", &self.chart)
            .field("renderer", &self.renderer)
            .field("config", &self.config)
            .field("hover", &self.hover)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{ChartCallbacks, ChartRuntime};
    use crate::api::{ChartConfig, ChartContext, ChartStatus};
    use crate::charts::LineChart;
    use crate::core::{LinePoint, LineSeries, Viewport};
    use crate::interaction::{HitTarget, PointerEvent};
    use crate::render::NullRenderer;

    fn runtime() -> ChartRuntime<LineChart, NullRenderer> {
        let chart = LineChart::new(vec![
            LineSeries::new("a", vec![LinePoint::new(0.0, 1.0), LinePoint::new(1.0, 2.0)]),
            LineSeries::new("b", vec![LinePoint::new(0.0, 3.0), LinePoint::new(1.0, 4.0)]),
        ]);
        ChartRuntime::new(chart, NullRenderer::default(), ChartConfig::new(Viewport::new(400, 300)))
            .expect("runtime")
    }

    #[test]
    fn metadata_callback_fires_only_on_change() {
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);
        let mut runtime = runtime().with_callbacks(
            ChartCallbacks::default().on_chart_data_processed(move |_| *seen.borrow_mut() += 1),
        );
        let mut ctx = ChartContext::default();

        assert!(runtime.render(&mut ctx).expect("render").metadata_changed);
        assert!(!runtime.render(&mut ctx).expect("render").metadata_changed);
        assert_eq!(*calls.borrow(), 1);

        ctx.set_disabled_items(["b"]);
        assert!(runtime.render(&mut ctx).expect("render").metadata_changed);
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn hover_does_not_count_as_metadata_change() {
        let mut runtime = runtime();
        let mut ctx = ChartContext::default();
        runtime.render(&mut ctx).expect("render");

        let enter = PointerEvent::Enter {
            target: HitTarget::new("a", "line"),
            x: 50.0,
            y: 50.0,
        };
        assert!(runtime.pointer(&enter, &mut ctx).highlight_changed);
        assert_eq!(ctx.highlight_items(), vec!["a"]);

        let outcome = runtime.render(&mut ctx).expect("render");
        assert!(!outcome.metadata_changed);
        let frame = runtime.renderer().last_frame.as_ref().expect("frame");
        assert_eq!(frame.root.find_by_class("chart-tooltip").len(), 1);
    }

    #[test]
    fn colors_are_generated_once_for_unmapped_labels() {
        let generated = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&generated);
        let mut runtime = runtime().with_callbacks(
            ChartCallbacks::default()
                .on_color_mapping_generated(move |mapping| sink.borrow_mut().push(mapping.len())),
        );
        let mut ctx = ChartContext::default();

        runtime.render(&mut ctx).expect("render");
        runtime.render(&mut ctx).expect("render");
        assert_eq!(*generated.borrow(), vec![2]);
        assert_eq!(ctx.colors_mapping().len(), 2);
    }

    #[test]
    fn loading_pass_skips_metadata() {
        let mut runtime = runtime();
        runtime.set_loading(true);
        let mut ctx = ChartContext::default();

        let outcome = runtime.render(&mut ctx).expect("render");
        assert_eq!(outcome.status, ChartStatus::Loading);
        assert!(runtime.last_metadata().is_none());
    }
}
