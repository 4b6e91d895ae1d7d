use chart_svg::api::{AxisDomain, ChartConfig, ChartContext, ChartStatus, ChartType};
use chart_svg::charts::{
    BarBellChart, Chart, ComparableHorizontalBarChart, DualHorizontalBarChart, LineChart,
    RadarChart, RangeChart, RibbonChart, ScatterPlotChart, VerticalStackBarChart,
};
use chart_svg::core::primitives::year_to_unix_seconds;
use chart_svg::core::{
    AxisType, ComparableBarItem, DualBarItem, FilterSpec, KeyedRecord, LinePoint, LineSeries,
    RadarSeries, RangePoint, RangeSeries, ScatterPoint, Viewport,
};
use chart_svg::render::NullRenderer;
use chart_svg::ChartRuntime;

fn render<C: Chart>(chart: C, config: ChartConfig) -> ChartRuntime<C, NullRenderer> {
    let mut runtime = ChartRuntime::new(chart, NullRenderer::default(), config).expect("runtime");
    let mut ctx = ChartContext::default();
    let outcome = runtime.render(&mut ctx).expect("render");
    assert_eq!(outcome.status, ChartStatus::Ready);
    runtime
}

fn config() -> ChartConfig {
    ChartConfig::new(Viewport::new(800, 480))
}

fn chart_type<C: Chart>(runtime: &ChartRuntime<C, NullRenderer>) -> ChartType {
    runtime.last_metadata().expect("metadata").chart_type
}

fn shapes_with_class<C: Chart>(runtime: &ChartRuntime<C, NullRenderer>, class: &str) -> usize {
    runtime
        .renderer()
        .last_frame
        .as_ref()
        .expect("frame")
        .root
        .find_by_class(class)
        .len()
}

fn energy_records() -> Vec<KeyedRecord> {
    vec![
        KeyedRecord::new("north").with_value("wind", 2.0).with_value("hydro", 5.0),
        KeyedRecord::new("south").with_value("wind", 6.0).with_value("hydro", 1.0),
        KeyedRecord::new("east").with_value("wind", 3.0).with_missing("hydro"),
    ]
}

#[test]
fn every_chart_renders_a_valid_frame() {
    let bar_bell = render(BarBellChart::new(energy_records()), config());
    assert_eq!(chart_type(&bar_bell), ChartType::BarBell);
    assert!(shapes_with_class(&bar_bell, "bar-bell-bell") > 0);

    let ribbon = render(RibbonChart::new(energy_records()), config());
    assert_eq!(chart_type(&ribbon), ChartType::Ribbon);
    assert_eq!(shapes_with_class(&ribbon, "ribbon-bar"), 6);

    let stack = render(VerticalStackBarChart::new(energy_records()), config());
    assert_eq!(chart_type(&stack), ChartType::VerticalStackBar);
    assert_eq!(shapes_with_class(&stack, "stack-bar-segment"), 6);

    let comparable = render(
        ComparableHorizontalBarChart::new(vec![
            ComparableBarItem::new("alpha", 12.0).with_based_value(20.0),
            ComparableBarItem::new("beta", 8.0).with_based_value(4.0),
        ]),
        config(),
    );
    assert_eq!(chart_type(&comparable), ChartType::ComparableHorizontalBar);
    assert_eq!(shapes_with_class(&comparable, "comparable-bar"), 2);
    assert_eq!(shapes_with_class(&comparable, "comparable-based"), 2);

    let dual = render(
        DualHorizontalBarChart::new(
            vec![
                DualBarItem::new("0-9", 5.0, 7.0),
                DualBarItem::new("10-19", 8.0, 6.0),
            ],
            "male",
            "female",
        ),
        config(),
    );
    assert_eq!(chart_type(&dual), ChartType::DualHorizontalBar);
    assert_eq!(shapes_with_class(&dual, "dual-bar-left"), 2);
    assert_eq!(shapes_with_class(&dual, "dual-bar-right"), 2);

    let radar = render(
        RadarChart::new(vec![
            RadarSeries::new("car")
                .with_value("speed", 8.0)
                .with_value("comfort", 6.0)
                .with_value("price", 4.0),
        ]),
        config(),
    );
    assert_eq!(chart_type(&radar), ChartType::Radar);
    assert_eq!(shapes_with_class(&radar, "radar-spoke"), 3);

    let range = render(
        RangeChart::new(vec![RangeSeries::new(
            "temperature",
            vec![
                RangePoint::new(0.0, 2.0, 9.0).expect("point"),
                RangePoint::new(1.0, 4.0, 12.0).expect("point").with_value(7.0),
            ],
        )]),
        config(),
    );
    assert_eq!(chart_type(&range), ChartType::Range);
    assert_eq!(shapes_with_class(&range, "range-area"), 1);

    let scatter = render(
        ScatterPlotChart::new(vec![
            ScatterPoint::new("a", 1.0, 2.0).with_size(4.0),
            ScatterPoint::new("b", 3.0, 5.0).with_size(16.0),
        ]),
        config(),
    );
    assert_eq!(chart_type(&scatter), ChartType::Scatter);
    assert_eq!(shapes_with_class(&scatter, "scatter-point"), 2);
}

#[test]
fn uncertain_tail_is_drawn_dashed() {
    let series = LineSeries::new(
        "forecast",
        vec![
            LinePoint::new(0.0, 1.0),
            LinePoint::new(1.0, 2.0),
            LinePoint::new(2.0, 3.0).uncertain(),
        ],
    );
    let runtime = render(LineChart::new(vec![series]), config());
    let frame = runtime.renderer().last_frame.as_ref().expect("frame");
    let lines = frame.root.find_by_class("line");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].attr("stroke-dasharray").is_some());
}

#[test]
fn fully_certain_line_has_no_dash_array() {
    let series = LineSeries::new(
        "actual",
        vec![LinePoint::new(0.0, 1.0), LinePoint::new(1.0, 2.0)],
    );
    let runtime = render(LineChart::new(vec![series]), config());
    let frame = runtime.renderer().last_frame.as_ref().expect("frame");
    assert!(frame.root.find_by_class("line")[0].attr("stroke-dasharray").is_none());
}

#[test]
fn annual_axis_keeps_exact_year_bounds() {
    let start = year_to_unix_seconds(2001).expect("2001");
    let end = year_to_unix_seconds(2009).expect("2009");
    let series = LineSeries::new(
        "sales",
        vec![LinePoint::new(start, 10.0), LinePoint::new(end, 30.0)],
    );
    let runtime = render(
        LineChart::new(vec![series]),
        config().with_axis_type(AxisType::DateAnnual),
    );
    let metadata = runtime.last_metadata().expect("metadata");
    assert_eq!(metadata.x_axis_domain, AxisDomain::numeric((start, end)));
}

#[test]
fn filter_limits_stacked_columns_by_total() {
    let runtime = render(
        VerticalStackBarChart::new(energy_records()),
        config().with_filter(FilterSpec::top(2, "total")),
    );
    let metadata = runtime.last_metadata().expect("metadata");
    assert_eq!(
        metadata.x_axis_domain,
        AxisDomain::categorical(["north", "south"])
    );
}
