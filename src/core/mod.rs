pub mod band_scale;
pub mod color;
pub mod dash;
pub mod data;
pub mod domain;
pub mod filter;
pub mod format;
pub mod primitives;
pub mod scale;
pub mod shape;
pub mod stack;
pub mod time_scale;
pub mod types;

pub use band_scale::{BandPadding, BandScale};
pub use color::{
    Color, ColorMapping, DEFAULT_PALETTE, FALLBACK_COLOR, generate_color_mapping, resolve_color,
};
pub use dash::{DashPattern, stroke_dash_array};
pub use data::{
    ComparableBarItem, DualBarItem, KeyedRecord, LinePoint, LineSeries, RadarSeries, RangePoint,
    RangeSeries, ScatterPoint, dataset_from_json, record_keys,
};
pub use domain::{DomainOptions, numeric_extent, resolve_domain};
pub use filter::{FilterSpec, SortingDir, apply_filter};
pub use format::{Formatter, MISSING_VALUE_LABEL, format_axis_value, format_number};
pub use scale::LinearScale;
pub use shape::{Curve, area_path, line_path, polygon_path, ribbon_path};
pub use stack::{StackSegment, StackedColumn, max_stack_total, stack_record, stack_records};
pub use time_scale::TimeScale;
pub use types::{AxisType, Margin, PlotArea, Viewport};
